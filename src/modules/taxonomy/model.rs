use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::taxonomy::schema::{FilterCategoryEntity, TagEntity};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagModel {
    #[validate(length(min = 1, max = 100, message = "Tag name must be 1-100 characters long"))]
    pub name: String,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NameModel {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters long"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TagIdsModel {
    #[validate(length(min = 1, message = "At least one tag id is required"))]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FilterValueModel {
    #[validate(length(min = 1, max = 100, message = "Value must be 1-100 characters long"))]
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValueQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCategories {
    #[serde(flatten)]
    pub tag: TagEntity,
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithTags {
    #[serde(flatten)]
    pub category: FilterCategoryEntity,
    pub tags: Vec<TagEntity>,
}

#[derive(sqlx::FromRow)]
pub struct TagRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub category_ids: Vec<Uuid>,
}

#[derive(sqlx::FromRow)]
pub struct CategoryTagRow {
    pub category_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TagRow> for TagWithCategories {
    fn from(row: TagRow) -> Self {
        TagWithCategories {
            tag: TagEntity { id: row.id, name: row.name, created_at: row.created_at },
            category_ids: row.category_ids,
        }
    }
}
