use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::asset::schema::{AssetEntity, AssetMetadata};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetModel {
    #[serde(alias = "filename")]
    #[validate(length(min = 1, max = 255, message = "Asset name must be 1-255 characters"))]
    pub name: String,
    #[serde(alias = "filePath")]
    #[validate(length(min = 1, message = "File url cannot be empty"))]
    pub file_url: String,
    #[validate(range(min = 0, message = "File size cannot be negative"))]
    pub file_size: i64,
    #[validate(length(min = 1, message = "Mime type cannot be empty"))]
    pub mime_type: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: AssetMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Name,
    #[default]
    CreatedAt,
    UpdatedAt,
    Size,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Catalog listing filter. Empty collections and `None` mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct AssetQuery {
    pub search: Option<String>,
    pub folder_id: Option<Uuid>,
    pub mime_types: Vec<String>,
    pub tags: Vec<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl AssetQuery {
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, asset: &AssetEntity) -> bool {
        if let Some(term) = self.search_term() {
            if !asset.matches_text(&term) {
                return false;
            }
        }
        if let Some(folder_id) = &self.folder_id {
            if asset.folder_id.as_ref() != Some(folder_id) {
                return false;
            }
        }
        if !self.mime_types.is_empty() && !self.mime_types.contains(&asset.mime_type) {
            return false;
        }
        if !self.tags.is_empty() && !asset.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        true
    }

    pub fn sort(&self, assets: &mut [AssetEntity]) {
        assets.sort_by(|a, b| {
            let ordering = match self.sort_by {
                SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortBy::CreatedAt => a.uploaded_at.cmp(&b.uploaded_at),
                SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortBy::Size => a.size.cmp(&b.size),
            };
            match self.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

/// Query string form of [`AssetQuery`]; lists are comma separated.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssetListQuery {
    pub search: Option<String>,
    pub folder_id: Option<Uuid>,
    pub mime_types: Option<String>,
    pub tags: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<usize>,
    #[serde(default)]
    #[validate(range(max = 1_000_000, message = "Offset is too large"))]
    pub offset: usize,
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

impl From<AssetListQuery> for AssetQuery {
    fn from(query: AssetListQuery) -> Self {
        AssetQuery {
            search: query.search,
            folder_id: query.folder_id,
            mime_types: split_list(query.mime_types),
            tags: split_list(query.tags),
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    pub items: Vec<AssetEntity>,
    pub total: usize,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetadataModel {
    pub metadata: AssetMetadata,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilterValueIdsModel {
    #[validate(length(min = 1, message = "At least one filter value is required"))]
    pub filter_value_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveAssetModel {
    pub folder_id: Option<Uuid>,
}

/// Result of a tag reconciliation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub assets_updated: u64,
}
