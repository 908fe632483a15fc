use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Typed view of the open metadata map: well-known keys plus an `extra` bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterAssignment {
    pub asset_id: Uuid,
    pub filter_value_id: Uuid,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntity {
    pub id: Uuid,
    pub name: String,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    /// Lower-case file extension without the dot.
    pub file_type: String,
    pub mime_type: String,
    pub size: i64,
    pub uploaded_by: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub tags: Vec<String>,
    pub folder_id: Option<Uuid>,
    /// Folder path captured when the asset was placed; "/" for the root.
    pub folder: String,
    pub version: i32,
    #[sqlx(json)]
    pub metadata: AssetMetadata,
    #[sqlx(skip)]
    pub filter_assignments: Vec<FilterAssignment>,
}

impl AssetEntity {
    pub fn has_filter_value(&self, filter_value_id: &Uuid) -> bool {
        self.filter_assignments.iter().any(|a| a.filter_value_id == *filter_value_id)
    }

    /// `term` must already be lower-case. Matches name, any tag or the description.
    pub fn matches_text(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(term))
            || self
                .metadata
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(term))
    }
}
