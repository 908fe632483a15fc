use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    View,
    Download,
    Share,
    Edit,
    VersionUpload,
    VersionRestore,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetVersionEntity {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub version_number: i32,
    pub file_url: String,
    pub file_size: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
    pub notes: Option<String>,
    pub is_current_version: bool,
}

/// Typed view of an activity's context map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restored_from: Option<i32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetActivityEntity {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub action: ActivityAction,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub actor_name: String,
    pub version_number: Option<i32>,
    pub shared_link_id: Option<String>,
    #[sqlx(json)]
    pub context_data: ActivityContext,
}
