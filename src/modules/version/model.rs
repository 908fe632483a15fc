use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::modules::version::schema::{ActivityAction, ActivityContext, AssetActivityEntity};

/// Version row to append; the number and current flag are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub file_url: String,
    pub file_size: i64,
    pub created_by: String,
    pub notes: Option<String>,
}

/// Outcome of appending a version: the new row and the number that was current before.
#[derive(Debug, Clone)]
pub struct AppendedVersion {
    pub version: crate::modules::version::schema::AssetVersionEntity,
    pub previous_version: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub asset_id: Uuid,
    pub action: ActivityAction,
    pub actor_name: String,
    pub version_number: Option<i32>,
    pub shared_link_id: Option<String>,
    pub context_data: ActivityContext,
}

impl NewActivity {
    pub fn new(asset_id: Uuid, action: ActivityAction, actor_name: impl Into<String>) -> Self {
        Self {
            asset_id,
            action,
            actor_name: actor_name.into(),
            version_number: None,
            shared_link_id: None,
            context_data: ActivityContext::default(),
        }
    }

    pub fn with_version(mut self, version_number: i32) -> Self {
        self.version_number = Some(version_number);
        self
    }

    pub fn with_shared_link(mut self, shared_link_id: impl Into<String>) -> Self {
        self.shared_link_id = Some(shared_link_id.into());
        self
    }

    pub fn with_context(mut self, context_data: ActivityContext) -> Self {
        self.context_data = context_data;
        self
    }

    pub fn into_entity(self) -> AssetActivityEntity {
        AssetActivityEntity {
            id: Uuid::now_v7(),
            asset_id: self.asset_id,
            action: self.action,
            timestamp: chrono::Utc::now(),
            actor_name: self.actor_name,
            version_number: self.version_number,
            shared_link_id: self.shared_link_id,
            context_data: self.context_data,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShareModel {
    #[validate(length(min = 1, message = "Shared link id cannot be empty"))]
    pub shared_link_id: String,
}
