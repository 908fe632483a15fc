use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::permission::{
    provider::PermissionProvider,
    schema::{Action, ResourceType},
};
use crate::utils::Claims;

#[derive(Clone)]
pub struct PermissionService {
    provider: Arc<dyn PermissionProvider + Send + Sync>,
}

impl PermissionService {
    pub fn with_dependencies(provider: Arc<dyn PermissionProvider + Send + Sync>) -> Self {
        info!("PermissionService initialized with dependencies");
        PermissionService { provider }
    }

    pub fn check(
        &self,
        claims: &Claims,
        action: Action,
        resource_type: ResourceType,
        resource_id: Option<&Uuid>,
    ) -> Result<(), error::SystemError> {
        if self.provider.has_permission(claims, action, resource_type, resource_id) {
            return Ok(());
        }
        warn!("{} ({:?}) denied {:?} on {:?}", claims.sub, claims.role, action, resource_type);
        Err(error::SystemError::forbidden("No permission"))
    }
}
