use uuid::Uuid;

use crate::{
    modules::permission::schema::{Action, ResourceType, Role},
    utils::Claims,
};

/// Answers whether the caller may perform `action` on a resource.
pub trait PermissionProvider {
    fn has_permission(
        &self,
        claims: &Claims,
        action: Action,
        resource_type: ResourceType,
        resource_id: Option<&Uuid>,
    ) -> bool;
}

/// Static role table: admins may do anything, editors may not delete or administer
/// the folder tree and taxonomy, viewers may only view and download.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePermissionProvider;

impl PermissionProvider for RolePermissionProvider {
    fn has_permission(
        &self,
        claims: &Claims,
        action: Action,
        resource_type: ResourceType,
        _resource_id: Option<&Uuid>,
    ) -> bool {
        match claims.role {
            Role::Admin => true,
            Role::Editor => !matches!(
                (action, resource_type),
                (
                    Action::Delete | Action::Admin,
                    ResourceType::Folder | ResourceType::Tag | ResourceType::FilterCategory
                )
            ),
            Role::Viewer => matches!(action, Action::View | Action::Download),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims::new(&Uuid::now_v7(), "tester", role, 60)
    }

    #[test]
    fn role_table() {
        let provider = RolePermissionProvider;
        let check = |role, action, resource| provider.has_permission(&claims(role), action, resource, None);

        assert!(check(Role::Admin, Action::Delete, ResourceType::Folder));
        assert!(check(Role::Editor, Action::Delete, ResourceType::Asset));
        assert!(check(Role::Editor, Action::Edit, ResourceType::Tag));
        assert!(!check(Role::Editor, Action::Delete, ResourceType::FilterCategory));
        assert!(!check(Role::Editor, Action::Admin, ResourceType::Folder));
        assert!(check(Role::Viewer, Action::Download, ResourceType::Asset));
        assert!(check(Role::Viewer, Action::View, ResourceType::Search));
        assert!(!check(Role::Viewer, Action::Share, ResourceType::Asset));
        assert!(!check(Role::Viewer, Action::Create, ResourceType::Folder));
    }
}
