use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        asset::{
            model::AssetQuery,
            schema::{AssetEntity, AssetMetadata},
        },
        version::model::NewVersion,
    },
};

#[async_trait::async_trait]
pub trait AssetRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AssetEntity>, error::SystemError>;

    async fn find_all(&self) -> Result<Vec<AssetEntity>, error::SystemError>;

    /// Filtered, sorted page plus the filtered total before pagination.
    async fn find_page(
        &self,
        query: &AssetQuery,
    ) -> Result<(Vec<AssetEntity>, usize), error::SystemError>;

    /// Inserts the asset together with its first version, flagged current.
    async fn create(
        &self,
        asset: &AssetEntity,
        initial_version: &NewVersion,
    ) -> Result<AssetEntity, error::SystemError>;

    async fn update_metadata(
        &self,
        id: &Uuid,
        metadata: &AssetMetadata,
    ) -> Result<AssetEntity, error::SystemError>;

    /// Appends the names not already present, keeping display order.
    async fn add_tags(&self, id: &Uuid, names: &[String]) -> Result<AssetEntity, error::SystemError>;

    async fn remove_tags(
        &self,
        id: &Uuid,
        names: &[String],
    ) -> Result<AssetEntity, error::SystemError>;

    async fn set_folder(
        &self,
        id: &Uuid,
        folder_id: Option<&Uuid>,
        folder_path: &str,
    ) -> Result<AssetEntity, error::SystemError>;

    async fn assign_filter_values(
        &self,
        id: &Uuid,
        value_ids: &[Uuid],
    ) -> Result<AssetEntity, error::SystemError>;

    async fn unassign_filter_values(
        &self,
        id: &Uuid,
        value_ids: &[Uuid],
    ) -> Result<AssetEntity, error::SystemError>;

    /// Drops every tag string not in `known`; returns the number of assets changed.
    async fn retain_tags(&self, known: &[String]) -> Result<u64, error::SystemError>;

    /// Removes the asset with its versions, activities and filter assignments.
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
