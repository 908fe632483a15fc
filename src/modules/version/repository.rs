use uuid::Uuid;

use crate::{
    api::error,
    modules::version::{
        model::{AppendedVersion, NewVersion},
        schema::{AssetActivityEntity, AssetVersionEntity},
    },
};

#[async_trait::async_trait]
pub trait VersionRepository {
    async fn asset_exists(&self, asset_id: &Uuid) -> Result<bool, error::SystemError>;

    /// Versions of an asset ordered by version number ascending.
    async fn find_versions(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<AssetVersionEntity>, error::SystemError>;

    /// Appends `max + 1` as the only current version and points the asset at it.
    /// Fails with `NotFound` when the asset does not exist.
    async fn append_version(
        &self,
        asset_id: &Uuid,
        version: &NewVersion,
    ) -> Result<AppendedVersion, error::SystemError>;

    /// Flips the current flag to `version_number` and points the asset at it.
    /// `Ok(None)` when the asset has no such version.
    async fn set_current(
        &self,
        asset_id: &Uuid,
        version_number: i32,
    ) -> Result<Option<AppendedVersion>, error::SystemError>;

    async fn append_activity(
        &self,
        activity: &AssetActivityEntity,
    ) -> Result<AssetActivityEntity, error::SystemError>;

    /// Activities of an asset, newest first.
    async fn find_activities(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<AssetActivityEntity>, error::SystemError>;
}
