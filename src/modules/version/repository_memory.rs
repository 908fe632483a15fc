use uuid::Uuid;

use crate::{
    api::error,
    modules::version::{
        model::{AppendedVersion, NewVersion},
        repository::VersionRepository,
        schema::{AssetActivityEntity, AssetVersionEntity},
    },
    store::{MemoryState, MemoryStore},
};

fn point_asset_at(state: &mut MemoryState, version: &AssetVersionEntity) {
    if let Some(asset) = state.assets.get_mut(&version.asset_id) {
        asset.version = version.version_number;
        asset.file_url = version.file_url.clone();
        asset.size = version.file_size;
        asset.updated_at = chrono::Utc::now();
    }
}

#[async_trait::async_trait]
impl VersionRepository for MemoryStore {
    async fn asset_exists(&self, asset_id: &Uuid) -> Result<bool, error::SystemError> {
        Ok(self.read().await.assets.contains_key(asset_id))
    }

    async fn find_versions(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<AssetVersionEntity>, error::SystemError> {
        let mut versions = self.read().await.versions.get(asset_id).cloned().unwrap_or_default();
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    async fn append_version(
        &self,
        asset_id: &Uuid,
        version: &NewVersion,
    ) -> Result<AppendedVersion, error::SystemError> {
        let mut state = self.write().await;
        if !state.assets.contains_key(asset_id) {
            return Err(error::SystemError::not_found("Asset not found"));
        }

        let lineage = state.versions.entry(*asset_id).or_default();
        let previous_version = lineage.iter().find(|v| v.is_current_version).map(|v| v.version_number);
        let next = lineage.iter().map(|v| v.version_number).max().unwrap_or(0) + 1;
        for existing in lineage.iter_mut() {
            existing.is_current_version = false;
        }

        let entity = AssetVersionEntity {
            id: Uuid::now_v7(),
            asset_id: *asset_id,
            version_number: next,
            file_url: version.file_url.clone(),
            file_size: version.file_size,
            created_at: chrono::Utc::now(),
            created_by: version.created_by.clone(),
            notes: version.notes.clone(),
            is_current_version: true,
        };
        lineage.push(entity.clone());
        point_asset_at(&mut state, &entity);

        Ok(AppendedVersion { version: entity, previous_version })
    }

    async fn set_current(
        &self,
        asset_id: &Uuid,
        version_number: i32,
    ) -> Result<Option<AppendedVersion>, error::SystemError> {
        let mut state = self.write().await;
        let Some(lineage) = state.versions.get_mut(asset_id) else {
            return Ok(None);
        };
        if !lineage.iter().any(|v| v.version_number == version_number) {
            return Ok(None);
        }

        let previous_version = lineage.iter().find(|v| v.is_current_version).map(|v| v.version_number);
        let mut target = None;
        for existing in lineage.iter_mut() {
            existing.is_current_version = existing.version_number == version_number;
            if existing.is_current_version {
                target = Some(existing.clone());
            }
        }

        Ok(target.map(|version| {
            point_asset_at(&mut state, &version);
            AppendedVersion { version, previous_version }
        }))
    }

    async fn append_activity(
        &self,
        activity: &AssetActivityEntity,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        let mut state = self.write().await;
        if !state.assets.contains_key(&activity.asset_id) {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        state.activities.entry(activity.asset_id).or_default().push(activity.clone());
        Ok(activity.clone())
    }

    async fn find_activities(
        &self,
        asset_id: &Uuid,
    ) -> Result<Vec<AssetActivityEntity>, error::SystemError> {
        let mut activities =
            self.read().await.activities.get(asset_id).cloned().unwrap_or_default();
        // later appends win ties on identical timestamps
        activities.reverse();
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activities)
    }
}
