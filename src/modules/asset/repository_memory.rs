use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        asset::{
            model::AssetQuery,
            repository::AssetRepository,
            schema::{AssetEntity, AssetMetadata, FilterAssignment},
        },
        version::{model::NewVersion, schema::AssetVersionEntity},
    },
    store::{MemoryState, MemoryStore},
};

fn touch<F>(state: &mut MemoryState, id: &Uuid, mutate: F) -> Result<AssetEntity, error::SystemError>
where
    F: FnOnce(&mut AssetEntity),
{
    let asset = state
        .assets
        .get_mut(id)
        .ok_or_else(|| error::SystemError::not_found("Asset not found"))?;
    mutate(asset);
    asset.updated_at = chrono::Utc::now();
    Ok(asset.clone())
}

#[async_trait::async_trait]
impl AssetRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AssetEntity>, error::SystemError> {
        Ok(self.read().await.assets.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<AssetEntity>, error::SystemError> {
        let mut assets: Vec<AssetEntity> = self.read().await.assets.values().cloned().collect();
        assets.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));
        Ok(assets)
    }

    async fn find_page(
        &self,
        query: &AssetQuery,
    ) -> Result<(Vec<AssetEntity>, usize), error::SystemError> {
        let mut matching: Vec<AssetEntity> = self
            .read()
            .await
            .assets
            .values()
            .filter(|asset| query.matches(asset))
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.id);
        query.sort(&mut matching);

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn create(
        &self,
        asset: &AssetEntity,
        initial_version: &NewVersion,
    ) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        if let Some(folder_id) = &asset.folder_id {
            if !state.folders.contains_key(folder_id) {
                return Err(error::SystemError::not_found("Folder not found"));
            }
        }

        let version = AssetVersionEntity {
            id: Uuid::now_v7(),
            asset_id: asset.id,
            version_number: 1,
            file_url: initial_version.file_url.clone(),
            file_size: initial_version.file_size,
            created_at: asset.uploaded_at,
            created_by: initial_version.created_by.clone(),
            notes: initial_version.notes.clone(),
            is_current_version: true,
        };
        state.assets.insert(asset.id, asset.clone());
        state.versions.insert(asset.id, vec![version]);
        Ok(asset.clone())
    }

    async fn update_metadata(
        &self,
        id: &Uuid,
        metadata: &AssetMetadata,
    ) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        touch(&mut state, id, |asset| asset.metadata = metadata.clone())
    }

    async fn add_tags(&self, id: &Uuid, names: &[String]) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        touch(&mut state, id, |asset| {
            for name in names {
                if !asset.tags.contains(name) {
                    asset.tags.push(name.clone());
                }
            }
        })
    }

    async fn remove_tags(
        &self,
        id: &Uuid,
        names: &[String],
    ) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        touch(&mut state, id, |asset| asset.tags.retain(|t| !names.contains(t)))
    }

    async fn set_folder(
        &self,
        id: &Uuid,
        folder_id: Option<&Uuid>,
        folder_path: &str,
    ) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        if let Some(folder_id) = folder_id {
            if !state.folders.contains_key(folder_id) {
                return Err(error::SystemError::not_found("Folder not found"));
            }
        }
        touch(&mut state, id, |asset| {
            asset.folder_id = folder_id.copied();
            asset.folder = folder_path.to_string();
        })
    }

    async fn assign_filter_values(
        &self,
        id: &Uuid,
        value_ids: &[Uuid],
    ) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        if value_ids.iter().any(|v| !state.filter_values.contains_key(v)) {
            return Err(error::SystemError::not_found("Filter value not found"));
        }
        let now = chrono::Utc::now();
        touch(&mut state, id, |asset| {
            for value_id in value_ids {
                if !asset.has_filter_value(value_id) {
                    asset.filter_assignments.push(FilterAssignment {
                        asset_id: asset.id,
                        filter_value_id: *value_id,
                        assigned_at: now,
                    });
                }
            }
        })
    }

    async fn unassign_filter_values(
        &self,
        id: &Uuid,
        value_ids: &[Uuid],
    ) -> Result<AssetEntity, error::SystemError> {
        let mut state = self.write().await;
        touch(&mut state, id, |asset| {
            asset.filter_assignments.retain(|a| !value_ids.contains(&a.filter_value_id))
        })
    }

    async fn retain_tags(&self, known: &[String]) -> Result<u64, error::SystemError> {
        let mut state = self.write().await;
        let now = chrono::Utc::now();
        let mut changed = 0;
        for asset in state.assets.values_mut() {
            let before = asset.tags.len();
            asset.tags.retain(|t| known.contains(t));
            if asset.tags.len() != before {
                asset.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut state = self.write().await;
        if state.assets.remove(id).is_none() {
            return Ok(false);
        }
        state.versions.remove(id);
        state.activities.remove(id);
        Ok(true)
    }
}
