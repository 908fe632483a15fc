use uuid::Uuid;

use crate::{
    api::error,
    modules::folder::{repository::FolderRepository, schema::FolderEntity},
    store::MemoryStore,
};

#[async_trait::async_trait]
impl FolderRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FolderEntity>, error::SystemError> {
        Ok(self.read().await.folders.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<FolderEntity>, error::SystemError> {
        let mut folders: Vec<FolderEntity> = self.read().await.folders.values().cloned().collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(folders)
    }

    async fn find_children(
        &self,
        parent_id: Option<&Uuid>,
    ) -> Result<Vec<FolderEntity>, error::SystemError> {
        let mut children: Vec<FolderEntity> = self
            .read()
            .await
            .folders
            .values()
            .filter(|f| f.parent_id.as_ref() == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn create(&self, folder: &FolderEntity) -> Result<FolderEntity, error::SystemError> {
        let mut state = self.write().await;
        if let Some(parent_id) = &folder.parent_id {
            if !state.folders.contains_key(parent_id) {
                return Err(error::SystemError::not_found("Parent folder not found"));
            }
        }
        state.folders.insert(folder.id, folder.clone());
        Ok(folder.clone())
    }

    async fn save_all(&self, folders: &[FolderEntity]) -> Result<(), error::SystemError> {
        let mut state = self.write().await;
        if folders.iter().any(|f| !state.folders.contains_key(&f.id)) {
            return Err(error::SystemError::not_found("Folder not found"));
        }
        for folder in folders {
            state.folders.insert(folder.id, folder.clone());
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, error::SystemError> {
        let mut state = self.write().await;
        let removed = ids.iter().filter(|id| state.folders.remove(*id).is_some()).count();
        // assets keep their folder path string but lose the dangling id
        for asset in state.assets.values_mut() {
            if asset.folder_id.is_some_and(|fid| ids.contains(&fid)) {
                asset.folder_id = None;
            }
        }
        Ok(removed as u64)
    }
}
