use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::error;
use crate::modules::folder::{
    model::{DeletedFolders, FolderNode},
    repository::FolderRepository,
    schema::FolderEntity,
    tree::FolderTree,
};

#[derive(Clone)]
pub struct FolderService {
    repo: Arc<dyn FolderRepository + Send + Sync>,
    // serialises tree rewrites so subtree paths never interleave
    write_lock: Arc<Mutex<()>>,
}

fn validate_name(name: &str) -> Result<String, error::SystemError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(error::SystemError::bad_request("Folder name cannot be empty"));
    }
    if name.contains('/') {
        return Err(error::SystemError::bad_request("Folder name cannot contain '/'"));
    }
    Ok(name.to_string())
}

impl FolderService {
    pub fn with_dependencies(repo: Arc<dyn FolderRepository + Send + Sync>) -> Self {
        info!("FolderService initialized with dependencies");
        FolderService { repo, write_lock: Arc::new(Mutex::new(())) }
    }

    pub async fn get(&self, id: Uuid) -> Result<FolderEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Folder not found"))
    }

    pub async fn path_of(&self, id: Uuid) -> Result<String, error::SystemError> {
        Ok(self.get(id).await?.path)
    }

    pub async fn create(
        &self,
        name: String,
        parent_id: Option<Uuid>,
    ) -> Result<FolderEntity, error::SystemError> {
        let name = validate_name(&name)?;
        let _guard = self.write_lock.lock().await;

        let tree = FolderTree::new(self.repo.find_all().await?);
        if let Some(pid) = &parent_id {
            if tree.get(pid).is_none() {
                return Err(error::SystemError::not_found("Parent folder not found"));
            }
        }
        if tree.has_sibling_named(parent_id, &name, None) {
            return Err(error::SystemError::conflict(format!("Folder '{name}' already exists")));
        }

        let now = chrono::Utc::now();
        let folder = FolderEntity {
            id: Uuid::now_v7(),
            path: tree.path_under(parent_id, &name),
            name,
            parent_id,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&folder).await?;
        info!("Folder {} created at {}", created.id, created.path);
        Ok(created)
    }

    pub async fn rename(&self, id: Uuid, new_name: String) -> Result<FolderEntity, error::SystemError> {
        let name = validate_name(&new_name)?;
        let _guard = self.write_lock.lock().await;

        let tree = FolderTree::new(self.repo.find_all().await?);
        let parent_id = tree
            .get(&id)
            .ok_or_else(|| error::SystemError::not_found("Folder not found"))?
            .parent_id;

        self.relocate(tree, id, name, parent_id).await
    }

    pub async fn move_to(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<FolderEntity, error::SystemError> {
        let _guard = self.write_lock.lock().await;

        let tree = FolderTree::new(self.repo.find_all().await?);
        let name = tree
            .get(&id)
            .ok_or_else(|| error::SystemError::not_found("Folder not found"))?
            .name
            .clone();

        if let Some(pid) = &new_parent_id {
            if tree.get(pid).is_none() {
                return Err(error::SystemError::not_found("Target parent folder not found"));
            }
            if tree.is_self_or_descendant(&id, pid) {
                return Err(error::SystemError::cycle(
                    "Cannot move a folder into itself or one of its descendants",
                ));
            }
        }

        self.relocate(tree, id, name, new_parent_id).await
    }

    async fn relocate(
        &self,
        mut tree: FolderTree,
        id: Uuid,
        name: String,
        parent_id: Option<Uuid>,
    ) -> Result<FolderEntity, error::SystemError> {
        if tree.has_sibling_named(parent_id, &name, Some(id)) {
            return Err(error::SystemError::conflict(format!("Folder '{name}' already exists")));
        }

        let changed = tree.relocate(&id, name, parent_id, chrono::Utc::now());
        let folder = changed
            .first()
            .cloned()
            .ok_or_else(|| error::SystemError::not_found("Folder not found"))?;

        self.repo.save_all(&changed).await?;
        info!("Folder {} now at {} ({} paths rewritten)", id, folder.path, changed.len());
        Ok(folder)
    }

    /// Removes the folder and its whole subtree. Assets keep their stored folder path.
    pub async fn delete(&self, id: Uuid) -> Result<DeletedFolders, error::SystemError> {
        let _guard = self.write_lock.lock().await;

        let tree = FolderTree::new(self.repo.find_all().await?);
        let root = tree.get(&id).ok_or_else(|| error::SystemError::not_found("Folder not found"))?;

        let mut ids = vec![id];
        ids.extend(tree.descendants(&id));
        let paths = ids.iter().filter_map(|fid| tree.get(fid)).map(|f| f.path.clone()).collect();

        self.repo.delete_many(&ids).await?;
        info!("Folder {} deleted with {} descendants", root.path, ids.len() - 1);
        Ok(DeletedFolders { ids, paths })
    }

    pub async fn list_children(
        &self,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<FolderEntity>, error::SystemError> {
        if let Some(pid) = &parent_id {
            if self.repo.find_by_id(pid).await?.is_none() {
                return Err(error::SystemError::not_found("Folder not found"));
            }
        }
        self.repo.find_children(parent_id.as_ref()).await
    }

    pub async fn tree(&self) -> Result<Vec<FolderNode>, error::SystemError> {
        Ok(FolderTree::new(self.repo.find_all().await?).nested())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, test::folder_service};

    fn assert_path_invariant(folders: &[FolderEntity]) {
        for folder in folders {
            let expected = match folder.parent_id {
                None => format!("/{}", folder.name),
                Some(pid) => {
                    let parent = folders.iter().find(|f| f.id == pid).expect("parent exists");
                    format!("{}/{}", parent.path, folder.name)
                }
            };
            assert_eq!(folder.path, expected, "path of {}", folder.name);
        }
    }

    #[tokio::test]
    async fn create_derives_path_from_parent() {
        let service = folder_service(&MemoryStore::new());

        let marketing = service.create("marketing".into(), None).await.unwrap();
        let social = service.create("social".into(), Some(marketing.id)).await.unwrap();

        assert_eq!(marketing.path, "/marketing");
        assert_eq!(social.path, "/marketing/social");
    }

    #[tokio::test]
    async fn create_under_missing_parent_is_not_found() {
        let service = folder_service(&MemoryStore::new());

        let err = service.create("orphan".into(), Some(Uuid::now_v7())).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_rejects_bad_names_and_duplicates() {
        let service = folder_service(&MemoryStore::new());
        service.create("sales".into(), None).await.unwrap();

        assert!(matches!(
            service.create("  ".into(), None).await.unwrap_err(),
            error::SystemError::BadRequest(_)
        ));
        assert!(matches!(
            service.create("a/b".into(), None).await.unwrap_err(),
            error::SystemError::BadRequest(_)
        ));
        assert!(matches!(
            service.create("sales".into(), None).await.unwrap_err(),
            error::SystemError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn rename_rewrites_descendant_paths() {
        let service = folder_service(&MemoryStore::new());
        let marketing = service.create("marketing".into(), None).await.unwrap();
        let social = service.create("social".into(), Some(marketing.id)).await.unwrap();
        let deep = service.create("2024".into(), Some(social.id)).await.unwrap();
        let lookalike = service.create("marketing-archive".into(), None).await.unwrap();

        let renamed = service.rename(marketing.id, "brand".into()).await.unwrap();

        assert_eq!(renamed.path, "/brand");
        assert_eq!(service.get(social.id).await.unwrap().path, "/brand/social");
        assert_eq!(service.get(deep.id).await.unwrap().path, "/brand/social/2024");
        assert_eq!(service.get(lookalike.id).await.unwrap().path, "/marketing-archive");
    }

    #[tokio::test]
    async fn rename_missing_folder_is_not_found() {
        let service = folder_service(&MemoryStore::new());
        let err = service.rename(Uuid::now_v7(), "x".into()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn move_keeps_path_invariant_for_subtree() {
        let store = MemoryStore::new();
        let service = folder_service(&store);
        let a = service.create("a".into(), None).await.unwrap();
        let b = service.create("b".into(), None).await.unwrap();
        let a1 = service.create("a1".into(), Some(a.id)).await.unwrap();
        service.create("a2".into(), Some(a1.id)).await.unwrap();

        let moved = service.move_to(a.id, Some(b.id)).await.unwrap();
        assert_eq!(moved.path, "/b/a");
        assert_eq!(service.get(a1.id).await.unwrap().path, "/b/a/a1");

        service.move_to(a1.id, None).await.unwrap();
        assert_eq!(service.get(a1.id).await.unwrap().path, "/a1");

        let all = FolderRepository::find_all(&store).await.unwrap();
        assert_path_invariant(&all);
    }

    #[tokio::test]
    async fn move_into_self_or_descendant_is_rejected() {
        let store = MemoryStore::new();
        let service = folder_service(&store);
        let a = service.create("a".into(), None).await.unwrap();
        let child = service.create("child".into(), Some(a.id)).await.unwrap();
        let grandchild = service.create("grandchild".into(), Some(child.id)).await.unwrap();
        let before = FolderRepository::find_all(&store).await.unwrap();

        for target in [a.id, child.id, grandchild.id] {
            let err = service.move_to(a.id, Some(target)).await.unwrap_err();
            assert!(matches!(err, error::SystemError::Cycle(_)));
        }

        let after = FolderRepository::find_all(&store).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn delete_cascades_to_descendants() {
        let service = folder_service(&MemoryStore::new());
        let a = service.create("a".into(), None).await.unwrap();
        let child = service.create("child".into(), Some(a.id)).await.unwrap();
        let keep = service.create("keep".into(), None).await.unwrap();

        let deleted = service.delete(a.id).await.unwrap();

        assert_eq!(deleted.ids.len(), 2);
        assert!(deleted.paths.contains(&"/a/child".to_string()));
        assert!(service.get(child.id).await.is_err());
        assert!(service.get(keep.id).await.is_ok());
    }

    #[tokio::test]
    async fn list_children_is_sorted_and_restartable() {
        let service = folder_service(&MemoryStore::new());
        let root = service.create("root".into(), None).await.unwrap();
        for name in ["zeta", "alpha", "mid"] {
            service.create(name.into(), Some(root.id)).await.unwrap();
        }

        let first: Vec<String> =
            service.list_children(Some(root.id)).await.unwrap().into_iter().map(|f| f.name).collect();
        let second: Vec<String> =
            service.list_children(Some(root.id)).await.unwrap().into_iter().map(|f| f.name).collect();

        assert_eq!(first, vec!["alpha", "mid", "zeta"]);
        assert_eq!(first, second);
        assert_eq!(service.list_children(None).await.unwrap().len(), 1);
    }
}
