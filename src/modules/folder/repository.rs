use uuid::Uuid;

use crate::{api::error, modules::folder::schema::FolderEntity};

#[async_trait::async_trait]
pub trait FolderRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FolderEntity>, error::SystemError>;

    async fn find_all(&self) -> Result<Vec<FolderEntity>, error::SystemError>;

    /// Children of `parent_id` (roots when `None`), ordered by name ascending.
    async fn find_children(
        &self,
        parent_id: Option<&Uuid>,
    ) -> Result<Vec<FolderEntity>, error::SystemError>;

    async fn create(&self, folder: &FolderEntity) -> Result<FolderEntity, error::SystemError>;

    /// Writes every given row in one atomic step; all rows must already exist.
    async fn save_all(&self, folders: &[FolderEntity]) -> Result<(), error::SystemError>;

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, error::SystemError>;
}
