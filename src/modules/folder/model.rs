use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::folder::schema::FolderEntity;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderModel {
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters long"))]
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenameFolderModel {
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters long"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFolderModel {
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFoldersQuery {
    pub parent_id: Option<Uuid>,
}

/// Nested view of the folder hierarchy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub children: Vec<FolderNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedFolders {
    pub ids: Vec<Uuid>,
    pub paths: Vec<String>,
}

impl From<&FolderEntity> for FolderNode {
    fn from(folder: &FolderEntity) -> Self {
        FolderNode {
            id: folder.id,
            name: folder.name.clone(),
            path: folder.path.clone(),
            children: Vec::new(),
        }
    }
}
