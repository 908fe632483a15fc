use actix_web::{delete, get, patch, post, web};
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::folder::{model, schema::FolderEntity, service::FolderService};
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_folders(
    folder_service: web::Data<FolderService>,
    query: web::Query<model::ListFoldersQuery>,
) -> Result<success::Success<Vec<FolderEntity>>, error::Error> {
    let folders = folder_service.list_children(query.parent_id).await?;
    Ok(success::Success::list(folders).message("Folders retrieved successfully"))
}

#[get("/tree")]
pub async fn folder_tree(
    folder_service: web::Data<FolderService>,
) -> Result<success::Success<Vec<model::FolderNode>>, error::Error> {
    let tree = folder_service.tree().await?;
    Ok(success::Success::list(tree))
}

#[post("")]
pub async fn create_folder(
    folder_service: web::Data<FolderService>,
    body: ValidatedJson<model::CreateFolderModel>,
) -> Result<success::Success<FolderEntity>, error::Error> {
    let model::CreateFolderModel { name, parent_id } = body.0;
    let folder = folder_service.create(name, parent_id).await?;
    Ok(success::Success::created(Some(folder)).message("Folder created successfully"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_folder(
    folder_service: web::Data<FolderService>,
    folder_id: web::Path<Uuid>,
) -> Result<success::Success<FolderEntity>, error::Error> {
    let folder = folder_service.get(folder_id.into_inner()).await?;
    Ok(success::Success::ok(Some(folder)))
}

#[patch("/{id:[0-9a-fA-F-]{36}}/name")]
pub async fn rename_folder(
    folder_service: web::Data<FolderService>,
    folder_id: web::Path<Uuid>,
    body: ValidatedJson<model::RenameFolderModel>,
) -> Result<success::Success<FolderEntity>, error::Error> {
    let folder = folder_service.rename(folder_id.into_inner(), body.0.name).await?;
    Ok(success::Success::ok(Some(folder)).message("Folder renamed successfully"))
}

#[patch("/{id:[0-9a-fA-F-]{36}}/parent")]
pub async fn move_folder(
    folder_service: web::Data<FolderService>,
    folder_id: web::Path<Uuid>,
    body: web::Json<model::MoveFolderModel>,
) -> Result<success::Success<FolderEntity>, error::Error> {
    let folder = folder_service.move_to(folder_id.into_inner(), body.parent_id).await?;
    Ok(success::Success::ok(Some(folder)).message("Folder moved successfully"))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn delete_folder(
    folder_service: web::Data<FolderService>,
    folder_id: web::Path<Uuid>,
) -> Result<success::Success<model::DeletedFolders>, error::Error> {
    let deleted = folder_service.delete(folder_id.into_inner()).await?;
    Ok(success::Success::ok(Some(deleted)).message("Folder deleted successfully"))
}

