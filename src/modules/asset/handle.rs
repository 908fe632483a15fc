use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, put, web, HttpRequest};
use uuid::Uuid;

use crate::api::{error, success};
use crate::middlewares::{ensure_permission, get_claims};
use crate::modules::{
    asset::{model, schema::AssetEntity, service::AssetService},
    permission::schema::{Action, ResourceType},
    taxonomy::model::TagIdsModel,
    upload::{
        model::{UploadBatch, UploadOutcome},
        multipart::read_form,
        service::UploadService,
    },
    version::service::VersionService,
};
use crate::utils::{ValidatedJson, ValidatedQuery};

fn log_progress(file_name: &str, percent: u8) {
    tracing::debug!(file_name, percent, "upload progress");
}

#[get("")]
pub async fn list_assets(
    asset_service: web::Data<AssetService>,
    query: ValidatedQuery<model::AssetListQuery>,
) -> Result<success::Success<model::AssetPage>, error::Error> {
    let page = asset_service.list(&query.0.into()).await?;
    Ok(success::Success::ok(Some(page)))
}

#[post("")]
pub async fn create_asset(
    asset_service: web::Data<AssetService>,
    body: ValidatedJson<model::CreateAssetModel>,
    req: HttpRequest,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let asset = asset_service.create(body.0, &claims.name).await?;
    Ok(success::Success::created(Some(asset)).message("Asset created successfully"))
}

#[post("/upload")]
pub async fn upload_assets(
    asset_service: web::Data<AssetService>,
    upload_service: web::Data<UploadService>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<Vec<UploadOutcome>>, error::Error> {
    let claims = get_claims(&req)?;
    let form = read_form(payload, upload_service.max_file_size()).await?;
    if form.files.is_empty() {
        return Err(error::Error::bad_request("No file found in request"));
    }
    let folder_id = form
        .field("folderId")
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| error::Error::bad_request("Invalid folderId"))?;

    let batch = UploadBatch::new(form.files);
    let outcomes = asset_service.upload_batch(&batch, folder_id, &claims.name, &log_progress).await;
    Ok(success::Success::created(Some(outcomes)).message("Upload finished"))
}

#[post("/tags/reconcile")]
pub async fn reconcile_tags(
    asset_service: web::Data<AssetService>,
    req: HttpRequest,
) -> Result<success::Success<model::ReconcileReport>, error::Error> {
    ensure_permission(&req, Action::Admin, ResourceType::Tag)?;
    let report = asset_service.reconcile_tags().await?;
    Ok(success::Success::ok(Some(report)).message("Asset tags reconciled"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_asset(
    asset_service: web::Data<AssetService>,
    version_service: web::Data<VersionService>,
    asset_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let asset = asset_service.get_by_id(asset_id.into_inner()).await?;
    version_service.log_view(asset.id, &claims.name).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn delete_asset(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    asset_service.delete(asset_id.into_inner()).await?;
    Ok(success::Success::no_content())
}

#[put("/{id:[0-9a-fA-F-]{36}}/metadata")]
pub async fn update_metadata(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdateMetadataModel>,
    req: HttpRequest,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let asset =
        asset_service.update_metadata(asset_id.into_inner(), body.0.metadata, &claims.name).await?;
    Ok(success::Success::ok(Some(asset)).message("Metadata updated successfully"))
}

#[post("/{id:[0-9a-fA-F-]{36}}/tags")]
pub async fn add_tags(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<TagIdsModel>,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let asset = asset_service.add_tags(asset_id.into_inner(), body.0.tag_ids).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[delete("/{id:[0-9a-fA-F-]{36}}/tags")]
pub async fn remove_tags(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<TagIdsModel>,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let asset = asset_service.remove_tags(asset_id.into_inner(), body.0.tag_ids).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[post("/{id:[0-9a-fA-F-]{36}}/filter-values")]
pub async fn assign_filter_values(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<model::FilterValueIdsModel>,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let asset =
        asset_service.assign_filter_values(asset_id.into_inner(), body.0.filter_value_ids).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[delete("/{id:[0-9a-fA-F-]{36}}/filter-values")]
pub async fn unassign_filter_values(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<model::FilterValueIdsModel>,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let asset =
        asset_service.unassign_filter_values(asset_id.into_inner(), body.0.filter_value_ids).await?;
    Ok(success::Success::ok(Some(asset)))
}

#[patch("/{id:[0-9a-fA-F-]{36}}/folder")]
pub async fn move_asset(
    asset_service: web::Data<AssetService>,
    asset_id: web::Path<Uuid>,
    body: ValidatedJson<model::MoveAssetModel>,
) -> Result<success::Success<AssetEntity>, error::Error> {
    let asset = asset_service.move_to_folder(asset_id.into_inner(), body.0.folder_id).await?;
    Ok(success::Success::ok(Some(asset)).message("Asset moved successfully"))
}
