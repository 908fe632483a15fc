use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::api::{error, success};
use crate::middlewares::{ensure_permission, get_claims};
use crate::modules::{
    permission::schema::{Action, ResourceType},
    upload::{multipart::read_form, service::UploadService},
    version::{
        model::ShareModel,
        schema::{AssetActivityEntity, AssetVersionEntity},
        service::VersionService,
    },
};
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_versions(
    version_service: web::Data<VersionService>,
    path: web::Path<Uuid>,
) -> Result<success::Success<Vec<AssetVersionEntity>>, error::Error> {
    let versions = version_service.list_versions(path.into_inner()).await?;
    Ok(success::Success::list(versions))
}

#[post("")]
pub async fn upload_version(
    version_service: web::Data<VersionService>,
    upload_service: web::Data<UploadService>,
    path: web::Path<Uuid>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<success::Success<AssetVersionEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let form = read_form(payload, upload_service.max_file_size()).await?;
    let file = form
        .files
        .first()
        .ok_or_else(|| error::Error::bad_request("No file found in request"))?;
    let notes = form.field("notes").map(str::to_string);

    let progress = |file_name: &str, percent: u8| {
        tracing::debug!(file_name, percent, "version upload progress");
    };
    let version = version_service
        .upload_version(path.into_inner(), file, notes, &claims.name, &progress)
        .await?;
    Ok(success::Success::created(Some(version)).message("Version uploaded successfully"))
}

#[post("/{version_number}/restore")]
pub async fn restore_version(
    version_service: web::Data<VersionService>,
    path: web::Path<(Uuid, i32)>,
    req: HttpRequest,
) -> Result<success::Success<AssetVersionEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let (asset_id, version_number) = path.into_inner();
    let version = version_service
        .restore_version(asset_id, version_number, &claims.name)
        .await?
        .ok_or_else(|| error::Error::not_found("Version not found"))?;
    Ok(success::Success::ok(Some(version)).message("Version restored successfully"))
}

#[get("")]
pub async fn list_activities(
    version_service: web::Data<VersionService>,
    path: web::Path<Uuid>,
) -> Result<success::Success<Vec<AssetActivityEntity>>, error::Error> {
    let activities = version_service.get_activities(path.into_inner()).await?;
    Ok(success::Success::list(activities))
}

#[post("/download")]
pub async fn log_download(
    version_service: web::Data<VersionService>,
    path: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<AssetActivityEntity>, error::Error> {
    let claims = ensure_permission(&req, Action::Download, ResourceType::Asset)?;
    let asset_id = path.into_inner();
    let current = version_service.current_version(asset_id).await?;
    let activity = version_service
        .log_download(asset_id, &claims.name, Some(current.version_number))
        .await?;
    Ok(success::Success::created(Some(activity)))
}

#[post("/share")]
pub async fn log_share(
    version_service: web::Data<VersionService>,
    path: web::Path<Uuid>,
    body: ValidatedJson<ShareModel>,
    req: HttpRequest,
) -> Result<success::Success<AssetActivityEntity>, error::Error> {
    let claims = ensure_permission(&req, Action::Share, ResourceType::Asset)?;
    let activity = version_service
        .log_share(path.into_inner(), &claims.name, body.0.shared_link_id)
        .await?;
    Ok(success::Success::created(Some(activity)))
}
