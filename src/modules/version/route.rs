use crate::middlewares::{require_method_permission, require_permission};
use crate::modules::permission::schema::{Action, ResourceType};
use crate::modules::version::handle::*;
use actix_web::middleware::from_fn;
use actix_web::web::{scope, ServiceConfig};

/// Must be registered ahead of the `/assets` scope, which would otherwise claim these paths.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/assets/{id:[0-9a-fA-F-]{36}}/versions")
            .wrap(from_fn(require_method_permission(ResourceType::Asset)))
            .service(list_versions)
            .service(upload_version)
            .service(restore_version),
    )
    .service(
        scope("/assets/{id:[0-9a-fA-F-]{36}}/activities")
            .wrap(from_fn(require_permission(Action::View, ResourceType::Asset)))
            .service(list_activities)
            .service(log_download)
            .service(log_share),
    );
}
