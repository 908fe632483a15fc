use crate::middlewares::require_method_permission;
use crate::modules::asset::handle::*;
use crate::modules::permission::schema::ResourceType;
use actix_web::middleware::from_fn;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/assets")
            .wrap(from_fn(require_method_permission(ResourceType::Asset)))
            .service(list_assets)
            .service(create_asset)
            .service(upload_assets)
            .service(reconcile_tags)
            .service(get_asset)
            .service(delete_asset)
            .service(update_metadata)
            .service(add_tags)
            .service(remove_tags)
            .service(assign_filter_values)
            .service(unassign_filter_values)
            .service(move_asset),
    );
}
