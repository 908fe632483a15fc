use crate::middlewares::require_permission;
use crate::modules::permission::schema::{Action, ResourceType};
use crate::modules::search::handle::*;
use actix_web::middleware::from_fn;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/search")
            .wrap(from_fn(require_permission(Action::View, ResourceType::Search)))
            .service(filter_assets)
            .service(advanced_search)
            .service(get_history)
            .service(clear_history),
    );
}
