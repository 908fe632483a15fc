use crate::middlewares::require_method_permission;
use crate::modules::permission::schema::ResourceType;
use crate::modules::taxonomy::handle::*;
use actix_web::middleware::from_fn;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/tags")
            .wrap(from_fn(require_method_permission(ResourceType::Tag)))
            .service(list_tags)
            .service(create_tag)
            .service(rename_tag)
            .service(delete_tag),
    )
    .service(
        scope("/filter-categories")
            .wrap(from_fn(require_method_permission(ResourceType::FilterCategory)))
            .service(list_categories)
            .service(create_category)
            .service(rename_category)
            .service(delete_category)
            .service(add_category_tags)
            .service(remove_category_tags)
            .service(list_category_values)
            .service(create_category_value),
    )
    .service(
        scope("/filter-values")
            .wrap(from_fn(require_method_permission(ResourceType::FilterCategory)))
            .service(list_values)
            .service(delete_value),
    );
}
