use crate::middlewares::require_method_permission;
use crate::modules::folder::handle::*;
use crate::modules::permission::schema::ResourceType;
use actix_web::middleware::from_fn;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/folders")
            .wrap(from_fn(require_method_permission(ResourceType::Folder)))
            .service(list_folders)
            .service(folder_tree)
            .service(create_folder)
            .service(get_folder)
            .service(rename_folder)
            .service(move_folder)
            .service(delete_folder),
    );
}
