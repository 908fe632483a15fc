use actix_cors::Cors;
use actix_web::{
    self, http, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

use crate::{
    configs::{KeyValueStore, MemoryCache, RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        asset::{repository::AssetRepository, repository_pg::AssetRepositoryPg, service::AssetService},
        folder::{
            repository::FolderRepository, repository_pg::FolderRepositoryPg, service::FolderService,
        },
        permission::{provider::RolePermissionProvider, schema::Role, service::PermissionService},
        search::{history::SearchHistory, service::SearchService},
        taxonomy::{
            repository::TaxonomyRepository, repository_pg::TaxonomyRepositoryPg,
            service::TaxonomyService,
        },
        upload::{model::UploadConfig, service::UploadService, transport::LocalFileTransport},
        version::{
            repository::VersionRepository, repository_pg::VersionRepositoryPg,
            service::VersionService,
        },
    },
    store::MemoryStore,
    utils::Claims,
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod store;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

struct Repositories {
    folders: Arc<dyn FolderRepository + Send + Sync>,
    taxonomy: Arc<dyn TaxonomyRepository + Send + Sync>,
    assets: Arc<dyn AssetRepository + Send + Sync>,
    versions: Arc<dyn VersionRepository + Send + Sync>,
}

impl Repositories {
    fn postgres(pool: sqlx::PgPool) -> Self {
        Repositories {
            folders: Arc::new(FolderRepositoryPg::new(pool.clone())),
            taxonomy: Arc::new(TaxonomyRepositoryPg::new(pool.clone())),
            assets: Arc::new(AssetRepositoryPg::new(pool.clone())),
            versions: Arc::new(VersionRepositoryPg::new(pool)),
        }
    }

    fn memory(store: &MemoryStore) -> Self {
        Repositories {
            folders: Arc::new(store.clone()),
            taxonomy: Arc::new(store.clone()),
            assets: Arc::new(store.clone()),
            versions: Arc::new(store.clone()),
        }
    }
}

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish()).is_err() {
        log::warn!("A tracing subscriber was already installed");
    }

    let (repos, in_memory) = match ENV.database_url.as_deref() {
        Some(url) => {
            let pool = connect_database(url)
                .await
                .map_err(|_| std::io::Error::other("Database connection error"))?;
            (Repositories::postgres(pool), false)
        }
        None => {
            log::warn!("DATABASE_URL not set, serving a seeded in-memory catalog");
            (Repositories::memory(&MemoryStore::new()), true)
        }
    };

    let cache: Arc<dyn KeyValueStore + Send + Sync> = match ENV.redis_url.as_deref() {
        Some(url) => Arc::new(
            RedisCache::new(url).await.map_err(|_| std::io::Error::other("Redis connection error"))?,
        ),
        None => Arc::new(MemoryCache::new()),
    };

    let upload_config = UploadConfig {
        max_file_size: ENV.max_upload_size,
        upload_dir: ENV.upload_dir.clone(),
        base_url: ENV.upload_base_url.clone(),
        ..UploadConfig::default()
    };
    let transport = LocalFileTransport::new(&upload_config.upload_dir, &upload_config.base_url);
    let upload_service = UploadService::new(Arc::new(transport), upload_config);

    let folder_service = FolderService::with_dependencies(repos.folders.clone());
    let taxonomy_service = TaxonomyService::with_dependencies(repos.taxonomy.clone());
    let version_service =
        VersionService::with_dependencies(repos.versions.clone(), upload_service.clone());
    let asset_service = AssetService::with_dependencies(
        repos.assets.clone(),
        repos.folders.clone(),
        repos.taxonomy.clone(),
        version_service.clone(),
        upload_service.clone(),
    );
    let search_service = SearchService::with_dependencies(
        repos.assets.clone(),
        repos.folders.clone(),
        SearchHistory::new(cache, Some(ENV.search_history_ttl)),
    );
    let permission_service =
        PermissionService::with_dependencies(Arc::new(RolePermissionProvider));

    if in_memory {
        store::seed::populate(&folder_service, &taxonomy_service, &asset_service)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        let demo = Claims::new(&Uuid::now_v7(), "Demo Admin", Role::Admin, 24 * 60 * 60);
        let token = demo
            .encode(ENV.jwt_secret.as_bytes())
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        log::info!("Demo admin token: Bearer {}", token);
    }

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(folder_service.clone()))
            .app_data(web::Data::new(taxonomy_service.clone()))
            .app_data(web::Data::new(asset_service.clone()))
            .app_data(web::Data::new(version_service.clone()))
            .app_data(web::Data::new(upload_service.clone()))
            .app_data(web::Data::new(search_service.clone()))
            .app_data(web::Data::new(permission_service.clone()))
            .service(health_check)
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(modules::version::route::configure)
                    .configure(modules::folder::route::configure)
                    .configure(modules::taxonomy::route::configure)
                    .configure(modules::asset::route::configure)
                    .configure(modules::search::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
