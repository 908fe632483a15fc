//! Service builders and fakes shared by the unit tests.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::{
    api::error,
    configs::MemoryCache,
    modules::{
        asset::{model::CreateAssetModel, schema::AssetMetadata, service::AssetService},
        folder::service::FolderService,
        search::{history::SearchHistory, service::SearchService},
        taxonomy::service::TaxonomyService,
        upload::{
            model::{ProgressFn, UploadConfig, UploadedFile},
            service::UploadService,
            transport::FileTransport,
        },
        version::service::VersionService,
    },
    store::MemoryStore,
};

/// Keeps nothing but the names it was asked to store.
#[derive(Default)]
pub struct MemoryTransport {
    stored: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn stored_names(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl FileTransport for MemoryTransport {
    async fn store(
        &self,
        file: &UploadedFile,
        progress: ProgressFn<'_>,
    ) -> Result<String, error::SystemError> {
        progress(&file.file_name, 0);
        self.stored.lock().unwrap().push(file.file_name.clone());
        progress(&file.file_name, 100);
        Ok(format!("/uploads/{}-{}", Uuid::now_v7(), file.file_name))
    }
}

fn upload_service(transport: Arc<MemoryTransport>) -> UploadService {
    UploadService::new(transport, UploadConfig::default())
}

pub fn folder_service(store: &MemoryStore) -> FolderService {
    FolderService::with_dependencies(Arc::new(store.clone()))
}

pub fn taxonomy_service(store: &MemoryStore) -> TaxonomyService {
    TaxonomyService::with_dependencies(Arc::new(store.clone()))
}

pub fn version_service(store: &MemoryStore) -> VersionService {
    version_service_with_transport(store, Arc::new(MemoryTransport::default()))
}

pub fn version_service_with_transport(
    store: &MemoryStore,
    transport: Arc<MemoryTransport>,
) -> VersionService {
    VersionService::with_dependencies(Arc::new(store.clone()), upload_service(transport))
}

pub fn asset_service(store: &MemoryStore) -> AssetService {
    asset_service_with_transport(store, Arc::new(MemoryTransport::default()))
}

pub fn asset_service_with_transport(
    store: &MemoryStore,
    transport: Arc<MemoryTransport>,
) -> AssetService {
    AssetService::with_dependencies(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        version_service(store),
        upload_service(transport),
    )
}

pub fn search_service(store: &MemoryStore) -> SearchService {
    SearchService::with_dependencies(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        SearchHistory::new(Arc::new(MemoryCache::new()), None),
    )
}

pub fn sample_asset(name: &str, folder_id: Option<Uuid>) -> CreateAssetModel {
    CreateAssetModel {
        name: name.to_string(),
        file_url: format!("/uploads/{name}"),
        file_size: 1024,
        mime_type: mime_guess::from_path(name).first_or_octet_stream().to_string(),
        thumbnail_url: None,
        folder_id,
        tags: Vec::new(),
        metadata: AssetMetadata::default(),
    }
}
