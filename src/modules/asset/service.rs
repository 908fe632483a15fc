use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::api::error;
use crate::modules::{
    asset::{
        model::{AssetPage, AssetQuery, CreateAssetModel, ReconcileReport},
        repository::AssetRepository,
        schema::{AssetEntity, AssetMetadata},
    },
    folder::repository::FolderRepository,
    taxonomy::repository::TaxonomyRepository,
    upload::{
        model::{file_extension, ProgressFn, UploadBatch, UploadOutcome, UploadedFile},
        service::UploadService,
    },
    version::{
        model::{NewActivity, NewVersion},
        schema::{ActivityAction, ActivityContext},
        service::VersionService,
    },
};

const ROOT_FOLDER: &str = "/";

#[derive(Clone)]
pub struct AssetService {
    repo: Arc<dyn AssetRepository + Send + Sync>,
    folders: Arc<dyn FolderRepository + Send + Sync>,
    taxonomy: Arc<dyn TaxonomyRepository + Send + Sync>,
    versions: VersionService,
    uploads: UploadService,
}

impl AssetService {
    pub fn with_dependencies(
        repo: Arc<dyn AssetRepository + Send + Sync>,
        folders: Arc<dyn FolderRepository + Send + Sync>,
        taxonomy: Arc<dyn TaxonomyRepository + Send + Sync>,
        versions: VersionService,
        uploads: UploadService,
    ) -> Self {
        info!("AssetService initialized with dependencies");
        AssetService { repo, folders, taxonomy, versions, uploads }
    }

    async fn folder_path(&self, folder_id: Option<&Uuid>) -> Result<String, error::SystemError> {
        match folder_id {
            Some(id) => Ok(self
                .folders
                .find_by_id(id)
                .await?
                .ok_or_else(|| error::SystemError::not_found("Folder not found"))?
                .path),
            None => Ok(ROOT_FOLDER.to_string()),
        }
    }

    /// One name per distinct id, in request order.
    async fn tag_names(&self, tag_ids: &[Uuid]) -> Result<Vec<String>, error::SystemError> {
        let mut unique: Vec<Uuid> = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let tags = self.taxonomy.find_tags_by_ids(&unique).await?;
        unique
            .iter()
            .map(|id| {
                tags.iter()
                    .find(|t| t.id == *id)
                    .map(|t| t.name.clone())
                    .ok_or_else(|| error::SystemError::not_found("Tag not found"))
            })
            .collect()
    }

    /// Registers an already stored file as a new asset at version 1.
    pub async fn create(
        &self,
        params: CreateAssetModel,
        uploaded_by: &str,
    ) -> Result<AssetEntity, error::SystemError> {
        params.validate()?;
        let folder = self.folder_path(params.folder_id.as_ref()).await?;

        let mut tags: Vec<String> = Vec::with_capacity(params.tags.len());
        for tag in params.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }

        let now = chrono::Utc::now();
        let asset = AssetEntity {
            id: Uuid::now_v7(),
            file_type: file_extension(&params.name),
            name: params.name,
            file_url: params.file_url.clone(),
            thumbnail_url: params.thumbnail_url,
            mime_type: params.mime_type,
            size: params.file_size,
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: now,
            updated_at: now,
            tags,
            folder_id: params.folder_id,
            folder,
            version: 1,
            metadata: params.metadata,
            filter_assignments: Vec::new(),
        };
        let initial = NewVersion {
            file_url: params.file_url,
            file_size: params.file_size,
            created_by: uploaded_by.to_string(),
            notes: None,
        };

        let asset = self.repo.create(&asset, &initial).await?;
        self.versions
            .log_activity(
                NewActivity::new(asset.id, ActivityAction::VersionUpload, uploaded_by).with_version(1),
            )
            .await?;

        info!("Asset {} '{}' created in {}", asset.id, asset.name, asset.folder);
        Ok(asset)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<AssetEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Asset not found"))
    }

    pub async fn all(&self) -> Result<Vec<AssetEntity>, error::SystemError> {
        self.repo.find_all().await
    }

    pub async fn list(&self, query: &AssetQuery) -> Result<AssetPage, error::SystemError> {
        let (items, total) = self.repo.find_page(query).await?;
        Ok(AssetPage { items, total })
    }

    /// Replaces the whole metadata map.
    pub async fn update_metadata(
        &self,
        id: Uuid,
        metadata: AssetMetadata,
        actor_name: &str,
    ) -> Result<AssetEntity, error::SystemError> {
        let asset = self.repo.update_metadata(&id, &metadata).await?;
        let context = ActivityContext {
            notes: Some("metadata updated".to_string()),
            ..ActivityContext::default()
        };
        self.versions.log_edit(id, actor_name, context).await?;
        Ok(asset)
    }

    pub async fn add_tags(
        &self,
        asset_id: Uuid,
        tag_ids: Vec<Uuid>,
    ) -> Result<AssetEntity, error::SystemError> {
        let names = self.tag_names(&tag_ids).await?;
        self.repo.add_tags(&asset_id, &names).await
    }

    pub async fn remove_tags(
        &self,
        asset_id: Uuid,
        tag_ids: Vec<Uuid>,
    ) -> Result<AssetEntity, error::SystemError> {
        let names = self.tag_names(&tag_ids).await?;
        self.repo.remove_tags(&asset_id, &names).await
    }

    pub async fn move_to_folder(
        &self,
        asset_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<AssetEntity, error::SystemError> {
        let path = self.folder_path(folder_id.as_ref()).await?;
        let asset = self.repo.set_folder(&asset_id, folder_id.as_ref(), &path).await?;
        info!("Asset {} moved to {}", asset_id, path);
        Ok(asset)
    }

    pub async fn assign_filter_values(
        &self,
        asset_id: Uuid,
        value_ids: Vec<Uuid>,
    ) -> Result<AssetEntity, error::SystemError> {
        self.repo.assign_filter_values(&asset_id, &value_ids).await
    }

    pub async fn unassign_filter_values(
        &self,
        asset_id: Uuid,
        value_ids: Vec<Uuid>,
    ) -> Result<AssetEntity, error::SystemError> {
        self.repo.unassign_filter_values(&asset_id, &value_ids).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        info!("Asset {} deleted", id);
        Ok(())
    }

    /// Stores one file through the transport and registers it.
    pub async fn upload(
        &self,
        file: &UploadedFile,
        folder_id: Option<Uuid>,
        uploaded_by: &str,
        progress: ProgressFn<'_>,
    ) -> Result<AssetEntity, error::SystemError> {
        // resolve the folder first so a bad id never leaves an orphaned file behind
        self.folder_path(folder_id.as_ref()).await?;
        let stored = self.uploads.store(file, progress).await?;
        self.create(
            CreateAssetModel {
                name: file.file_name.clone(),
                file_url: stored.url,
                file_size: stored.size,
                mime_type: stored.mime_type,
                thumbnail_url: None,
                folder_id,
                tags: Vec::new(),
                metadata: AssetMetadata::default(),
            },
            uploaded_by,
        )
        .await
    }

    /// Uploads the batch in order. Once the batch is cancelled, no further asset is
    /// registered and progress for the remaining files is suppressed.
    pub async fn upload_batch(
        &self,
        batch: &UploadBatch,
        folder_id: Option<Uuid>,
        uploaded_by: &str,
        progress: ProgressFn<'_>,
    ) -> Vec<UploadOutcome> {
        let cancel = batch.cancel.clone();
        let guarded = move |file_name: &str, percent: u8| {
            if !cancel.is_cancelled() {
                progress(file_name, percent);
            }
        };

        let mut outcomes = Vec::with_capacity(batch.files.len());
        for file in &batch.files {
            if batch.cancel.is_cancelled() {
                outcomes.push(UploadOutcome::Cancelled { file_name: file.file_name.clone() });
                continue;
            }

            let stored = match self.uploads.store(file, &guarded).await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Upload of '{}' failed: {}", file.file_name, e);
                    outcomes.push(UploadOutcome::Failed {
                        file_name: file.file_name.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if batch.cancel.is_cancelled() {
                outcomes.push(UploadOutcome::Cancelled { file_name: file.file_name.clone() });
                continue;
            }

            let created = self
                .create(
                    CreateAssetModel {
                        name: file.file_name.clone(),
                        file_url: stored.url,
                        file_size: stored.size,
                        mime_type: stored.mime_type,
                        thumbnail_url: None,
                        folder_id,
                        tags: Vec::new(),
                        metadata: AssetMetadata::default(),
                    },
                    uploaded_by,
                )
                .await;
            outcomes.push(match created {
                Ok(asset) => UploadOutcome::Uploaded { asset: Box::new(asset) },
                Err(e) => UploadOutcome::Failed {
                    file_name: file.file_name.clone(),
                    message: e.to_string(),
                },
            });
        }
        outcomes
    }

    /// Drops asset tag strings that no longer name a taxonomy tag.
    pub async fn reconcile_tags(&self) -> Result<ReconcileReport, error::SystemError> {
        let known: Vec<String> =
            self.taxonomy.find_all_tags().await?.into_iter().map(|t| t.tag.name).collect();
        let assets_updated = self.repo.retain_tags(&known).await?;
        info!("Tag reconciliation updated {} assets", assets_updated);
        Ok(ReconcileReport { assets_updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::asset::model::{SortBy, SortOrder};
    use crate::modules::upload::model::ignore_progress;
    use crate::store::MemoryStore;
    use crate::test::{
        asset_service, folder_service, sample_asset, taxonomy_service, version_service,
        MemoryTransport,
    };
    use std::sync::Mutex;

    #[tokio::test]
    async fn create_starts_lineage_at_version_one() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let versions = version_service(&store);

        let asset = assets.create(sample_asset("Logo.PNG", None), "alice").await.unwrap();

        assert_eq!(asset.version, 1);
        assert_eq!(asset.file_type, "png");
        assert_eq!(asset.folder, "/");
        let lineage = versions.list_versions(asset.id).await.unwrap();
        assert_eq!(lineage.len(), 1);
        assert!(lineage[0].is_current_version);
        let activities = versions.get_activities(asset.id).await.unwrap();
        assert_eq!(activities[0].action, ActivityAction::VersionUpload);
    }

    #[tokio::test]
    async fn create_rejects_missing_params_and_folders() {
        let assets = asset_service(&MemoryStore::new());

        let mut params = sample_asset("", None);
        assert!(matches!(
            assets.create(params.clone(), "alice").await.unwrap_err(),
            error::SystemError::BadRequest(_)
        ));
        params = sample_asset("a.png", None);
        params.file_size = -1;
        assert!(matches!(
            assets.create(params, "alice").await.unwrap_err(),
            error::SystemError::BadRequest(_)
        ));
        assert!(matches!(
            assets.create(sample_asset("a.png", Some(Uuid::now_v7())), "alice").await.unwrap_err(),
            error::SystemError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn list_searches_name_tags_and_description() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let folders = folder_service(&store);
        let marketing = folders.create("marketing".into(), None).await.unwrap();
        let sales = folders.create("sales".into(), None).await.unwrap();

        let a = assets.create(sample_asset("Logo Blue.png", Some(marketing.id)), "alice").await.unwrap();
        let mut report = sample_asset("Report.pdf", Some(sales.id));
        report.mime_type = "application/pdf".into();
        report.tags = vec!["quarterly".into()];
        report.metadata.description = Some("Numbers with the LOGO appendix".into());
        let b = assets.create(report, "alice").await.unwrap();

        let by_name = assets
            .list(&AssetQuery { search: Some("logo blue".into()), ..AssetQuery::default() })
            .await
            .unwrap();
        assert_eq!(by_name.items.iter().map(|x| x.id).collect::<Vec<_>>(), vec![a.id]);

        let by_description = assets
            .list(&AssetQuery { search: Some("logo".into()), ..AssetQuery::default() })
            .await
            .unwrap();
        assert_eq!(by_description.total, 2);

        let by_tag = assets
            .list(&AssetQuery { tags: vec!["quarterly".into()], ..AssetQuery::default() })
            .await
            .unwrap();
        assert_eq!(by_tag.items[0].id, b.id);

        let by_mime = assets
            .list(&AssetQuery { mime_types: vec!["application/pdf".into()], ..AssetQuery::default() })
            .await
            .unwrap();
        assert_eq!(by_mime.items[0].id, b.id);

        let by_folder = assets
            .list(&AssetQuery { folder_id: Some(marketing.id), ..AssetQuery::default() })
            .await
            .unwrap();
        assert_eq!(by_folder.items[0].folder, "/marketing");
    }

    #[tokio::test]
    async fn list_total_ignores_pagination() {
        let assets = asset_service(&MemoryStore::new());
        for (name, size) in [("c.png", 30), ("a.png", 10), ("b.png", 20)] {
            let mut params = sample_asset(name, None);
            params.file_size = size;
            assets.create(params, "alice").await.unwrap();
        }

        let page = assets
            .list(&AssetQuery {
                sort_by: SortBy::Size,
                sort_order: SortOrder::Asc,
                limit: Some(2),
                offset: 1,
                ..AssetQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["b.png", "c.png"]);

        let by_name = assets
            .list(&AssetQuery { sort_by: SortBy::Name, sort_order: SortOrder::Desc, ..AssetQuery::default() })
            .await
            .unwrap();
        assert_eq!(by_name.items[0].name, "c.png");
    }

    #[tokio::test]
    async fn update_metadata_replaces_whole_map() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let mut params = sample_asset("a.png", None);
        params.metadata.author = Some("alice".into());
        params.metadata.width = Some(640);
        let asset = assets.create(params, "alice").await.unwrap();

        let replacement = AssetMetadata {
            description: Some("hero".into()),
            ..AssetMetadata::default()
        };
        let updated = assets.update_metadata(asset.id, replacement.clone(), "bob").await.unwrap();

        assert_eq!(updated.metadata, replacement);
        let activities = version_service(&store).get_activities(asset.id).await.unwrap();
        assert_eq!(activities[0].action, ActivityAction::Edit);
        assert_eq!(activities[0].actor_name, "bob");
    }

    #[tokio::test]
    async fn tags_and_filter_values_are_idempotent() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let taxonomy = taxonomy_service(&store);
        let logo = taxonomy.create_tag("logo".into(), vec![]).await.unwrap();
        let region = taxonomy.create_filter_category("Region".into()).await.unwrap();
        let emea = taxonomy.create_filter_value(region.id, "EMEA".into()).await.unwrap();
        let asset = assets.create(sample_asset("a.png", None), "alice").await.unwrap();

        assets.add_tags(asset.id, vec![logo.id]).await.unwrap();
        let tagged = assets.add_tags(asset.id, vec![logo.id]).await.unwrap();
        assert_eq!(tagged.tags, vec!["logo"]);

        assets.assign_filter_values(asset.id, vec![emea.id]).await.unwrap();
        let assigned = assets.assign_filter_values(asset.id, vec![emea.id]).await.unwrap();
        assert_eq!(assigned.filter_assignments.len(), 1);

        assert!(matches!(
            assets.assign_filter_values(asset.id, vec![Uuid::now_v7()]).await.unwrap_err(),
            error::SystemError::NotFound(_)
        ));

        let untagged = assets.remove_tags(asset.id, vec![logo.id]).await.unwrap();
        assert!(untagged.tags.is_empty());
        let cleared = assets.unassign_filter_values(asset.id, vec![emea.id]).await.unwrap();
        assert!(cleared.filter_assignments.is_empty());
    }

    #[tokio::test]
    async fn repeated_tag_ids_in_one_request_tag_once() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let taxonomy = taxonomy_service(&store);
        let logo = taxonomy.create_tag("logo".into(), vec![]).await.unwrap();
        let brand = taxonomy.create_tag("brand".into(), vec![]).await.unwrap();
        let asset = assets.create(sample_asset("a.png", None), "alice").await.unwrap();

        let tagged = assets.add_tags(asset.id, vec![logo.id, brand.id, logo.id]).await.unwrap();
        assert_eq!(tagged.tags, vec!["logo", "brand"]);

        let untagged = assets.remove_tags(asset.id, vec![logo.id, logo.id]).await.unwrap();
        assert_eq!(untagged.tags, vec!["brand"]);
    }

    #[tokio::test]
    async fn deleting_filter_value_drops_assignments() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let taxonomy = taxonomy_service(&store);
        let region = taxonomy.create_filter_category("Region".into()).await.unwrap();
        let emea = taxonomy.create_filter_value(region.id, "EMEA".into()).await.unwrap();
        let asset = assets.create(sample_asset("a.png", None), "alice").await.unwrap();
        assets.assign_filter_values(asset.id, vec![emea.id]).await.unwrap();

        taxonomy.delete_filter_category(region.id).await.unwrap();

        assert!(assets.get_by_id(asset.id).await.unwrap().filter_assignments.is_empty());
    }

    #[tokio::test]
    async fn reconcile_drops_tags_missing_from_taxonomy() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let taxonomy = taxonomy_service(&store);
        let logo = taxonomy.create_tag("logo".into(), vec![]).await.unwrap();
        let keep = taxonomy.create_tag("brand".into(), vec![]).await.unwrap();
        let asset = assets.create(sample_asset("a.png", None), "alice").await.unwrap();
        assets.add_tags(asset.id, vec![logo.id, keep.id]).await.unwrap();

        taxonomy.delete_tag(logo.id).await.unwrap();
        assert_eq!(assets.get_by_id(asset.id).await.unwrap().tags, vec!["logo", "brand"]);

        let report = assets.reconcile_tags().await.unwrap();
        assert_eq!(report.assets_updated, 1);
        assert_eq!(assets.get_by_id(asset.id).await.unwrap().tags, vec!["brand"]);
    }

    #[tokio::test]
    async fn move_and_delete() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let folder = folder_service(&store).create("archive".into(), None).await.unwrap();
        let asset = assets.create(sample_asset("a.png", None), "alice").await.unwrap();

        let moved = assets.move_to_folder(asset.id, Some(folder.id)).await.unwrap();
        assert_eq!(moved.folder, "/archive");
        assert_eq!(moved.folder_id, Some(folder.id));

        assets.delete(asset.id).await.unwrap();
        assert!(matches!(assets.get_by_id(asset.id).await.unwrap_err(), error::SystemError::NotFound(_)));
        assert!(store.read().await.versions.get(&asset.id).map_or(true, Vec::is_empty));
        assert!(matches!(assets.delete(asset.id).await.unwrap_err(), error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn upload_reports_progress_and_registers_asset() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let seen = Mutex::new(Vec::new());
        let progress = |name: &str, percent: u8| seen.lock().unwrap().push((name.to_string(), percent));

        let asset = assets
            .upload(&UploadedFile::new("clip.mp4", vec![0; 16]), None, "alice", &progress)
            .await
            .unwrap();

        assert_eq!(asset.mime_type, "video/mp4");
        assert_eq!(asset.size, 16);
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.last(), Some(&("clip.mp4".to_string(), 100)));
        assert!(seen.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[tokio::test]
    async fn cancelled_batch_stops_registering() {
        let store = MemoryStore::new();
        let transport = Arc::new(MemoryTransport::default());
        let assets = crate::test::asset_service_with_transport(&store, transport.clone());
        let batch = UploadBatch::new(vec![
            UploadedFile::new("one.png", vec![1]),
            UploadedFile::new("bad.exe", vec![1]),
            UploadedFile::new("two.png", vec![1]),
            UploadedFile::new("three.png", vec![1]),
        ]);

        let cancel = batch.cancel.clone();
        let progress = move |name: &str, percent: u8| {
            if name == "two.png" && percent == 100 {
                cancel.cancel();
            }
        };
        let outcomes = assets.upload_batch(&batch, None, "alice", &progress).await;

        assert!(matches!(outcomes[0], UploadOutcome::Uploaded { .. }));
        assert!(matches!(outcomes[1], UploadOutcome::Failed { .. }));
        assert!(matches!(outcomes[2], UploadOutcome::Cancelled { .. }));
        assert!(matches!(outcomes[3], UploadOutcome::Cancelled { .. }));
        assert_eq!(assets.all().await.unwrap().len(), 1);
        assert_eq!(transport.stored_names(), vec!["one.png", "two.png"]);
    }
}
