use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    upload::{
        model::{ProgressFn, UploadedFile},
        service::UploadService,
    },
    version::{
        model::{AppendedVersion, NewActivity, NewVersion},
        repository::VersionRepository,
        schema::{ActivityAction, ActivityContext, AssetActivityEntity, AssetVersionEntity},
    },
};

#[derive(Clone)]
pub struct VersionService {
    repo: Arc<dyn VersionRepository + Send + Sync>,
    uploads: UploadService,
}

impl VersionService {
    pub fn with_dependencies(
        repo: Arc<dyn VersionRepository + Send + Sync>,
        uploads: UploadService,
    ) -> Self {
        info!("VersionService initialized with dependencies");
        VersionService { repo, uploads }
    }

    async fn ensure_asset(&self, asset_id: &Uuid) -> Result<(), error::SystemError> {
        if !self.repo.asset_exists(asset_id).await? {
            return Err(error::SystemError::not_found("Asset not found"));
        }
        Ok(())
    }

    /// Stores the file through the transport, then appends it as the new current version.
    pub async fn upload_version(
        &self,
        asset_id: Uuid,
        file: &UploadedFile,
        notes: Option<String>,
        actor_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<AssetVersionEntity, error::SystemError> {
        self.ensure_asset(&asset_id).await?;
        let stored = self.uploads.store(file, progress).await?;
        self.add_version(
            asset_id,
            NewVersion {
                file_url: stored.url,
                file_size: stored.size,
                created_by: actor_name.to_string(),
                notes,
            },
        )
        .await
    }

    /// Appends an already stored file as the new current version and logs `version_upload`.
    pub async fn add_version(
        &self,
        asset_id: Uuid,
        version: NewVersion,
    ) -> Result<AssetVersionEntity, error::SystemError> {
        let AppendedVersion { version, previous_version } =
            self.repo.append_version(&asset_id, &version).await?;

        let context = ActivityContext {
            notes: version.notes.clone(),
            previous_version,
            ..ActivityContext::default()
        };
        self.log_activity(
            NewActivity::new(asset_id, ActivityAction::VersionUpload, &version.created_by)
                .with_version(version.version_number)
                .with_context(context),
        )
        .await?;

        info!("Asset {} now at version {}", asset_id, version.version_number);
        Ok(version)
    }

    /// `Ok(None)` when the asset has no such version.
    pub async fn restore_version(
        &self,
        asset_id: Uuid,
        version_number: i32,
        actor_name: &str,
    ) -> Result<Option<AssetVersionEntity>, error::SystemError> {
        let Some(AppendedVersion { version, previous_version }) =
            self.repo.set_current(&asset_id, version_number).await?
        else {
            return Ok(None);
        };

        let context = ActivityContext {
            previous_version,
            restored_from: previous_version,
            ..ActivityContext::default()
        };
        self.log_activity(
            NewActivity::new(asset_id, ActivityAction::VersionRestore, actor_name)
                .with_version(version_number)
                .with_context(context),
        )
        .await?;

        info!("Asset {} restored to version {}", asset_id, version_number);
        Ok(Some(version))
    }

    pub async fn list_versions(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<AssetVersionEntity>, error::SystemError> {
        self.ensure_asset(&asset_id).await?;
        self.repo.find_versions(&asset_id).await
    }

    pub async fn current_version(
        &self,
        asset_id: Uuid,
    ) -> Result<AssetVersionEntity, error::SystemError> {
        self.list_versions(asset_id)
            .await?
            .into_iter()
            .find(|v| v.is_current_version)
            .ok_or_else(|| error::SystemError::not_found("Asset has no versions"))
    }

    pub async fn log_activity(
        &self,
        activity: NewActivity,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        self.repo.append_activity(&activity.into_entity()).await
    }

    pub async fn log_view(
        &self,
        asset_id: Uuid,
        actor_name: &str,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        self.log_activity(NewActivity::new(asset_id, ActivityAction::View, actor_name)).await
    }

    pub async fn log_download(
        &self,
        asset_id: Uuid,
        actor_name: &str,
        version_number: Option<i32>,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        let mut activity = NewActivity::new(asset_id, ActivityAction::Download, actor_name);
        activity.version_number = version_number;
        self.log_activity(activity).await
    }

    pub async fn log_share(
        &self,
        asset_id: Uuid,
        actor_name: &str,
        shared_link_id: String,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        self.log_activity(
            NewActivity::new(asset_id, ActivityAction::Share, actor_name)
                .with_shared_link(shared_link_id),
        )
        .await
    }

    pub async fn log_edit(
        &self,
        asset_id: Uuid,
        actor_name: &str,
        context: ActivityContext,
    ) -> Result<AssetActivityEntity, error::SystemError> {
        self.log_activity(
            NewActivity::new(asset_id, ActivityAction::Edit, actor_name).with_context(context),
        )
        .await
    }

    pub async fn get_activities(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<AssetActivityEntity>, error::SystemError> {
        self.ensure_asset(&asset_id).await?;
        self.repo.find_activities(&asset_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::upload::model::ignore_progress;
    use crate::store::MemoryStore;
    use crate::test::{
        asset_service, sample_asset, version_service, version_service_with_transport,
        MemoryTransport,
    };

    fn assert_single_current(versions: &[AssetVersionEntity]) {
        assert_eq!(versions.iter().filter(|v| v.is_current_version).count(), 1);
    }

    #[tokio::test]
    async fn upload_then_restore_keeps_history() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let versions = version_service(&store);
        let x = assets.create(sample_asset("X.png", None), "alice").await.unwrap();

        let v2 = versions
            .upload_version(
                x.id,
                &UploadedFile::new("X-v2.png", vec![0; 8]),
                Some("sharper".into()),
                "alice",
                &ignore_progress,
            )
            .await
            .unwrap();
        assert_eq!(v2.version_number, 2);

        let before = versions.list_versions(x.id).await.unwrap();
        assert!(!before[0].is_current_version);
        assert!(before[1].is_current_version);

        let restored = versions.restore_version(x.id, 1, "bob").await.unwrap().unwrap();
        assert_eq!(restored.version_number, 1);

        let after = versions.list_versions(x.id).await.unwrap();
        assert_eq!(after.len(), 2);
        assert!(after[0].is_current_version);
        assert!(!after[1].is_current_version);
        for (old, new) in before.iter().zip(&after) {
            assert_eq!(old.file_url, new.file_url);
            assert_eq!(old.notes, new.notes);
        }

        let asset = assets.get_by_id(x.id).await.unwrap();
        assert_eq!(asset.version, 1);
        assert_eq!(asset.file_url, after[0].file_url);
    }

    #[tokio::test]
    async fn exactly_one_current_after_any_sequence() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let versions = version_service(&store);
        let x = assets.create(sample_asset("X.png", None), "alice").await.unwrap();

        for step in 0..4 {
            versions
                .add_version(
                    x.id,
                    NewVersion {
                        file_url: format!("/uploads/x-{step}.png"),
                        file_size: 10,
                        created_by: "alice".into(),
                        notes: None,
                    },
                )
                .await
                .unwrap();
            assert_single_current(&versions.list_versions(x.id).await.unwrap());

            versions.restore_version(x.id, step % 2 + 1, "alice").await.unwrap();
            assert_single_current(&versions.list_versions(x.id).await.unwrap());
        }

        let numbers: Vec<i32> =
            versions.list_versions(x.id).await.unwrap().iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn restore_missing_version_is_none() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let versions = version_service(&store);
        let x = assets.create(sample_asset("X.png", None), "alice").await.unwrap();

        assert!(versions.restore_version(x.id, 7, "alice").await.unwrap().is_none());
        assert!(versions.restore_version(Uuid::now_v7(), 1, "alice").await.unwrap().is_none());
        assert_eq!(versions.current_version(x.id).await.unwrap().version_number, 1);
    }

    #[tokio::test]
    async fn activities_are_newest_first_with_context() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let versions = version_service(&store);
        let x = assets.create(sample_asset("X.png", None), "alice").await.unwrap();

        versions.log_view(x.id, "bob").await.unwrap();
        versions.log_share(x.id, "bob", "link-1".into()).await.unwrap();
        versions
            .add_version(
                x.id,
                NewVersion {
                    file_url: "/uploads/x2.png".into(),
                    file_size: 1,
                    created_by: "carol".into(),
                    notes: Some("crop".into()),
                },
            )
            .await
            .unwrap();
        versions.restore_version(x.id, 1, "dave").await.unwrap();

        let activities = versions.get_activities(x.id).await.unwrap();
        let actions: Vec<ActivityAction> = activities.iter().map(|a| a.action).collect();
        assert_eq!(
            actions,
            vec![
                ActivityAction::VersionRestore,
                ActivityAction::VersionUpload,
                ActivityAction::Share,
                ActivityAction::View,
                ActivityAction::VersionUpload,
            ]
        );
        assert_eq!(activities[0].context_data.restored_from, Some(2));
        assert_eq!(activities[1].context_data.previous_version, Some(1));
        assert_eq!(activities[1].context_data.notes.as_deref(), Some("crop"));
        assert_eq!(activities[2].shared_link_id.as_deref(), Some("link-1"));
    }

    #[tokio::test]
    async fn logging_for_unknown_asset_is_not_found() {
        let versions = version_service(&MemoryStore::new());
        let err = versions.log_view(Uuid::now_v7(), "bob").await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn upload_version_for_unknown_asset_stores_nothing() {
        let transport = Arc::new(MemoryTransport::default());
        let versions = version_service_with_transport(&MemoryStore::new(), transport.clone());

        let err = versions
            .upload_version(
                Uuid::now_v7(),
                &UploadedFile::new("X-v2.png", vec![0; 8]),
                None,
                "alice",
                &ignore_progress,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, error::SystemError::NotFound(_)));
        assert!(transport.stored_names().is_empty());
    }

    #[tokio::test]
    async fn lineage_and_activities_of_unknown_asset_are_not_found() {
        let versions = version_service(&MemoryStore::new());
        let missing = Uuid::now_v7();

        assert!(matches!(
            versions.list_versions(missing).await.unwrap_err(),
            error::SystemError::NotFound(_)
        ));
        assert!(matches!(
            versions.get_activities(missing).await.unwrap_err(),
            error::SystemError::NotFound(_)
        ));
        assert!(matches!(
            versions.current_version(missing).await.unwrap_err(),
            error::SystemError::NotFound(_)
        ));
    }
}
