use log::{info, warn};
use std::sync::Arc;

use crate::api::error;
use crate::modules::{
    asset::{model::AssetPage, repository::AssetRepository, schema::AssetEntity},
    folder::repository::FolderRepository,
    search::{
        history::SearchHistory,
        model::{AdvancedFilter, FilterState, SearchHistoryEntry},
        predicate::{matches_advanced, AssetFilter},
    },
};

#[derive(Clone)]
pub struct SearchService {
    assets: Arc<dyn AssetRepository + Send + Sync>,
    folders: Arc<dyn FolderRepository + Send + Sync>,
    history: SearchHistory,
}

impl SearchService {
    pub fn with_dependencies(
        assets: Arc<dyn AssetRepository + Send + Sync>,
        folders: Arc<dyn FolderRepository + Send + Sync>,
        history: SearchHistory,
    ) -> Self {
        info!("SearchService initialized with dependencies");
        SearchService { assets, folders, history }
    }

    /// Applies the four filter axes. Folder scope compares against the folder's path.
    pub async fn filter_assets(
        &self,
        state: &FilterState,
    ) -> Result<Vec<AssetEntity>, error::SystemError> {
        let folder_path = match &state.current_folder_id {
            Some(id) => Some(
                self.folders
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| error::SystemError::not_found("Folder not found"))?
                    .path,
            ),
            None => None,
        };

        let filter = AssetFilter { state, folder_path };
        let assets: Vec<AssetEntity> =
            self.assets.find_all().await?.into_iter().filter(|a| filter.matches(a)).collect();

        tracing::debug!(matched = assets.len(), "filter state applied");
        Ok(assets)
    }

    /// ANDs every filter that carries a value and records the search for `user_key`.
    /// A history store failure is logged and does not fail the search.
    pub async fn advanced_search(
        &self,
        user_key: &str,
        filters: &[AdvancedFilter],
    ) -> Result<AssetPage, error::SystemError> {
        let active: Vec<&AdvancedFilter> = filters.iter().filter(|f| f.is_active()).collect();

        let items: Vec<AssetEntity> = self
            .assets
            .find_all()
            .await?
            .into_iter()
            .filter(|asset| active.iter().all(|f| matches_advanced(asset, f)))
            .collect();
        let total = items.len();

        tracing::debug!(filters = active.len(), matched = total, "advanced search");
        if let Err(e) = self.history.record(user_key, filters, total).await {
            warn!("Failed to record search history for {}: {}", user_key, e);
        }
        Ok(AssetPage { items, total })
    }

    pub async fn search_history(
        &self,
        user_key: &str,
    ) -> Result<Vec<SearchHistoryEntry>, error::SystemError> {
        self.history.list(user_key).await
    }

    pub async fn clear_search_history(&self, user_key: &str) -> Result<(), error::SystemError> {
        self.history.clear(user_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::KeyValueStore;
    use crate::modules::search::model::{AssetTypeFilter, FilterMatch};
    use crate::store::MemoryStore;
    use crate::test::{asset_service, folder_service, sample_asset, search_service, taxonomy_service};
    use uuid::Uuid;

    fn ids(assets: &[AssetEntity]) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = assets.iter().map(|a| a.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn text_and_type_axes() {
        let store = MemoryStore::new();
        let folders = folder_service(&store);
        let assets = asset_service(&store);
        let search = search_service(&store);
        let marketing = folders.create("marketing".into(), None).await.unwrap();
        let sales = folders.create("sales".into(), None).await.unwrap();
        let a = assets.create(sample_asset("Logo Blue.png", Some(marketing.id)), "alice").await.unwrap();
        let b = assets.create(sample_asset("Report.pdf", Some(sales.id)), "alice").await.unwrap();

        let by_text = search
            .filter_assets(&FilterState { search_query: "logo".into(), ..FilterState::default() })
            .await
            .unwrap();
        assert_eq!(ids(&by_text), vec![a.id]);

        let documents = search
            .filter_assets(&FilterState {
                asset_type_filter: AssetTypeFilter::Documents,
                ..FilterState::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&documents), vec![b.id]);

        let in_sales = search
            .filter_assets(&FilterState { current_folder_id: Some(sales.id), ..FilterState::default() })
            .await
            .unwrap();
        assert_eq!(ids(&in_sales), vec![b.id]);

        let everything = search.filter_assets(&FilterState::default()).await.unwrap();
        assert_eq!(ids(&everything), ids(&[a, b]));
    }

    #[tokio::test]
    async fn folder_scope_follows_stored_path() {
        let store = MemoryStore::new();
        let folders = folder_service(&store);
        let assets = asset_service(&store);
        let search = search_service(&store);
        let marketing = folders.create("marketing".into(), None).await.unwrap();
        assets.create(sample_asset("a.png", Some(marketing.id)), "alice").await.unwrap();

        folders.rename(marketing.id, "brand".into()).await.unwrap();

        let scoped = search
            .filter_assets(&FilterState {
                current_folder_id: Some(marketing.id),
                ..FilterState::default()
            })
            .await
            .unwrap();
        assert!(scoped.is_empty());
    }

    #[tokio::test]
    async fn selected_values_any_versus_all() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let taxonomy = taxonomy_service(&store);
        let search = search_service(&store);
        let region = taxonomy.create_filter_category("Region".into()).await.unwrap();
        let emea = taxonomy.create_filter_value(region.id, "EMEA".into()).await.unwrap();
        let apac = taxonomy.create_filter_value(region.id, "APAC".into()).await.unwrap();

        let both = assets.create(sample_asset("both.png", None), "alice").await.unwrap();
        let only_emea = assets.create(sample_asset("emea.png", None), "alice").await.unwrap();
        assets.create(sample_asset("none.png", None), "alice").await.unwrap();
        assets.assign_filter_values(both.id, vec![emea.id, apac.id]).await.unwrap();
        assets.assign_filter_values(only_emea.id, vec![emea.id]).await.unwrap();

        let mut state = FilterState { selected_filter_values: vec![emea.id], ..FilterState::default() };
        let one = search.filter_assets(&state).await.unwrap();
        assert_eq!(one.len(), 2);

        state.selected_filter_values.push(apac.id);
        assert_eq!(search.filter_assets(&state).await.unwrap().len(), 2);

        state.filter_match = FilterMatch::All;
        let narrowed = search.filter_assets(&state).await.unwrap();
        assert_eq!(ids(&narrowed), vec![both.id]);
        assert!(narrowed.len() <= one.len());

        let cleared = search.filter_assets(&FilterState::default()).await.unwrap();
        assert_eq!(cleared.len(), 3);
    }

    #[tokio::test]
    async fn advanced_search_fails_closed_and_records_history() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let search = search_service(&store);
        let mut params = sample_asset("big.png", None);
        params.file_size = 1500;
        assets.create(params, "alice").await.unwrap();

        let broken = search
            .advanced_search("alice", &[AdvancedFilter::new("size", "between", "1000,abc")])
            .await
            .unwrap();
        assert_eq!(broken.total, 0);
        assert!(broken.items.is_empty());

        let found = search
            .advanced_search(
                "alice",
                &[
                    AdvancedFilter::new("size", "between", "1000,2000"),
                    AdvancedFilter::new("name", "contains", ""),
                ],
            )
            .await
            .unwrap();
        assert_eq!(found.total, 1);

        let history = search.search_history("alice").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].result_count, 1);
        assert_eq!(history[0].filters.len(), 1);

        search.clear_search_history("alice").await.unwrap();
        assert!(search.search_history("alice").await.unwrap().is_empty());
    }

    struct UnavailableCache;

    #[async_trait::async_trait]
    impl KeyValueStore for UnavailableCache {
        async fn get_raw(&self, _key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "cache down").into())
        }

        async fn set_raw(
            &self,
            _key: &str,
            _value: Vec<u8>,
            _expiration: Option<u64>,
        ) -> Result<(), error::SystemError> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "cache down").into())
        }

        async fn delete(&self, _key: &str) -> Result<(), error::SystemError> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "cache down").into())
        }
    }

    #[tokio::test]
    async fn advanced_search_survives_history_outage() {
        let store = MemoryStore::new();
        let assets = asset_service(&store);
        let search = SearchService::with_dependencies(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            SearchHistory::new(Arc::new(UnavailableCache), None),
        );
        let logo = assets.create(sample_asset("logo.png", None), "alice").await.unwrap();
        assets.create(sample_asset("report.pdf", None), "alice").await.unwrap();

        let page = search
            .advanced_search("alice", &[AdvancedFilter::new("name", "contains", "logo")])
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, logo.id);
        assert!(search.search_history("alice").await.is_err());
    }
}
