use std::collections::BTreeSet;

use uuid::Uuid;

use crate::api::error;
use crate::modules::{
    asset::schema::AssetEntity,
    search::{
        model::{AssetTypeFilter, FilterMatch, FilterState},
        service::SearchService,
    },
};

/// Per-session catalog view: the current filter combination, the selection and the
/// result set last derived from them.
#[derive(Debug, Default)]
pub struct CatalogState {
    filters: FilterState,
    selected_assets: BTreeSet<Uuid>,
    results: Vec<AssetEntity>,
    stale: bool,
}

impl CatalogState {
    pub fn new() -> Self {
        Self { stale: true, ..Self::default() }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Results as of the last `refresh`; check `is_stale` after mutating filters.
    pub fn results(&self) -> &[AssetEntity] {
        &self.results
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn selected_assets(&self) -> impl Iterator<Item = &Uuid> {
        self.selected_assets.iter()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filters.search_query = query.into();
        self.stale = true;
    }

    /// Adds the value to the selection, or removes it when already selected.
    pub fn toggle_filter_value(&mut self, value_id: Uuid) {
        let selected = &mut self.filters.selected_filter_values;
        match selected.iter().position(|id| *id == value_id) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(value_id),
        }
        self.stale = true;
    }

    pub fn set_asset_type_filter(&mut self, bucket: AssetTypeFilter) {
        self.filters.asset_type_filter = bucket;
        self.stale = true;
    }

    pub fn set_current_folder(&mut self, folder_id: Option<Uuid>) {
        self.filters.current_folder_id = folder_id;
        self.stale = true;
    }

    pub fn set_filter_match(&mut self, mode: FilterMatch) {
        self.filters.filter_match = mode;
        self.stale = true;
    }

    /// Resets every filter axis; the match mode is kept.
    pub fn clear_filters(&mut self) {
        self.filters = FilterState { filter_match: self.filters.filter_match, ..FilterState::default() };
        self.stale = true;
    }

    pub fn select(&mut self, asset_id: Uuid) {
        self.selected_assets.insert(asset_id);
    }

    pub fn deselect(&mut self, asset_id: &Uuid) {
        self.selected_assets.remove(asset_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_assets.clear();
    }

    /// Recomputes the result set and drops selected ids that fell out of it.
    pub async fn refresh(&mut self, engine: &SearchService) -> Result<&[AssetEntity], error::SystemError> {
        self.results = engine.filter_assets(&self.filters).await?;
        let visible: BTreeSet<Uuid> = self.results.iter().map(|a| a.id).collect();
        self.selected_assets.retain(|id| visible.contains(id));
        self.stale = false;
        Ok(&self.results)
    }
}
