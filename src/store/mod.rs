//! In-memory mock data layer.
//!
//! One `RwLock` guards the whole state, so every write is single-writer and each
//! repository call is atomic with respect to the others. The repository trait
//! implementations live next to their traits in `modules::*::repository_memory`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::modules::{
    asset::schema::AssetEntity,
    folder::schema::FolderEntity,
    taxonomy::schema::{FilterCategoryEntity, FilterValueEntity, TagEntity},
    version::schema::{AssetActivityEntity, AssetVersionEntity},
};

pub mod seed;

#[derive(Debug, Default)]
pub struct MemoryState {
    pub folders: HashMap<Uuid, FolderEntity>,
    pub tags: HashMap<Uuid, TagEntity>,
    pub categories: HashMap<Uuid, FilterCategoryEntity>,
    /// (category_id, tag_id)
    pub category_tags: BTreeSet<(Uuid, Uuid)>,
    pub filter_values: HashMap<Uuid, FilterValueEntity>,
    pub assets: HashMap<Uuid, AssetEntity>,
    pub versions: HashMap<Uuid, Vec<AssetVersionEntity>>,
    pub activities: HashMap<Uuid, Vec<AssetActivityEntity>>,
}

impl MemoryState {
    /// Drops every asset assignment that points at one of `value_ids`.
    pub fn drop_assignments(&mut self, value_ids: &[Uuid]) {
        for asset in self.assets.values_mut() {
            asset.filter_assignments.retain(|a| !value_ids.contains(&a.filter_value_id));
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().await
    }
}
