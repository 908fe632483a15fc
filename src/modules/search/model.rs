use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{AUDIO_EXTENSIONS, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetTypeFilter {
    #[default]
    All,
    Images,
    Documents,
    Videos,
    Audio,
}

impl AssetTypeFilter {
    /// Extension group of the bucket; `None` for `All`.
    pub fn extensions(self) -> Option<&'static [&'static str]> {
        match self {
            AssetTypeFilter::All => None,
            AssetTypeFilter::Images => Some(IMAGE_EXTENSIONS),
            AssetTypeFilter::Documents => Some(DOCUMENT_EXTENSIONS),
            AssetTypeFilter::Videos => Some(VIDEO_EXTENSIONS),
            AssetTypeFilter::Audio => Some(AUDIO_EXTENSIONS),
        }
    }
}

/// How selected filter values combine: any one of them, or all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMatch {
    #[default]
    Any,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_query: String,
    pub selected_filter_values: Vec<Uuid>,
    pub asset_type_filter: AssetTypeFilter,
    pub current_folder_id: Option<Uuid>,
    pub filter_match: FilterMatch,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search_query.trim().is_empty()
            && self.selected_filter_values.is_empty()
            && self.asset_type_filter == AssetTypeFilter::All
            && self.current_folder_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilter {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl AdvancedFilter {
    pub fn new(field: &str, operator: &str, value: &str) -> Self {
        Self { field: field.to_string(), operator: operator.to_string(), value: value.to_string() }
    }

    /// Filters with a blank value are treated as unset.
    pub fn is_active(&self) -> bool {
        !self.value.trim().is_empty()
    }

    pub fn normalized(&self) -> Self {
        Self {
            field: self.field.trim().to_string(),
            operator: self.operator.trim().to_ascii_lowercase(),
            value: self.value.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSearchModel {
    #[validate(length(max = 20, message = "Too many filters"))]
    pub filters: Vec<AdvancedFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub filters: Vec<AdvancedFilter>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub result_count: usize,
}
