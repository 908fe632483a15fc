//! Asset predicates for the filter engine.
//!
//! The four basic axes always evaluate to a plain `bool`. Advanced filters are
//! evaluated to `Result<bool, PredicateError>` and collapsed by
//! [`matches_advanced`], where an error excludes the asset.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::modules::{
    asset::schema::AssetEntity,
    search::model::{AdvancedFilter, AssetTypeFilter, FilterMatch, FilterState},
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PredicateError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("Operator '{operator}' is not supported on '{field}'")]
    Unsupported { field: String, operator: String },

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Greater,
    Less,
    Between,
    Before,
    After,
}

impl std::str::FromStr for Operator {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equals" | "eq" => Ok(Operator::Equals),
            "contains" => Ok(Operator::Contains),
            "startswith" => Ok(Operator::StartsWith),
            "endswith" => Ok(Operator::EndsWith),
            "greater" | "greaterthan" | "gt" => Ok(Operator::Greater),
            "less" | "lessthan" | "lt" => Ok(Operator::Less),
            "between" => Ok(Operator::Between),
            "before" => Ok(Operator::Before),
            "after" => Ok(Operator::After),
            other => Err(PredicateError::UnknownOperator(other.to_string())),
        }
    }
}

enum FieldValue<'a> {
    Text(Option<String>),
    Number(Option<f64>),
    Date(DateTime<Utc>),
    Tags(&'a [String]),
}

fn resolve<'a>(asset: &'a AssetEntity, field: &str) -> Result<FieldValue<'a>, PredicateError> {
    let field = field.trim();
    if let Some(key) = field.strip_prefix("metadata.") {
        return resolve_metadata(asset, key);
    }

    let value = match field.replace('_', "").to_ascii_lowercase().as_str() {
        "name" => FieldValue::Text(Some(asset.name.clone())),
        "filetype" => FieldValue::Text(Some(asset.file_type.clone())),
        "mimetype" => FieldValue::Text(Some(asset.mime_type.clone())),
        "uploadedby" => FieldValue::Text(Some(asset.uploaded_by.clone())),
        "folder" => FieldValue::Text(Some(asset.folder.clone())),
        "fileurl" => FieldValue::Text(Some(asset.file_url.clone())),
        "thumbnailurl" => FieldValue::Text(asset.thumbnail_url.clone()),
        "size" => FieldValue::Number(Some(asset.size as f64)),
        "version" => FieldValue::Number(Some(asset.version as f64)),
        "uploadedat" | "createdat" => FieldValue::Date(asset.uploaded_at),
        "updatedat" => FieldValue::Date(asset.updated_at),
        "tags" => FieldValue::Tags(&asset.tags),
        _ => return Err(PredicateError::UnknownField(field.to_string())),
    };
    Ok(value)
}

fn resolve_metadata<'a>(asset: &'a AssetEntity, key: &str) -> Result<FieldValue<'a>, PredicateError> {
    let metadata = &asset.metadata;
    let value = match key {
        "description" => FieldValue::Text(metadata.description.clone()),
        "author" => FieldValue::Text(metadata.author.clone()),
        "width" => FieldValue::Number(metadata.width.map(f64::from)),
        "height" => FieldValue::Number(metadata.height.map(f64::from)),
        "duration" => FieldValue::Number(metadata.duration),
        custom => match metadata.extra.get(custom) {
            Some(serde_json::Value::Number(n)) => FieldValue::Number(n.as_f64()),
            Some(serde_json::Value::String(s)) => FieldValue::Text(Some(s.clone())),
            Some(serde_json::Value::Bool(b)) => FieldValue::Text(Some(b.to_string())),
            // absent custom keys behave like an unset text field
            _ => FieldValue::Text(None),
        },
    };
    Ok(value)
}

fn parse_number(raw: &str) -> Result<f64, PredicateError> {
    raw.trim().parse::<f64>().map_err(|_| PredicateError::InvalidNumber(raw.to_string()))
}

/// RFC 3339 timestamp or a plain `YYYY-MM-DD` date taken at midnight UTC.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, PredicateError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| PredicateError::InvalidDate(raw.to_string()))
}

fn split_bounds(raw: &str) -> Option<(&str, &str)> {
    let (lo, hi) = raw.split_once(',')?;
    if hi.contains(',') {
        return None;
    }
    Some((lo, hi))
}

fn compare_text(value: &str, operator: Operator, expected: &str) -> Option<bool> {
    let value = value.to_lowercase();
    let expected = expected.to_lowercase();
    match operator {
        Operator::Equals => Some(value == expected),
        Operator::Contains => Some(value.contains(&expected)),
        Operator::StartsWith => Some(value.starts_with(&expected)),
        Operator::EndsWith => Some(value.ends_with(&expected)),
        _ => None,
    }
}

fn compare_number(value: f64, operator: Operator, raw: &str) -> Result<Option<bool>, PredicateError> {
    let result = match operator {
        Operator::Equals => value == parse_number(raw)?,
        Operator::Greater => value > parse_number(raw)?,
        Operator::Less => value < parse_number(raw)?,
        Operator::Between => {
            let (lo, hi) =
                split_bounds(raw).ok_or_else(|| PredicateError::InvalidNumber(raw.to_string()))?;
            let (lo, hi) = (parse_number(lo)?, parse_number(hi)?);
            lo <= value && value <= hi
        }
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn compare_date(
    value: DateTime<Utc>,
    operator: Operator,
    raw: &str,
) -> Result<Option<bool>, PredicateError> {
    let result = match operator {
        Operator::Equals => value.date_naive() == parse_date(raw)?.date_naive(),
        Operator::Before => value < parse_date(raw)?,
        Operator::After => value > parse_date(raw)?,
        Operator::Between => {
            let (lo, hi) =
                split_bounds(raw).ok_or_else(|| PredicateError::InvalidDate(raw.to_string()))?;
            let (lo, hi) = (parse_date(lo)?.date_naive(), parse_date(hi)?.date_naive());
            let day = value.date_naive();
            lo <= day && day <= hi
        }
        _ => return Ok(None),
    };
    Ok(Some(result))
}

fn compare_tags(tags: &[String], operator: Operator, expected: &str) -> Option<bool> {
    let expected = expected.to_lowercase();
    match operator {
        Operator::Equals => Some(tags.iter().any(|t| t.to_lowercase() == expected)),
        Operator::Contains => Some(tags.iter().any(|t| t.to_lowercase().contains(&expected))),
        _ => None,
    }
}

/// Evaluates one advanced filter, surfacing why it could not be applied.
pub fn evaluate(asset: &AssetEntity, filter: &AdvancedFilter) -> Result<bool, PredicateError> {
    let operator: Operator = filter.operator.parse()?;
    let raw = filter.value.trim();

    let outcome = match resolve(asset, &filter.field)? {
        FieldValue::Text(Some(value)) => compare_text(&value, operator, raw),
        FieldValue::Text(None) => compare_text("", operator, raw).map(|_| false),
        FieldValue::Number(Some(value)) => compare_number(value, operator, raw)?,
        FieldValue::Number(None) => compare_number(0.0, operator, raw)?.map(|_| false),
        FieldValue::Date(value) => compare_date(value, operator, raw)?,
        FieldValue::Tags(tags) => compare_tags(tags, operator, raw),
    };

    outcome.ok_or_else(|| PredicateError::Unsupported {
        field: filter.field.clone(),
        operator: filter.operator.clone(),
    })
}

/// Fail-closed form of [`evaluate`]: any error excludes the asset.
pub fn matches_advanced(asset: &AssetEntity, filter: &AdvancedFilter) -> bool {
    match evaluate(asset, filter) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::debug!(asset_id = %asset.id, error = %e, "advanced filter rejected asset");
            false
        }
    }
}

pub fn matches_query(asset: &AssetEntity, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || asset.matches_text(&query.to_lowercase())
}

pub fn matches_filter_values(asset: &AssetEntity, selected: &[Uuid], mode: FilterMatch) -> bool {
    if selected.is_empty() {
        return true;
    }
    match mode {
        FilterMatch::Any => selected.iter().any(|id| asset.has_filter_value(id)),
        FilterMatch::All => selected.iter().all(|id| asset.has_filter_value(id)),
    }
}

pub fn matches_type(asset: &AssetEntity, bucket: AssetTypeFilter) -> bool {
    match bucket.extensions() {
        None => true,
        Some(group) => group.contains(&asset.file_type.to_ascii_lowercase().as_str()),
    }
}

pub fn matches_folder(asset: &AssetEntity, folder_path: Option<&str>) -> bool {
    folder_path.map_or(true, |path| asset.folder == path)
}

/// A [`FilterState`] with its folder scope resolved to a path.
#[derive(Debug, Clone)]
pub struct AssetFilter<'a> {
    pub state: &'a FilterState,
    pub folder_path: Option<String>,
}

impl AssetFilter<'_> {
    pub fn matches(&self, asset: &AssetEntity) -> bool {
        matches_query(asset, &self.state.search_query)
            && matches_filter_values(asset, &self.state.selected_filter_values, self.state.filter_match)
            && matches_type(asset, self.state.asset_type_filter)
            && matches_folder(asset, self.folder_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::asset::schema::{AssetMetadata, FilterAssignment};

    fn asset(name: &str, file_type: &str, folder: &str, size: i64) -> AssetEntity {
        let uploaded_at = DateTime::parse_from_rfc3339("2024-03-15T10:30:00Z").unwrap().with_timezone(&Utc);
        AssetEntity {
            id: Uuid::now_v7(),
            name: name.to_string(),
            file_url: format!("/uploads/{name}"),
            thumbnail_url: None,
            file_type: file_type.to_string(),
            mime_type: "application/octet-stream".to_string(),
            size,
            uploaded_by: "alice".to_string(),
            uploaded_at,
            updated_at: uploaded_at,
            tags: vec!["Brand".to_string(), "summer-campaign".to_string()],
            folder_id: None,
            folder: folder.to_string(),
            version: 1,
            metadata: AssetMetadata {
                description: Some("Hero banner".to_string()),
                width: Some(1920),
                ..AssetMetadata::default()
            },
            filter_assignments: Vec::new(),
        }
    }

    fn with_values(mut asset: AssetEntity, values: &[Uuid]) -> AssetEntity {
        asset.filter_assignments = values
            .iter()
            .map(|v| FilterAssignment { asset_id: asset.id, filter_value_id: *v, assigned_at: Utc::now() })
            .collect();
        asset
    }

    #[test]
    fn string_operators_ignore_case() {
        let a = asset("Logo Blue.png", "png", "/marketing", 1500);
        assert!(matches_advanced(&a, &AdvancedFilter::new("name", "equals", "logo blue.PNG")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("name", "contains", "BLUE")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("name", "startsWith", "logo")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("fileType", "endsWith", "NG")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("metadata.description", "contains", "banner")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("metadata.author", "contains", "a")));
    }

    #[test]
    fn numeric_operators_and_inclusive_between() {
        let a = asset("a.png", "png", "/", 1500);
        assert!(matches_advanced(&a, &AdvancedFilter::new("size", "greater", "1000")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("size", "less", "2000")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("size", "between", "1500,2000")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("size", "between", "1000, 1500")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("metadata.width", "equals", "1920")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("size", "between", "1501,2000")));
    }

    #[test]
    fn unparsable_values_fail_closed() {
        let a = asset("a.png", "png", "/", 1500);
        assert_eq!(
            evaluate(&a, &AdvancedFilter::new("size", "between", "1000,abc")),
            Err(PredicateError::InvalidNumber("abc".to_string()))
        );
        assert!(!matches_advanced(&a, &AdvancedFilter::new("size", "between", "1000,abc")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("size", "between", "1000")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("uploadedAt", "after", "last tuesday")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("size", "startsWith", "1")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("name", "resembles", "a")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("colour", "equals", "red")));
    }

    #[test]
    fn date_operators() {
        let a = asset("a.png", "png", "/", 1);
        assert!(matches_advanced(&a, &AdvancedFilter::new("createdAt", "equals", "2024-03-15")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("uploadedAt", "after", "2024-03-15")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("uploadedAt", "before", "2024-03-15T11:00:00Z")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("uploadedAt", "between", "2024-03-01,2024-03-15")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("uploadedAt", "before", "2024-03-15")));
    }

    #[test]
    fn tags_equals_is_membership_and_contains_is_substring() {
        let a = asset("a.png", "png", "/", 1);
        assert!(matches_advanced(&a, &AdvancedFilter::new("tags", "equals", "brand")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("tags", "equals", "summer")));
        assert!(matches_advanced(&a, &AdvancedFilter::new("tags", "contains", "summer")));
        assert!(!matches_advanced(&a, &AdvancedFilter::new("tags", "greater", "1")));
    }

    #[test]
    fn basic_axes_default_to_pass() {
        let a = asset("Report.pdf", "pdf", "/sales", 1);
        let state = FilterState::default();
        let filter = AssetFilter { state: &state, folder_path: None };
        assert!(filter.matches(&a));
        assert!(matches_query(&a, "   "));
        assert!(matches_type(&a, AssetTypeFilter::Documents));
        assert!(!matches_type(&a, AssetTypeFilter::Images));
        assert!(matches_folder(&a, Some("/sales")));
        assert!(!matches_folder(&a, Some("/sales/archive")));
    }

    #[test]
    fn filter_value_match_modes() {
        let (x, y) = (Uuid::now_v7(), Uuid::now_v7());
        let a = with_values(asset("a.png", "png", "/", 1), &[x]);
        assert!(matches_filter_values(&a, &[x, y], FilterMatch::Any));
        assert!(!matches_filter_values(&a, &[x, y], FilterMatch::All));
        assert!(matches_filter_values(&a, &[], FilterMatch::All));
    }
}
