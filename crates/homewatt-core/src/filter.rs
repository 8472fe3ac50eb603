//! Multi-dimensional filtering over the aggregated catalog.
//!
//! A [`FilterSpec`] combines up to five dimensions. An entry is kept only if
//! it passes all of them; an empty dimension passes everything.
//!
//! | Dimension | Match |
//! |-----------|-------|
//! | `search` | case-insensitive substring of label, key, brand, model name or model wattage |
//! | `category` | exact, `""` and `"all"` pass |
//! | `min_watts`/`max_watts` | at least one model within the inclusive range |
//! | `brand` | case-insensitive substring of any brand |
//! | `schedule` | case-insensitive substring of the template's first schedule label |

use serde::{Deserialize, Deserializer, Serialize};

use homewatt_types::{ValidationError, ValidationResult};

use crate::catalog::CatalogEntry;

/// Sentinel accepted by the category and schedule dimensions meaning "no filter".
pub const ALL: &str = "all";

fn passes_all(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

/// Deserialize an optional wattage bound where an empty or blank value is unset.
///
/// Query strings carry every value as text, so a cleared form field arrives
/// as `minWatts=`. JSON numbers and `null` are accepted as well.
pub fn optional_watts<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bound {
        Number(f64),
        Text(String),
    }

    match Option::<Bound>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Bound::Number(watts)) => Ok(Some(watts)),
        Some(Bound::Text(text)) => match text.trim() {
            "" => Ok(None),
            text => text
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid wattage '{text}'"))),
        },
    }
}

/// Filter specification for the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    /// Free-text search term.
    pub search: String,
    /// Category value or `"all"`.
    pub category: String,
    /// Inclusive lower wattage bound, unset means 0.
    #[serde(deserialize_with = "optional_watts")]
    pub min_watts: Option<f64>,
    /// Inclusive upper wattage bound, unset means unbounded.
    #[serde(deserialize_with = "optional_watts")]
    pub max_watts: Option<f64>,
    /// Brand substring.
    pub brand: String,
    /// Schedule label substring or `"all"`.
    pub schedule: String,
}

impl FilterSpec {
    /// An empty specification that keeps every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Set the category value.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the lower wattage bound.
    pub fn min_watts(mut self, min: f64) -> Self {
        self.min_watts = Some(min);
        self
    }

    /// Set the upper wattage bound.
    pub fn max_watts(mut self, max: f64) -> Self {
        self.max_watts = Some(max);
        self
    }

    /// Set the brand substring.
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Set the schedule substring.
    pub fn schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    /// Whether no dimension is active.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && passes_all(&self.category)
            && self.min_watts.is_none()
            && self.max_watts.is_none()
            && self.brand.is_empty()
            && passes_all(&self.schedule)
    }

    /// Reject wattage bounds that are negative, NaN or inverted.
    pub fn validate(&self) -> ValidationResult<()> {
        let min = self.min_watts.unwrap_or(0.0);
        let max = self.max_watts.unwrap_or(f64::INFINITY);
        if min.is_nan() || max.is_nan() || min < 0.0 || min > max {
            return Err(ValidationError::InvalidWattRange { min, max });
        }
        Ok(())
    }

    /// Whether `entry` passes every active dimension.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.matches_search(entry)
            && self.matches_category(entry)
            && self.matches_watts(entry)
            && self.matches_brand(entry)
            && self.matches_schedule(entry)
    }

    /// Keep the entries that match, preserving order.
    pub fn apply(&self, catalog: &[CatalogEntry]) -> Vec<CatalogEntry> {
        catalog.iter().filter(|e| self.matches(e)).cloned().collect()
    }

    fn matches_search(&self, entry: &CatalogEntry) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        let contains = |s: &str| s.to_lowercase().contains(&term);

        contains(&entry.label)
            || contains(&entry.key)
            || entry.common_brands.iter().any(|b| {
                contains(&b.brand)
                    || b.models
                        .iter()
                        .any(|m| contains(&m.name) || m.watts.to_string().contains(&term))
            })
    }

    fn matches_category(&self, entry: &CatalogEntry) -> bool {
        passes_all(&self.category) || entry.category == self.category
    }

    fn matches_watts(&self, entry: &CatalogEntry) -> bool {
        if self.min_watts.is_none() && self.max_watts.is_none() {
            return true;
        }
        let min = self.min_watts.unwrap_or(0.0);
        let max = self.max_watts.unwrap_or(f64::INFINITY);
        entry.models().any(|m| m.watts >= min && m.watts <= max)
    }

    fn matches_brand(&self, entry: &CatalogEntry) -> bool {
        if self.brand.is_empty() {
            return true;
        }
        let brand = self.brand.to_lowercase();
        entry
            .common_brands
            .iter()
            .any(|b| b.brand.to_lowercase().contains(&brand))
    }

    fn matches_schedule(&self, entry: &CatalogEntry) -> bool {
        if passes_all(&self.schedule) {
            return true;
        }
        let schedule = self.schedule.to_lowercase();
        entry
            .first_schedule()
            .is_some_and(|s| s.label.to_lowercase().contains(&schedule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBrand, CatalogModel, build_catalog};

    fn entry(key: &str, watts: &[f64]) -> CatalogEntry {
        CatalogEntry {
            key: key.to_string(),
            label: "Test".to_string(),
            category: "kitchen".to_string(),
            average_watts: watts[0],
            common_brands: vec![CatalogBrand {
                brand: "Acme".to_string(),
                models: watts
                    .iter()
                    .enumerate()
                    .map(|(i, w)| CatalogModel {
                        name: format!("M{i}"),
                        watts: *w,
                    })
                    .collect(),
            }],
            is_default: false,
        }
    }

    fn keys(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_blank_watt_bounds_are_unset() {
        let spec: FilterSpec =
            serde_json::from_value(serde_json::json!({ "minWatts": "", "maxWatts": " " }))
                .unwrap();
        assert_eq!(spec.min_watts, None);
        assert_eq!(spec.max_watts, None);
        assert!(spec.is_empty());

        let spec: FilterSpec =
            serde_json::from_value(serde_json::json!({ "minWatts": 100, "maxWatts": "250" }))
                .unwrap();
        assert_eq!(spec.min_watts, Some(100.0));
        assert_eq!(spec.max_watts, Some(250.0));

        let spec: FilterSpec =
            serde_json::from_value(serde_json::json!({ "maxWatts": null })).unwrap();
        assert_eq!(spec.max_watts, None);

        let err = serde_json::from_value::<FilterSpec>(serde_json::json!({ "minWatts": "lots" }))
            .unwrap_err();
        assert!(err.to_string().contains("invalid wattage"));
    }

    #[test]
    fn test_empty_spec_keeps_everything() {
        let catalog = build_catalog(&[]);
        let spec = FilterSpec::new();
        assert!(spec.is_empty());
        assert_eq!(spec.apply(&catalog), catalog);
    }

    #[test]
    fn test_wattage_is_existential() {
        let catalog = vec![entry("custom_kettle", &[90.0, 150.0])];
        let spec = FilterSpec::new().min_watts(100.0).max_watts(200.0);
        assert_eq!(keys(&spec.apply(&catalog)), vec!["custom_kettle"]);

        let spec = FilterSpec::new().min_watts(160.0).max_watts(200.0);
        assert!(spec.apply(&catalog).is_empty());
    }

    #[test]
    fn test_wattage_bounds_are_inclusive() {
        let catalog = vec![entry("custom_fan", &[40.0])];
        assert_eq!(FilterSpec::new().min_watts(40.0).apply(&catalog).len(), 1);
        assert_eq!(FilterSpec::new().max_watts(40.0).apply(&catalog).len(), 1);
    }

    #[test]
    fn test_search_matches_wattage_text() {
        let catalog = build_catalog(&[]);
        let result = FilterSpec::new().search("1800").apply(&catalog);
        assert_eq!(keys(&result), vec!["default_airConditioner"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_models_and_keys() {
        let catalog = build_catalog(&[]);
        assert_eq!(
            keys(&FilterSpec::new().search("aurora").apply(&catalog)),
            vec!["default_computer"]
        );
        assert_eq!(
            keys(&FilterSpec::new().search("WASHINGMACHINE").apply(&catalog)),
            vec!["default_washingMachine"]
        );
    }

    #[test]
    fn test_category_sentinel_and_exact() {
        let catalog = build_catalog(&[]);
        assert_eq!(FilterSpec::new().category("all").apply(&catalog).len(), catalog.len());
        assert_eq!(
            keys(&FilterSpec::new().category("kitchen").apply(&catalog)),
            vec!["default_refrigerator", "default_microwave"]
        );
        assert!(FilterSpec::new().category("kitch").apply(&catalog).is_empty());
    }

    #[test]
    fn test_brand_substring() {
        let catalog = build_catalog(&[]);
        assert_eq!(
            keys(&FilterSpec::new().brand("whirl").apply(&catalog)),
            vec!["default_refrigerator"]
        );
    }

    #[test]
    fn test_schedule_uses_first_label_only() {
        let catalog = build_catalog(&[]);
        // "Lunch" is the microwave's second schedule.
        assert!(FilterSpec::new().schedule("lunch").apply(&catalog).is_empty());
        assert_eq!(
            keys(&FilterSpec::new().schedule("BREAK").apply(&catalog)),
            vec!["default_microwave"]
        );
        assert_eq!(
            keys(&FilterSpec::new().schedule("afternoon").apply(&catalog)),
            vec!["default_tv", "default_airConditioner"]
        );
    }

    #[test]
    fn test_schedule_excludes_entries_without_template() {
        let catalog = vec![entry("custom_kettle", &[2200.0])];
        assert!(FilterSpec::new().schedule("morning").apply(&catalog).is_empty());
        assert_eq!(FilterSpec::new().schedule("all").apply(&catalog).len(), 1);
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let catalog = build_catalog(&[]);
        let spec = FilterSpec::new().brand("samsung").category("kitchen").max_watts(135.0);
        assert_eq!(keys(&spec.apply(&catalog)), vec!["default_refrigerator"]);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert!(FilterSpec::new().min_watts(10.0).max_watts(5.0).validate().is_err());
        assert!(FilterSpec::new().min_watts(-1.0).validate().is_err());
        assert!(FilterSpec::new().min_watts(5.0).validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_query() {
        let spec: FilterSpec = serde_json::from_str(r#"{"minWatts": 100, "brand": "LG"}"#).unwrap();
        assert_eq!(spec.min_watts, Some(100.0));
        assert_eq!(spec.brand, "LG");
        assert!(spec.search.is_empty());
    }
}
