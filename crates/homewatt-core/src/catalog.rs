//! Catalog aggregation.
//!
//! Merges the built-in [`DEVICE_TEMPLATES`](crate::templates::DEVICE_TEMPLATES)
//! with user-registered devices into one browsable list of [`CatalogEntry`].
//!
//! Entries are namespaced by source: templates become `default_<type>` and
//! registered devices are folded into `custom_<type>`. A registered `tv`
//! therefore never merges into the built-in `tv` entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use homewatt_types::DeviceRecord;

use crate::templates::{self, DeviceTemplate, UsageSchedule};

/// Key prefix for entries built from templates.
pub const DEFAULT_PREFIX: &str = "default_";
/// Key prefix for entries folded from registered devices.
pub const CUSTOM_PREFIX: &str = "custom_";
/// Category assigned to registered devices that have none.
pub const FALLBACK_CATEGORY: &str = "other";

/// Strip the `default_` or `custom_` namespace from a catalog key.
///
/// Keys without a namespace are returned unchanged.
///
/// ```
/// use homewatt_core::catalog::strip_namespace;
///
/// assert_eq!(strip_namespace("default_tv"), "tv");
/// assert_eq!(strip_namespace("custom_coffeeMaker"), "coffeeMaker");
/// assert_eq!(strip_namespace("tv"), "tv");
/// ```
pub fn strip_namespace(key: &str) -> &str {
    key.strip_prefix(DEFAULT_PREFIX)
        .or_else(|| key.strip_prefix(CUSTOM_PREFIX))
        .unwrap_or(key)
}

/// A model within a brand bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogModel {
    /// Model name.
    pub name: String,
    /// Power draw in watts.
    pub watts: f64,
}

/// Models grouped under one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogBrand {
    /// Manufacturer, matched exactly.
    pub brand: String,
    /// Models in first-seen order.
    pub models: Vec<CatalogModel>,
}

/// One browsable device type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Namespaced key, `default_<type>` or `custom_<type>`.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Category value.
    pub category: String,
    /// Representative power draw in watts.
    pub average_watts: f64,
    /// Brand buckets in first-seen order.
    pub common_brands: Vec<CatalogBrand>,
    /// Whether the entry comes from the built-in templates.
    pub is_default: bool,
}

impl CatalogEntry {
    /// Build a `default_` entry from a template.
    pub fn from_template(template: &DeviceTemplate) -> Self {
        Self {
            key: format!("{DEFAULT_PREFIX}{}", template.type_key),
            label: template.label.to_string(),
            category: template.category.as_str().to_string(),
            average_watts: template.average_watts,
            common_brands: template
                .common_brands
                .iter()
                .map(|b| CatalogBrand {
                    brand: b.brand.to_string(),
                    models: b
                        .models
                        .iter()
                        .map(|m| CatalogModel {
                            name: m.name.to_string(),
                            watts: m.watts,
                        })
                        .collect(),
                })
                .collect(),
            is_default: true,
        }
    }

    fn from_record(record: &DeviceRecord) -> Self {
        let label = record
            .label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&record.device_type);
        Self {
            key: format!("{CUSTOM_PREFIX}{}", record.device_type),
            label: label.to_string(),
            category: record
                .category
                .clone()
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
            average_watts: record.watts,
            common_brands: Vec::new(),
            is_default: false,
        }
    }

    /// The device type with the namespace removed.
    pub fn type_key(&self) -> &str {
        strip_namespace(&self.key)
    }

    /// The template sharing this entry's type key, if any.
    ///
    /// Custom entries whose type collides with a built-in type resolve to
    /// that template as well.
    pub fn template(&self) -> Option<&'static DeviceTemplate> {
        templates::template(self.type_key())
    }

    /// The first schedule hint from the matching template.
    pub fn first_schedule(&self) -> Option<&'static UsageSchedule> {
        self.template().and_then(DeviceTemplate::first_schedule)
    }

    /// Iterate over every model across all brands.
    pub fn models(&self) -> impl Iterator<Item = &CatalogModel> {
        self.common_brands.iter().flat_map(|b| b.models.iter())
    }

    /// Find a model by exact brand and model name.
    pub fn find_model(&self, brand: &str, model: &str) -> Option<&CatalogModel> {
        self.common_brands
            .iter()
            .find(|b| b.brand == brand)?
            .models
            .iter()
            .find(|m| m.name == model)
    }

    fn push_model(&mut self, brand: &str, model: CatalogModel) {
        let bucket = match self.common_brands.iter().position(|b| b.brand == brand) {
            Some(idx) => &mut self.common_brands[idx],
            None => {
                self.common_brands.push(CatalogBrand {
                    brand: brand.to_string(),
                    models: Vec::new(),
                });
                let last = self.common_brands.len() - 1;
                &mut self.common_brands[last]
            }
        };

        let duplicate = bucket
            .models
            .iter()
            .any(|m| m.name == model.name && m.watts == model.watts);
        if duplicate {
            debug!(
                key = %self.key,
                brand,
                model = %model.name,
                "Skipping duplicate catalog model"
            );
            return;
        }
        bucket.models.push(model);
    }
}

/// Fold registered devices into `custom_` entries.
///
/// Single pass in record order. Entries are located by exact type, brand
/// buckets by exact brand. The first record of each type sets the entry's
/// label, category and average wattage. Exact `(model, watts)` repeats
/// within a brand bucket are dropped.
pub fn fold_custom(records: &[DeviceRecord]) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let idx = *index.entry(record.device_type.as_str()).or_insert_with(|| {
            entries.push(CatalogEntry::from_record(record));
            entries.len() - 1
        });
        entries[idx].push_model(
            &record.brand,
            CatalogModel {
                name: record.model.clone(),
                watts: record.watts,
            },
        );
    }

    entries
}

/// Build the full catalog: one entry per template, followed by the folded
/// custom entries.
pub fn aggregate(templates: &[DeviceTemplate], records: &[DeviceRecord]) -> Vec<CatalogEntry> {
    let mut catalog: Vec<CatalogEntry> =
        templates.iter().map(CatalogEntry::from_template).collect();
    let custom = fold_custom(records);
    debug!(
        defaults = catalog.len(),
        custom = custom.len(),
        "Aggregated device catalog"
    );
    catalog.extend(custom);
    catalog
}

/// Aggregate the built-in templates with `records`.
pub fn build_catalog(records: &[DeviceRecord]) -> Vec<CatalogEntry> {
    aggregate(templates::DEVICE_TEMPLATES, records)
}

/// Find an entry by its namespaced key.
pub fn find_entry<'a>(catalog: &'a [CatalogEntry], key: &str) -> Option<&'a CatalogEntry> {
    catalog.iter().find(|e| e.key == key)
}
