//! Query builder for listing registered devices.
//!
//! [`DeviceQuery`] follows the builder pattern: every filter is optional and
//! methods can be chained in any order.
//!
//! # Example
//!
//! ```
//! use homewatt_core::{DeviceQuery, DeviceSort, SortOrder};
//!
//! let query = DeviceQuery::new()
//!     .search("samsung")
//!     .category("kitchen")
//!     .watts_between(100.0, 1500.0)
//!     .sort_by(DeviceSort::Watts, SortOrder::Desc);
//! assert!(query.validate().is_ok());
//! ```

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use homewatt_types::{DeviceRecord, ValidationError, ValidationResult};

/// Lower wattage bound applied when none is given.
pub const DEFAULT_MIN_WATTS: f64 = 0.0;
/// Upper wattage bound applied when none is given.
pub const DEFAULT_MAX_WATTS: f64 = 99_999.0;

/// Column to order device listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceSort {
    /// Display name (label, or brand and model).
    #[default]
    Name,
    /// Device type key.
    Type,
    /// Manufacturer.
    Brand,
    /// Model name.
    Model,
    /// Power draw.
    Watts,
    /// Registration time.
    CreatedAt,
}

impl FromStr for DeviceSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(DeviceSort::Name),
            "type" => Ok(DeviceSort::Type),
            "brand" => Ok(DeviceSort::Brand),
            "model" => Ok(DeviceSort::Model),
            "watts" => Ok(DeviceSort::Watts),
            "createdAt" | "created_at" => Ok(DeviceSort::CreatedAt),
            other => Err(ValidationError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(ValidationError::UnknownOrder {
                value: s.to_string(),
                expected: "asc or desc",
            })
        }
    }
}

/// Filter and ordering for [`DeviceStore::list_devices`](crate::DeviceStore::list_devices).
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceQuery {
    /// Case-insensitive substring over name, brand, model and type.
    pub search: Option<String>,
    /// Exact category value.
    pub category: Option<String>,
    /// Inclusive lower wattage bound.
    pub min_watts: f64,
    /// Inclusive upper wattage bound.
    pub max_watts: f64,
    /// Sort column.
    pub sort: DeviceSort,
    /// Sort direction.
    pub order: SortOrder,
}

impl Default for DeviceQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            min_watts: DEFAULT_MIN_WATTS,
            max_watts: DEFAULT_MAX_WATTS,
            sort: DeviceSort::default(),
            order: SortOrder::default(),
        }
    }
}

impl DeviceQuery {
    /// Create a query that lists every device by name ascending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by a search term. Blank terms are ignored.
    pub fn search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    /// Filter by exact category value. Blank values are ignored.
    pub fn category(mut self, category: &str) -> Self {
        let category = category.trim();
        self.category = (!category.is_empty()).then(|| category.to_string());
        self
    }

    /// Restrict to devices drawing between `min` and `max` watts inclusive.
    pub fn watts_between(mut self, min: f64, max: f64) -> Self {
        self.min_watts = min;
        self.max_watts = max;
        self
    }

    /// Set ordering.
    pub fn sort_by(mut self, sort: DeviceSort, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    /// Reject ranges that can never match anything meaningful.
    pub fn validate(&self) -> ValidationResult<()> {
        let bounds_ok = self.min_watts.is_finite()
            && self.max_watts.is_finite()
            && self.min_watts >= 0.0
            && self.min_watts <= self.max_watts;
        if bounds_ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidWattRange {
                min: self.min_watts,
                max: self.max_watts,
            })
        }
    }

    /// Whether a record passes every filter of this query.
    pub fn matches(&self, device: &DeviceRecord) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            let term = term.to_lowercase();
            [
                device.display_name().as_str(),
                device.brand.as_str(),
                device.model.as_str(),
                device.device_type.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
        });

        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|c| device.category.as_deref() == Some(c));

        let matches_watts = device.watts >= self.min_watts && device.watts <= self.max_watts;

        matches_search && matches_category && matches_watts
    }

    /// Compare two records according to this query's ordering.
    ///
    /// Ties are broken by id so the ordering is total.
    pub fn compare(&self, a: &DeviceRecord, b: &DeviceRecord) -> Ordering {
        let primary = match self.sort {
            DeviceSort::Name => a.display_name().cmp(&b.display_name()),
            DeviceSort::Type => a.device_type.cmp(&b.device_type),
            DeviceSort::Brand => a.brand.cmp(&b.brand),
            DeviceSort::Model => a.model.cmp(&b.model),
            DeviceSort::Watts => a.watts.total_cmp(&b.watts),
            DeviceSort::CreatedAt => a.created_at.cmp(&b.created_at),
        }
        .then(a.id.cmp(&b.id));

        match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        }
    }
}
