//! Core types for household energy estimates.

use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ValidationError, ValidationResult};

/// Hours of use assumed when a device does not specify any.
pub const DEFAULT_HOURS_PER_DAY: f64 = 1.0;
/// Days of use assumed when a device does not specify any.
pub const DEFAULT_DAYS_PER_WEEK: u8 = 7;
/// Upper bound for daily usage.
pub const MAX_HOURS_PER_DAY: f64 = 24.0;

/// Built-in appliance category.
///
/// Registered devices may carry any category string (users can create their
/// own through the category store); this enum only covers the categories the
/// built-in device templates use.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new categories
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum Category {
    /// TVs, consoles, audio.
    Entertainment,
    /// Fridges, microwaves, ovens.
    Kitchen,
    /// Computers and peripherals.
    Office,
    /// Air conditioning and heating.
    Climate,
    /// Lamps and fixtures.
    Lighting,
    /// Washing machines, vacuums.
    Cleaning,
}

impl Category {
    /// Every built-in category, in declaration order.
    pub const ALL: [Category; 6] = [
        Category::Entertainment,
        Category::Kitchen,
        Category::Office,
        Category::Climate,
        Category::Lighting,
        Category::Cleaning,
    ];

    /// The wire value of the category (e.g. `"kitchen"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::Kitchen => "kitchen",
            Category::Office => "office",
            Category::Climate => "climate",
            Category::Lighting => "lighting",
            Category::Cleaning => "cleaning",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Kitchen => "Kitchen",
            Category::Office => "Office",
            Category::Climate => "Climate control",
            Category::Lighting => "Lighting",
            Category::Cleaning => "Cleaning",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Parse a category value, ignoring ASCII case.
    ///
    /// ```
    /// use homewatt_types::Category;
    ///
    /// assert_eq!("Kitchen".parse::<Category>(), Ok(Category::Kitchen));
    /// assert!("garage".parse::<Category>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Check that a power draw is usable for a registered device (`> 0`).
pub fn validate_watts(watts: f64) -> ValidationResult<()> {
    if watts.is_finite() && watts > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidWatts(watts))
    }
}

/// Check that daily usage lies in `0..=24` hours.
pub fn validate_hours(hours: f64) -> ValidationResult<()> {
    if hours.is_finite() && (0.0..=MAX_HOURS_PER_DAY).contains(&hours) {
        Ok(())
    } else {
        Err(ValidationError::HoursOutOfRange(hours))
    }
}

/// Check that weekly usage lies in `1..=7` days.
pub fn validate_days(days: u8) -> ValidationResult<()> {
    if (1..=7).contains(&days) {
        Ok(())
    } else {
        Err(ValidationError::DaysOutOfRange(days))
    }
}

fn require(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

/// A user-registered device as persisted by the device store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DeviceRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Device type key (e.g. `tv`, `coffeeMaker`).
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub device_type: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Power draw in watts, always positive.
    pub watts: f64,
    /// Typical daily use in hours (0-24).
    pub hours_per_day: f64,
    /// Typical weekly use in days (1-7).
    pub days_per_week: u8,
    /// Display label for the device type.
    pub label: Option<String>,
    /// Category value, built-in or user-created.
    pub category: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Free-form technical specifications.
    #[cfg_attr(feature = "serde", serde(default))]
    pub specifications: BTreeMap<String, String>,
    /// When the device was registered.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub created_at: OffsetDateTime,
}

impl DeviceRecord {
    /// Name shown to users: the label if set, otherwise `"<brand> <model>"`.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => format!("{} {}", self.brand, self.model),
        }
    }

    /// Freeze this device's usage data into a calculation snapshot.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            device_type: self.device_type.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            watts: self.watts,
            hours_per_day: self.hours_per_day,
            days_per_week: self.days_per_week,
            name: format!("{} {}", self.brand, self.model),
        }
    }
}

/// Registration request for a new device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NewDevice {
    /// Device type key.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub device_type: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Power draw in watts.
    pub watts: f64,
    /// Daily use in hours, defaults to [`DEFAULT_HOURS_PER_DAY`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub hours_per_day: Option<f64>,
    /// Weekly use in days, defaults to [`DEFAULT_DAYS_PER_WEEK`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub days_per_week: Option<u8>,
    /// Display label for the device type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    /// Category value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: Option<String>,
    /// Free-form description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Free-form technical specifications.
    #[cfg_attr(feature = "serde", serde(default))]
    pub specifications: BTreeMap<String, String>,
}

impl NewDevice {
    /// Create a registration request with default usage and no metadata.
    pub fn new(
        device_type: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        watts: f64,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            brand: brand.into(),
            model: model.into(),
            watts,
            hours_per_day: None,
            days_per_week: None,
            label: None,
            category: None,
            description: None,
            specifications: BTreeMap::new(),
        }
    }

    /// Set daily hours and weekly days of use.
    pub fn with_usage(mut self, hours_per_day: f64, days_per_week: u8) -> Self {
        self.hours_per_day = Some(hours_per_day);
        self.days_per_week = Some(days_per_week);
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the category value.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add a specification entry.
    pub fn with_specification(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.specifications.insert(key.into(), value.into());
        self
    }

    /// Daily hours with the default applied.
    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day.unwrap_or(DEFAULT_HOURS_PER_DAY)
    }

    /// Weekly days with the default applied.
    pub fn days_per_week(&self) -> u8 {
        self.days_per_week.unwrap_or(DEFAULT_DAYS_PER_WEEK)
    }

    /// Validate against the device record invariants.
    pub fn validate(&self) -> ValidationResult<()> {
        require("type", &self.device_type)?;
        require("brand", &self.brand)?;
        require("model", &self.model)?;
        validate_watts(self.watts)?;
        validate_hours(self.hours_per_day())?;
        validate_days(self.days_per_week())
    }
}

/// One device's usage as submitted for a consumption calculation.
///
/// Unlike [`NewDevice`], zero watts is accepted here: a zero-power device
/// simply contributes nothing to the total.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DeviceUsage {
    /// Device type key.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub device_type: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Power draw in watts.
    pub watts: f64,
    /// Daily use in hours, defaults to [`DEFAULT_HOURS_PER_DAY`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub hours_per_day: Option<f64>,
    /// Weekly use in days, defaults to [`DEFAULT_DAYS_PER_WEEK`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub days_per_week: Option<u8>,
    /// Display name, defaults to `"<brand> <model>"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

impl DeviceUsage {
    /// Create a usage entry with default hours and days.
    pub fn new(
        device_type: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        watts: f64,
    ) -> Self {
        Self {
            device_type: device_type.into(),
            brand: brand.into(),
            model: model.into(),
            watts,
            hours_per_day: None,
            days_per_week: None,
            name: None,
        }
    }

    /// Set daily hours and weekly days of use.
    pub fn with_usage(mut self, hours_per_day: f64, days_per_week: u8) -> Self {
        self.hours_per_day = Some(hours_per_day);
        self.days_per_week = Some(days_per_week);
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Daily hours with the default applied.
    pub fn hours_per_day(&self) -> f64 {
        self.hours_per_day.unwrap_or(DEFAULT_HOURS_PER_DAY)
    }

    /// Weekly days with the default applied.
    pub fn days_per_week(&self) -> u8 {
        self.days_per_week.unwrap_or(DEFAULT_DAYS_PER_WEEK)
    }

    /// Display name with the default applied.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} {}", self.brand, self.model),
        }
    }

    /// Validate the shape of the entry.
    pub fn validate(&self) -> ValidationResult<()> {
        require("type", &self.device_type)?;
        require("brand", &self.brand)?;
        require("model", &self.model)?;
        if !self.watts.is_finite() || self.watts < 0.0 {
            return Err(ValidationError::InvalidWatts(self.watts));
        }
        validate_hours(self.hours_per_day())?;
        validate_days(self.days_per_week())
    }

    /// Freeze the entry, with defaults applied, into a snapshot.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            device_type: self.device_type.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            watts: self.watts,
            hours_per_day: self.hours_per_day(),
            days_per_week: self.days_per_week(),
            name: self.name(),
        }
    }
}

/// Immutable copy of a device's usage taken at calculation time.
///
/// Snapshots never reference a [`DeviceRecord`], so deleting a device
/// leaves past calculations intact.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DeviceSnapshot {
    /// Device type key.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub device_type: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub model: String,
    /// Power draw in watts.
    pub watts: f64,
    /// Daily use in hours.
    pub hours_per_day: f64,
    /// Weekly use in days.
    pub days_per_week: u8,
    /// Display name.
    pub name: String,
}

/// A persisted calculation result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CalculationRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Week-averaged daily energy in kWh.
    pub total_consumption: f64,
    /// When the calculation was recorded.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub created_at: OffsetDateTime,
    /// Devices frozen at calculation time.
    pub devices: Vec<DeviceSnapshot>,
}

/// A category available for tagging registered devices.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Machine value (e.g. `kitchen`).
    pub value: String,
    /// Display label.
    pub label: String,
}

/// Request to create a category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewCategory {
    /// Machine value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl NewCategory {
    /// Create a category request.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Both value and label must be non-blank.
    pub fn validate(&self) -> ValidationResult<()> {
        require("value", &self.value)?;
        require("label", &self.label)
    }
}

impl From<Category> for NewCategory {
    fn from(category: Category) -> Self {
        NewCategory::new(category.as_str(), category.label())
    }
}
