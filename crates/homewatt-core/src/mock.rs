//! In-memory store for testing.
//!
//! [`MockStore`] implements [`DeviceStore`], [`CalculationStore`] and
//! [`CategoryStore`] without a database, with failure injection for the
//! calculation write.
//!
//! # Example
//!
//! ```
//! use homewatt_core::{ConsumptionCalculator, MockStore};
//! use homewatt_core::mock::FailureMode;
//! use homewatt_types::DeviceUsage;
//!
//! let store = MockStore::new();
//! let usage = [DeviceUsage::new("tv", "LG", "OLED C1", 100.0).with_usage(3.0, 7)];
//!
//! store.fail_next_calculation(FailureMode::BeforeWrite);
//! assert!(ConsumptionCalculator::default().calculate_and_record(&store, &usage).is_err());
//! assert!(ConsumptionCalculator::default().calculate_and_record(&store, &usage).is_ok());
//! ```

use std::sync::{Mutex, MutexGuard};

use time::{Duration, OffsetDateTime};

use homewatt_types::{
    CalculationRecord, Category, CategoryRecord, DeviceRecord, DeviceSnapshot, NewCategory,
    NewDevice,
};

use crate::error::{Error, Result};
use crate::query::DeviceQuery;
use crate::traits::{CalculationStore, CategoryStore, DeviceStore};

/// How the next calculation write should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Fail without writing anything.
    BeforeWrite,
    /// Report success but return only the first snapshot.
    PartialWrite,
}

#[derive(Debug)]
struct Inner {
    devices: Vec<DeviceRecord>,
    calculations: Vec<CalculationRecord>,
    categories: Vec<CategoryRecord>,
    next_id: i64,
    clock: OffsetDateTime,
    fail_next: Option<FailureMode>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Every write advances the clock by one second so records are ordered.
    fn tick(&mut self) -> OffsetDateTime {
        self.clock += Duration::seconds(1);
        self.clock
    }
}

/// Thread-safe in-memory store.
#[derive(Debug)]
pub struct MockStore {
    inner: Mutex<Inner>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                devices: Vec::new(),
                calculations: Vec::new(),
                categories: Vec::new(),
                next_id: 0,
                clock: OffsetDateTime::UNIX_EPOCH + Duration::days(19_723),
                fail_next: None,
            }),
        }
    }

    /// Create a store seeded with the built-in categories.
    pub fn with_default_categories() -> Result<Self> {
        let store = Self::new();
        for category in Category::ALL {
            store.create_category(&category.into())?;
        }
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| Error::persistence(format!("mock store lock poisoned: {e}")))
    }

    /// Make the next [`CalculationStore::create_calculation`] call fail.
    pub fn fail_next_calculation(&self, mode: FailureMode) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_next = Some(mode);
        }
    }

    /// Number of stored calculations.
    pub fn calculation_count(&self) -> usize {
        self.inner.lock().map(|i| i.calculations.len()).unwrap_or(0)
    }

    /// Store a calculation with an explicit creation time.
    pub fn create_calculation_at(
        &self,
        total_consumption: f64,
        devices: &[DeviceSnapshot],
        created_at: OffsetDateTime,
    ) -> Result<CalculationRecord> {
        let mut inner = self.lock()?;
        let record = CalculationRecord {
            id: inner.next_id(),
            total_consumption,
            created_at,
            devices: devices.to_vec(),
        };
        inner.calculations.push(record.clone());
        Ok(record)
    }
}

impl DeviceStore for MockStore {
    fn create_device(&self, device: &NewDevice) -> Result<DeviceRecord> {
        device.validate()?;
        let mut inner = self.lock()?;
        let record = DeviceRecord {
            id: inner.next_id(),
            device_type: device.device_type.clone(),
            brand: device.brand.clone(),
            model: device.model.clone(),
            watts: device.watts,
            hours_per_day: device.hours_per_day(),
            days_per_week: device.days_per_week(),
            label: device.label.clone(),
            category: device.category.clone(),
            description: device.description.clone(),
            specifications: device.specifications.clone(),
            created_at: inner.tick(),
        };
        inner.devices.push(record.clone());
        Ok(record)
    }

    fn list_devices(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>> {
        query.validate()?;
        let inner = self.lock()?;
        let mut devices: Vec<DeviceRecord> = inner
            .devices
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        devices.sort_by(|a, b| query.compare(a, b));
        Ok(devices)
    }

    fn delete_device(&self, id: i64) -> Result<DeviceRecord> {
        let mut inner = self.lock()?;
        let idx = inner
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::not_found("device", id))?;
        Ok(inner.devices.remove(idx))
    }
}

impl CalculationStore for MockStore {
    fn create_calculation(
        &self,
        total_consumption: f64,
        devices: &[DeviceSnapshot],
    ) -> Result<CalculationRecord> {
        let mut inner = self.lock()?;
        match inner.fail_next.take() {
            Some(FailureMode::BeforeWrite) => {
                return Err(Error::persistence("injected calculation failure"));
            }
            Some(FailureMode::PartialWrite) => {
                return Ok(CalculationRecord {
                    id: inner.next_id(),
                    total_consumption,
                    created_at: inner.tick(),
                    devices: devices.iter().take(1).cloned().collect(),
                });
            }
            None => {}
        }

        let record = CalculationRecord {
            id: inner.next_id(),
            total_consumption,
            created_at: inner.tick(),
            devices: devices.to_vec(),
        };
        inner.calculations.push(record.clone());
        Ok(record)
    }

    fn list_calculations(
        &self,
        limit: Option<u32>,
        newest_first: bool,
    ) -> Result<Vec<CalculationRecord>> {
        let inner = self.lock()?;
        let mut records = inner.calculations.clone();
        records.sort_by(|a, b| {
            let ord = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
            if newest_first { ord.reverse() } else { ord }
        });
        if let Some(limit) = limit {
            records.truncate(limit as usize);
        }
        Ok(records)
    }
}

impl CategoryStore for MockStore {
    fn create_category(&self, category: &NewCategory) -> Result<CategoryRecord> {
        category.validate()?;
        let mut inner = self.lock()?;
        if inner.categories.iter().any(|c| c.value == category.value) {
            return Err(Error::Conflict(format!(
                "category '{}' already exists",
                category.value
            )));
        }
        let record = CategoryRecord {
            id: inner.next_id(),
            value: category.value.clone(),
            label: category.label.clone(),
        };
        inner.categories.push(record.clone());
        Ok(record)
    }

    fn list_categories(&self) -> Result<Vec<CategoryRecord>> {
        let inner = self.lock()?;
        let mut categories = inner.categories.clone();
        categories.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{DeviceSort, SortOrder};

    #[test]
    fn test_delete_missing_device_is_not_found() {
        let store = MockStore::new();
        let err = store.delete_device(99).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "device", .. }));
    }

    #[test]
    fn test_create_and_delete_device() {
        let store = MockStore::new();
        let created = store
            .create_device(&NewDevice::new("tv", "LG", "OLED C1", 100.0))
            .unwrap();
        assert_eq!(created.hours_per_day, 1.0);
        let deleted = store.delete_device(created.id).unwrap();
        assert_eq!(deleted, created);
        assert!(store.list_devices(&DeviceQuery::new()).unwrap().is_empty());
    }

    #[test]
    fn test_create_device_validates() {
        let store = MockStore::new();
        assert!(store.create_device(&NewDevice::new("tv", "LG", "C1", -3.0)).is_err());
    }

    #[test]
    fn test_list_devices_applies_query() {
        let store = MockStore::new();
        for (model, watts) in [("A", 300.0), ("B", 100.0), ("C", 200.0)] {
            store.create_device(&NewDevice::new("tv", "LG", model, watts)).unwrap();
        }
        let query = DeviceQuery::new()
            .watts_between(150.0, 400.0)
            .sort_by(DeviceSort::Watts, SortOrder::Asc);
        let models: Vec<String> = store
            .list_devices(&query)
            .unwrap()
            .into_iter()
            .map(|d| d.model)
            .collect();
        assert_eq!(models, vec!["C", "A"]);
    }

    #[test]
    fn test_duplicate_category_conflicts() {
        let store = MockStore::with_default_categories().unwrap();
        let err = store
            .create_category(&NewCategory::new("kitchen", "Cooking"))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_categories_sorted_by_label() {
        let store = MockStore::with_default_categories().unwrap();
        let labels: Vec<String> = store
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.label)
            .collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
        assert_eq!(labels[0], "Cleaning");
    }

    #[test]
    fn test_failure_injection_is_one_shot() {
        let store = MockStore::new();
        store.fail_next_calculation(FailureMode::BeforeWrite);
        assert!(store.create_calculation(1.0, &[]).is_err());
        assert!(store.create_calculation(1.0, &[]).is_ok());
        assert_eq!(store.calculation_count(), 1);
    }
}
