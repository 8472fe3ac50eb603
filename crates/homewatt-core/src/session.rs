//! Explicit calculation session state.
//!
//! A [`CalculationSession`] holds the devices a user has selected for the
//! next calculation, the electricity rate and the current catalog filters.
//! It is passed by reference into the calculator and never touches the
//! device store: editing usage here changes only the session copy.

use serde::Serialize;
use tracing::debug;

use homewatt_types::{DeviceSnapshot, DeviceUsage, ValidationError, validate_days, validate_hours};

use crate::calculator::{
    ConsumptionCalculator, ConsumptionReport, DEFAULT_RATE, RecordedCalculation, validate_rate,
};
use crate::catalog::{CatalogEntry, find_entry, strip_namespace};
use crate::error::{Error, Result};
use crate::filter::FilterSpec;
use crate::traits::CalculationStore;

/// A device selected into a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDevice {
    /// Session-local identifier.
    pub id: u64,
    /// Usage data with defaults applied.
    #[serde(flatten)]
    pub snapshot: DeviceSnapshot,
}

/// Selected devices, rate and filters for one user.
#[derive(Debug, Clone)]
pub struct CalculationSession {
    devices: Vec<SessionDevice>,
    next_id: u64,
    rate: f64,
    filters: FilterSpec,
    last_report: Option<ConsumptionReport>,
}

impl Default for CalculationSession {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            next_id: 0,
            rate: DEFAULT_RATE,
            filters: FilterSpec::default(),
            last_report: None,
        }
    }
}

impl CalculationSession {
    /// Create an empty session with the default rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with a specific rate.
    pub fn with_rate(rate: f64) -> Result<Self> {
        let mut session = Self::new();
        session.set_rate(rate)?;
        Ok(session)
    }

    /// Selected devices in insertion order.
    pub fn devices(&self) -> &[SessionDevice] {
        &self.devices
    }

    /// Electricity rate in currency per kWh.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Current catalog filters.
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// Report from the last successful [`calculate`](Self::calculate).
    pub fn last_report(&self) -> Option<&ConsumptionReport> {
        self.last_report.as_ref()
    }

    /// Add a device, applying default hours, days and name.
    ///
    /// Returns the session-local id.
    pub fn add_device(&mut self, usage: DeviceUsage) -> Result<u64> {
        usage.validate()?;
        self.next_id += 1;
        let id = self.next_id;
        let snapshot = usage.snapshot();
        debug!(id, name = %snapshot.name, "Added device to session");
        self.devices.push(SessionDevice { id, snapshot });
        Ok(id)
    }

    /// Add a model chosen from the catalog.
    ///
    /// The catalog key's `default_`/`custom_` namespace is stripped to
    /// recover the device type.
    pub fn select_model(
        &mut self,
        catalog: &[CatalogEntry],
        entry_key: &str,
        brand: &str,
        model: &str,
    ) -> Result<u64> {
        let entry = find_entry(catalog, entry_key)
            .ok_or_else(|| Error::UnknownTemplate(entry_key.to_string()))?;
        let spec = entry
            .find_model(brand, model)
            .ok_or_else(|| Error::not_found("model", format!("{entry_key}/{brand}/{model}")))?;
        self.add_device(DeviceUsage::new(
            strip_namespace(entry_key),
            brand,
            model,
            spec.watts,
        ))
    }

    fn device_mut(&mut self, id: u64) -> Result<&mut SessionDevice> {
        self.devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::not_found("session device", id))
    }

    /// Change a selected device's usage.
    pub fn update_usage(&mut self, id: u64, hours_per_day: f64, days_per_week: u8) -> Result<()> {
        validate_hours(hours_per_day)?;
        validate_days(days_per_week)?;
        let device = self.device_mut(id)?;
        device.snapshot.hours_per_day = hours_per_day;
        device.snapshot.days_per_week = days_per_week;
        Ok(())
    }

    /// Remove a selected device.
    pub fn remove_device(&mut self, id: u64) -> Result<SessionDevice> {
        let idx = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::not_found("session device", id))?;
        Ok(self.devices.remove(idx))
    }

    /// Remove every selected device and the last report.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.last_report = None;
    }

    /// Set the electricity rate.
    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        validate_rate(rate)?;
        self.rate = rate;
        Ok(())
    }

    /// Replace the catalog filters.
    pub fn set_filters(&mut self, filters: FilterSpec) -> Result<()> {
        filters.validate()?;
        self.filters = filters;
        Ok(())
    }

    /// Apply the session filters to a catalog.
    pub fn filtered_catalog(&self, catalog: &[CatalogEntry]) -> Vec<CatalogEntry> {
        self.filters.apply(catalog)
    }

    /// Compute and persist a calculation for the selected devices.
    pub fn calculate<S>(&mut self, store: &S) -> Result<RecordedCalculation>
    where
        S: CalculationStore + ?Sized,
    {
        if self.devices.is_empty() {
            return Err(ValidationError::EmptyDeviceList.into());
        }
        let snapshots: Vec<DeviceSnapshot> =
            self.devices.iter().map(|d| d.snapshot.clone()).collect();
        let recorded = ConsumptionCalculator::new(self.rate)?.record(store, &snapshots)?;
        self.last_report = Some(recorded.report.clone());
        Ok(recorded)
    }
}
