//! Energy and cost arithmetic.
//!
//! Per-device energy is a week-averaged daily figure:
//!
//! ```text
//! daily_kwh = watts * hours_per_day * days_per_week / 7000
//! ```
//!
//! i.e. weekly watt-hours divided by 7 days and by 1000 Wh/kWh. It is the
//! energy of an average day, not of an active-use day. Monthly projections
//! use a flat 30-day month.

use serde::Serialize;
use tracing::{debug, info};

use homewatt_types::{
    CalculationRecord, DeviceSnapshot, DeviceUsage, ValidationError, ValidationResult,
};

use crate::error::{Error, Result};
use crate::traits::CalculationStore;

/// Divisor combining 7 days per week and 1000 Wh per kWh.
const WEEKLY_WH_TO_DAILY_KWH: f64 = 7000.0;
/// Days in a projected month.
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Electricity rate used when none is configured (currency per kWh).
pub const DEFAULT_RATE: f64 = 5.0;
/// Relative tolerance when comparing a client-supplied total.
pub const TOTAL_TOLERANCE: f64 = 1e-6;

/// Week-averaged daily energy of one device in kWh.
///
/// ```
/// use homewatt_core::calculator::daily_kwh;
///
/// assert!((daily_kwh(150.0, 4.0, 7) - 0.6).abs() < 1e-12);
/// ```
pub fn daily_kwh(watts: f64, hours_per_day: f64, days_per_week: u8) -> f64 {
    watts * hours_per_day * f64::from(days_per_week) / WEEKLY_WH_TO_DAILY_KWH
}

/// Projected monthly cost of a daily consumption at `rate` per kWh.
pub fn monthly_cost(total_consumption: f64, rate: f64) -> f64 {
    total_consumption * rate * DAYS_PER_MONTH
}

/// Round to two decimals for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A rate must be a finite non-negative number.
pub fn validate_rate(rate: f64) -> ValidationResult<()> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidRate(rate))
    }
}

/// Check a client-supplied total against the computed one.
pub fn verify_total(supplied: f64, computed: f64) -> ValidationResult<()> {
    if !supplied.is_finite() || supplied <= 0.0 {
        return Err(ValidationError::InvalidTotal(supplied));
    }
    let tolerance = TOTAL_TOLERANCE * computed.abs().max(supplied.abs());
    if (supplied - computed).abs() > tolerance {
        return Err(ValidationError::TotalMismatch { supplied, computed });
    }
    Ok(())
}

/// One device's contribution to a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConsumption {
    /// Display name.
    pub name: String,
    /// Device type key.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Week-averaged daily energy in kWh.
    pub daily_kwh: f64,
    /// Fraction of the total, 0 to 1.
    pub share: f64,
}

/// Result of a consumption calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReport {
    /// Per-device breakdown in input order.
    pub devices: Vec<DeviceConsumption>,
    /// Sum of per-device daily energy in kWh.
    pub total_consumption: f64,
    /// Rate used for the cost projection.
    pub rate: f64,
    /// Projected 30-day cost.
    pub monthly_cost: f64,
    /// Projected 30-day energy in kWh.
    pub monthly_kwh: f64,
}

impl ConsumptionReport {
    /// The device with the largest daily energy.
    pub fn top_consumer(&self) -> Option<&DeviceConsumption> {
        self.devices
            .iter()
            .max_by(|a, b| a.daily_kwh.total_cmp(&b.daily_kwh))
    }
}

/// A persisted calculation together with its report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCalculation {
    /// The stored record.
    pub calculation: CalculationRecord,
    /// The computed breakdown.
    pub report: ConsumptionReport,
}

/// Converts device usage into energy totals and cost projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionCalculator {
    rate: f64,
}

impl Default for ConsumptionCalculator {
    fn default() -> Self {
        Self { rate: DEFAULT_RATE }
    }
}

impl ConsumptionCalculator {
    /// Create a calculator for an electricity rate in currency per kWh.
    pub fn new(rate: f64) -> Result<Self> {
        validate_rate(rate)?;
        Ok(Self { rate })
    }

    /// The electricity rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Validate usage entries and freeze them into snapshots with defaults
    /// applied.
    pub fn snapshots(usages: &[DeviceUsage]) -> Result<Vec<DeviceSnapshot>> {
        if usages.is_empty() {
            return Err(ValidationError::EmptyDeviceList.into());
        }
        usages
            .iter()
            .map(|u| {
                u.validate()?;
                Ok(u.snapshot())
            })
            .collect()
    }

    /// Compute the report for already-frozen snapshots.
    ///
    /// Fails if the list is empty or the total is not a finite positive
    /// number (for example when every device draws zero watts).
    pub fn compute(&self, devices: &[DeviceSnapshot]) -> Result<ConsumptionReport> {
        if devices.is_empty() {
            return Err(ValidationError::EmptyDeviceList.into());
        }

        let energies: Vec<f64> = devices
            .iter()
            .map(|d| daily_kwh(d.watts, d.hours_per_day, d.days_per_week))
            .collect();
        let total: f64 = energies.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ValidationError::InvalidTotal(total).into());
        }

        let devices = devices
            .iter()
            .zip(&energies)
            .map(|(d, &kwh)| DeviceConsumption {
                name: d.name.clone(),
                device_type: d.device_type.clone(),
                daily_kwh: kwh,
                share: kwh / total,
            })
            .collect();

        Ok(ConsumptionReport {
            devices,
            total_consumption: total,
            rate: self.rate,
            monthly_cost: monthly_cost(total, self.rate),
            monthly_kwh: total * DAYS_PER_MONTH,
        })
    }

    /// Validate usage entries and compute their report.
    pub fn calculate(&self, usages: &[DeviceUsage]) -> Result<ConsumptionReport> {
        self.compute(&Self::snapshots(usages)?)
    }

    /// Compute and persist a calculation as one unit.
    ///
    /// If the store returns fewer snapshots than were submitted the write is
    /// treated as failed.
    pub fn record<S>(&self, store: &S, devices: &[DeviceSnapshot]) -> Result<RecordedCalculation>
    where
        S: CalculationStore + ?Sized,
    {
        let report = self.compute(devices)?;
        let calculation = store.create_calculation(report.total_consumption, devices)?;

        if calculation.devices.len() != devices.len() {
            return Err(Error::persistence(format!(
                "calculation {} stored {} of {} devices",
                calculation.id,
                calculation.devices.len(),
                devices.len()
            )));
        }

        info!(
            id = calculation.id,
            devices = devices.len(),
            total_kwh = report.total_consumption,
            "Recorded calculation"
        );
        debug!(monthly_cost = report.monthly_cost, rate = self.rate, "Cost projection");

        Ok(RecordedCalculation {
            calculation,
            report,
        })
    }

    /// Validate usage entries, then compute and persist them.
    pub fn calculate_and_record<S>(
        &self,
        store: &S,
        usages: &[DeviceUsage],
    ) -> Result<RecordedCalculation>
    where
        S: CalculationStore + ?Sized,
    {
        self.record(store, &Self::snapshots(usages)?)
    }
}
