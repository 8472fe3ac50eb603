//! Row mapping and export models.

use std::collections::BTreeMap;

use rusqlite::Row;
use rusqlite::types::Type;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use homewatt_core::daily_kwh;
use homewatt_types::{CalculationRecord, DeviceRecord, DeviceSnapshot};

/// Read a unix-seconds column as a timestamp.
pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<OffsetDateTime> {
    let secs: i64 = row.get(idx)?;
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

/// Map a row selected with `DEVICE_COLUMNS`.
pub(crate) fn device_from_row(row: &Row<'_>) -> rusqlite::Result<DeviceRecord> {
    let specifications: String = row.get(10)?;
    let specifications: BTreeMap<String, String> = serde_json::from_str(&specifications)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;

    Ok(DeviceRecord {
        id: row.get(0)?,
        device_type: row.get(1)?,
        brand: row.get(2)?,
        model: row.get(3)?,
        watts: row.get(4)?,
        hours_per_day: row.get(5)?,
        days_per_week: row.get(6)?,
        label: row.get(7)?,
        category: row.get(8)?,
        description: row.get(9)?,
        specifications,
        created_at: timestamp(row, 11)?,
    })
}

/// Map a `calculation_devices` row (type, brand, model, watts, hours, days, name).
pub(crate) fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<DeviceSnapshot> {
    Ok(DeviceSnapshot {
        device_type: row.get(0)?,
        brand: row.get(1)?,
        model: row.get(2)?,
        watts: row.get(3)?,
        hours_per_day: row.get(4)?,
        days_per_week: row.get(5)?,
        name: row.get(6)?,
    })
}

/// One CSV line: a device of a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationCsvRow {
    /// Calculation id.
    pub calculation_id: i64,
    /// Calculation time, RFC 3339.
    pub created_at: String,
    /// Calculation total in kWh/day.
    pub total_consumption: f64,
    /// Device display name.
    pub name: String,
    /// Device type key.
    #[serde(rename = "type")]
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
    /// The device's week-averaged daily energy in kWh.
    pub daily_kwh: f64,
}

impl CalculationCsvRow {
    /// Build the rows for one calculation.
    pub fn from_calculation(record: &CalculationRecord) -> Vec<Self> {
        let created_at = record
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| record.created_at.unix_timestamp().to_string());

        record
            .devices
            .iter()
            .map(|d| Self {
                calculation_id: record.id,
                created_at: created_at.clone(),
                total_consumption: record.total_consumption,
                name: d.name.clone(),
                device_type: d.device_type.clone(),
                brand: d.brand.clone(),
                model: d.model.clone(),
                watts: d.watts,
                hours_per_day: d.hours_per_day,
                days_per_week: d.days_per_week,
                daily_kwh: daily_kwh(d.watts, d.hours_per_day, d.days_per_week),
            })
            .collect()
    }
}

/// Row counts, used by the service health check and the seed command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Registered devices.
    pub devices: u64,
    /// Stored calculations.
    pub calculations: u64,
    /// Categories.
    pub categories: u64,
}
