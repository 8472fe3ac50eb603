//! Catalog and consumption engine for household energy estimates.
//!
//! This crate holds the derived logic of homewatt: it merges built-in device
//! templates with user-registered devices into a browsable catalog, filters
//! that catalog, turns a selection of devices into energy and cost figures,
//! and rolls persisted calculations up into a trend history.
//!
//! # Features
//!
//! - **Device templates**: compiled-in appliance types with brands, models and wattage
//! - **Catalog aggregation**: templates and registered devices, namespaced by source
//! - **Catalog filtering**: search, category, wattage range, brand and schedule
//! - **Consumption calculation**: week-averaged daily kWh and 30-day cost projection
//! - **History rollup**: the ten most recent calculations and their trend series
//! - **Sessions**: explicit state for the devices selected for the next calculation
//!
//! Persistence is reached only through the [`DeviceStore`],
//! [`CalculationStore`] and [`CategoryStore`] traits. [`MockStore`] implements
//! them in memory.
//!
//! # Quick Start
//!
//! ```
//! use homewatt_core::{CalculationSession, FilterSpec, HistoryRollup, MockStore, build_catalog};
//!
//! # fn main() -> homewatt_core::Result<()> {
//! let store = MockStore::new();
//! let catalog = build_catalog(&[]);
//!
//! let kitchen = FilterSpec::new().category("kitchen").apply(&catalog);
//! assert_eq!(kitchen.len(), 2);
//!
//! let mut session = CalculationSession::with_rate(5.0)?;
//! session.select_model(&catalog, "default_tv", "Samsung", "QLED Q80T")?;
//! let id = session.devices()[0].id;
//! session.update_usage(id, 4.0, 7)?;
//!
//! let recorded = session.calculate(&store)?;
//! assert!((recorded.report.total_consumption - 0.6).abs() < 1e-9);
//! assert!((recorded.report.monthly_cost - 90.0).abs() < 1e-9);
//!
//! let history = HistoryRollup::new(&store).recent()?;
//! assert_eq!(history.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod calculator;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod history;
pub mod mock;
pub mod query;
pub mod session;
pub mod templates;
pub mod tips;
pub mod traits;

pub use calculator::{
    ConsumptionCalculator, ConsumptionReport, DeviceConsumption, RecordedCalculation, daily_kwh,
    monthly_cost, round2, verify_total,
};
pub use catalog::{
    CatalogBrand, CatalogEntry, CatalogModel, aggregate, build_catalog, fold_custom,
    strip_namespace,
};
pub use error::{Error, Result};
pub use filter::FilterSpec;
pub use history::{HISTORY_LIMIT, HistoryRollup, HistoryStats, SeriesOrder, TrendPoint};
pub use mock::MockStore;
pub use query::{DeviceQuery, DeviceSort, SortOrder};
pub use session::{CalculationSession, SessionDevice};
pub use templates::{DEVICE_TEMPLATES, DeviceTemplate, template};
pub use tips::{random_tip, tip_for_index};
pub use traits::{CalculationStore, CategoryStore, DeviceStore};

// Re-export from homewatt-types
pub use homewatt_types::{
    CalculationRecord, Category, CategoryRecord, DeviceRecord, DeviceSnapshot, DeviceUsage,
    NewCategory, NewDevice, ValidationError,
};
