//! Local persistence for homewatt devices, categories and calculations.
//!
//! This crate provides SQLite-based storage behind the store traits of
//! homewatt-core, so the catalog, calculator and history rollup run
//! unchanged against a database file.
//!
//! # Features
//!
//! - Register, list and delete devices with search, range and sort
//! - Built-in categories seeded on first open
//! - Calculations written atomically with frozen device snapshots
//! - History queries by time range, with pagination
//! - CSV export of calculation history
//!
//! # Example
//!
//! ```no_run
//! use homewatt_store::{CalculationQuery, Store};
//!
//! let store = Store::open_default()?;
//!
//! // Ten most recent calculations
//! let query = CalculationQuery::new().limit(10);
//! let calculations = store.query_calculations(&query)?;
//! # Ok::<(), homewatt_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{CalculationCsvRow, StoreStats};
pub use queries::CalculationQuery;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/homewatt/data.db`
/// - macOS: `~/Library/Application Support/homewatt/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\homewatt\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("homewatt")
        .join("data.db")
}
