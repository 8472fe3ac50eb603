//! Collaborator contracts for persistence.
//!
//! The core never talks to a database directly. It reaches device,
//! calculation and category storage through these traits, which are
//! implemented by the SQLite store (homewatt-store) and by
//! [`MockStore`](crate::MockStore) for tests.
//!
//! Every call is one synchronous unit of work. Implementations are free to
//! use interior mutability; the core never holds a borrow across calls.

use homewatt_types::{
    CalculationRecord, CategoryRecord, DeviceRecord, DeviceSnapshot, NewCategory, NewDevice,
};

use crate::error::Result;
use crate::query::DeviceQuery;

/// Storage for user-registered devices.
///
/// # Example
///
/// ```ignore
/// use homewatt_core::{DeviceQuery, DeviceStore, Result};
///
/// fn count_kitchen_devices<S: DeviceStore>(store: &S) -> Result<usize> {
///     let query = DeviceQuery::new().category("kitchen");
///     Ok(store.list_devices(&query)?.len())
/// }
/// ```
pub trait DeviceStore {
    /// Persist a validated registration request.
    fn create_device(&self, device: &NewDevice) -> Result<DeviceRecord>;

    /// List devices matching the query.
    fn list_devices(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>>;

    /// Delete a device by id, returning the removed record.
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) when no device has
    /// this id.
    fn delete_device(&self, id: i64) -> Result<DeviceRecord>;
}

/// Storage for calculation results.
pub trait CalculationStore {
    /// Persist a calculation and all of its snapshots as one unit.
    ///
    /// Implementations must either create the record and every snapshot, or
    /// nothing at all.
    fn create_calculation(
        &self,
        total_consumption: f64,
        devices: &[DeviceSnapshot],
    ) -> Result<CalculationRecord>;

    /// List calculations ordered by creation time.
    ///
    /// `newest_first` selects descending order. Ties on creation time are
    /// broken by id in the same direction.
    fn list_calculations(
        &self,
        limit: Option<u32>,
        newest_first: bool,
    ) -> Result<Vec<CalculationRecord>>;
}

/// Storage for device categories.
pub trait CategoryStore {
    /// Create a category. Duplicate values are reported as
    /// [`Error::Conflict`](crate::Error::Conflict).
    fn create_category(&self, category: &NewCategory) -> Result<CategoryRecord>;

    /// List all categories ordered by label ascending.
    fn list_categories(&self) -> Result<Vec<CategoryRecord>>;
}
