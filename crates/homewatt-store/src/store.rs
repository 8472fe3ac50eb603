//! Main store implementation.

use std::io::Write;
use std::path::Path;

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use time::OffsetDateTime;
use tracing::{debug, info};

use homewatt_core::{CalculationStore, CategoryStore, DeviceQuery, DeviceStore};
use homewatt_types::{
    CalculationRecord, CategoryRecord, DeviceRecord, DeviceSnapshot, NewCategory, NewDevice,
    ValidationError,
};

use crate::error::{Error, Result};
use crate::models::{self, CalculationCsvRow, StoreStats};
use crate::queries::{self, CalculationQuery, DEVICE_COLUMNS};
use crate::schema;

/// SQLite-based store for devices, categories and calculations.
pub struct Store {
    conn: Connection,
}

/// Current time truncated to whole seconds, matching column precision.
fn now_seconds() -> Result<OffsetDateTime> {
    let secs = OffsetDateTime::now_utc().unix_timestamp();
    OffsetDateTime::from_unix_timestamp(secs).map_err(|e| Error::InvalidTimestamp(e.to_string()))
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Row counts per table.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as u64)
        };
        Ok(StoreStats {
            devices: count("devices")?,
            calculations: count("calculations")?,
            categories: count("categories")?,
        })
    }
}

// Device operations
impl Store {
    /// Register a device.
    pub fn create_device(&self, device: &NewDevice) -> Result<DeviceRecord> {
        device.validate()?;

        let specifications = serde_json::to_string(&device.specifications)?;
        let created_at = now_seconds()?;

        self.conn.execute(
            "INSERT INTO devices (type, brand, model, watts, hours_per_day, days_per_week,
             label, category, description, specifications, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                device.device_type,
                device.brand,
                device.model,
                device.watts,
                device.hours_per_day(),
                device.days_per_week(),
                device.label,
                device.category,
                device.description,
                specifications,
                created_at.unix_timestamp(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        info!(
            id,
            device_type = %device.device_type,
            "Registered device {} {}",
            device.brand,
            device.model
        );

        self.get_device(id)?.ok_or(Error::DeviceNotFound(id))
    }

    /// Get a device by ID.
    pub fn get_device(&self, id: i64) -> Result<Option<DeviceRecord>> {
        let sql = format!("SELECT {DEVICE_COLUMNS} FROM devices WHERE id = ?");
        let device = self
            .conn
            .query_row(&sql, [id], models::device_from_row)
            .optional()?;
        Ok(device)
    }

    /// List devices matching a query.
    pub fn list_devices(&self, query: &DeviceQuery) -> Result<Vec<DeviceRecord>> {
        query.validate()?;
        let (sql, params) = queries::device_sql(query);

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let devices = stmt
            .query_map(params_ref.as_slice(), models::device_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(devices)
    }

    /// Delete a device, returning the removed record.
    ///
    /// Past calculations keep their snapshots.
    pub fn delete_device(&self, id: i64) -> Result<DeviceRecord> {
        let device = self.get_device(id)?.ok_or(Error::DeviceNotFound(id))?;
        self.conn.execute("DELETE FROM devices WHERE id = ?", [id])?;
        info!(id, "Deleted device {}", device.display_name());
        Ok(device)
    }
}

// Category operations
impl Store {
    /// Create a category.
    pub fn create_category(&self, category: &NewCategory) -> Result<CategoryRecord> {
        category.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO categories (value, label) VALUES (?1, ?2)",
            params![category.value, category.label],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Err(Error::CategoryExists(category.value.clone()));
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        info!(id, value = %category.value, "Created category");

        Ok(CategoryRecord {
            id,
            value: category.value.clone(),
            label: category.label.clone(),
        })
    }

    /// List categories ordered by label.
    pub fn list_categories(&self) -> Result<Vec<CategoryRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, value, label FROM categories ORDER BY label ASC, id ASC")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(CategoryRecord {
                    id: row.get(0)?,
                    value: row.get(1)?,
                    label: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }
}

// Calculation operations
impl Store {
    /// Store a calculation and its device snapshots in one transaction.
    pub fn create_calculation(
        &self,
        total_consumption: f64,
        devices: &[DeviceSnapshot],
    ) -> Result<CalculationRecord> {
        self.create_calculation_at(total_consumption, devices, now_seconds()?)
    }

    /// Store a calculation with an explicit creation time.
    pub fn create_calculation_at(
        &self,
        total_consumption: f64,
        devices: &[DeviceSnapshot],
        created_at: OffsetDateTime,
    ) -> Result<CalculationRecord> {
        if devices.is_empty() {
            return Err(ValidationError::EmptyDeviceList.into());
        }
        if !total_consumption.is_finite() || total_consumption <= 0.0 {
            return Err(ValidationError::InvalidTotal(total_consumption).into());
        }

        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO calculations (total_consumption, created_at) VALUES (?1, ?2)",
            params![total_consumption, created_at.unix_timestamp()],
        )?;
        let id = tx.last_insert_rowid();

        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO calculation_devices (calculation_id, position, type, brand, model,
                 watts, hours_per_day, days_per_week, name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, d) in devices.iter().enumerate() {
                stored += stmt.execute(params![
                    id,
                    position as i64,
                    d.device_type,
                    d.brand,
                    d.model,
                    d.watts,
                    d.hours_per_day,
                    d.days_per_week,
                    d.name,
                ])?;
            }
        }

        if stored != devices.len() {
            // Dropping the transaction rolls it back.
            return Err(Error::IncompleteCalculation {
                id,
                stored,
                expected: devices.len(),
            });
        }

        tx.commit()?;
        debug!(id, devices = stored, "Stored calculation");

        Ok(CalculationRecord {
            id,
            total_consumption,
            created_at: OffsetDateTime::from_unix_timestamp(created_at.unix_timestamp())
                .map_err(|e| Error::InvalidTimestamp(e.to_string()))?,
            devices: devices.to_vec(),
        })
    }

    fn calculation_devices(&self, calculation_id: i64) -> Result<Vec<DeviceSnapshot>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT type, brand, model, watts, hours_per_day, days_per_week, name
             FROM calculation_devices WHERE calculation_id = ? ORDER BY position",
        )?;
        let devices = stmt
            .query_map([calculation_id], models::snapshot_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(devices)
    }

    /// Query calculations with their snapshots.
    pub fn query_calculations(&self, query: &CalculationQuery) -> Result<Vec<CalculationRecord>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let headers = stmt
            .query_map(params_ref.as_slice(), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?, models::timestamp(row, 2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|(id, total_consumption, created_at)| {
                Ok(CalculationRecord {
                    id,
                    total_consumption,
                    created_at,
                    devices: self.calculation_devices(id)?,
                })
            })
            .collect()
    }

    /// Write calculations as CSV, one row per snapshot device.
    ///
    /// Returns the number of rows written, excluding the header.
    pub fn export_calculations_csv<W: Write>(
        &self,
        writer: W,
        query: &CalculationQuery,
    ) -> Result<usize> {
        let calculations = self.query_calculations(query)?;
        let mut wtr = csv::Writer::from_writer(writer);
        let mut rows = 0;

        for calculation in &calculations {
            for row in CalculationCsvRow::from_calculation(calculation) {
                wtr.serialize(row)?;
                rows += 1;
            }
        }
        wtr.flush()?;

        info!(calculations = calculations.len(), rows, "Exported calculations to CSV");
        Ok(rows)
    }
}

impl DeviceStore for Store {
    fn create_device(&self, device: &NewDevice) -> homewatt_core::Result<DeviceRecord> {
        Ok(Store::create_device(self, device)?)
    }

    fn list_devices(&self, query: &DeviceQuery) -> homewatt_core::Result<Vec<DeviceRecord>> {
        Ok(Store::list_devices(self, query)?)
    }

    fn delete_device(&self, id: i64) -> homewatt_core::Result<DeviceRecord> {
        Ok(Store::delete_device(self, id)?)
    }
}

impl CalculationStore for Store {
    fn create_calculation(
        &self,
        total_consumption: f64,
        devices: &[DeviceSnapshot],
    ) -> homewatt_core::Result<CalculationRecord> {
        Ok(Store::create_calculation(self, total_consumption, devices)?)
    }

    fn list_calculations(
        &self,
        limit: Option<u32>,
        newest_first: bool,
    ) -> homewatt_core::Result<Vec<CalculationRecord>> {
        let mut query = CalculationQuery::new();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        if !newest_first {
            query = query.oldest_first();
        }
        Ok(self.query_calculations(&query)?)
    }
}

impl CategoryStore for Store {
    fn create_category(&self, category: &NewCategory) -> homewatt_core::Result<CategoryRecord> {
        Ok(Store::create_category(self, category)?)
    }

    fn list_categories(&self) -> homewatt_core::Result<Vec<CategoryRecord>> {
        Ok(Store::list_categories(self)?)
    }
}
