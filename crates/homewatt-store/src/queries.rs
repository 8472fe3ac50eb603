//! Query builders and SQL generation.
//!
//! [`CalculationQuery`] is a fluent builder for calculation history. Device
//! listings reuse [`DeviceQuery`] from homewatt-core and are translated to
//! SQL here. Sort keys map to a fixed set of column expressions and every
//! user-supplied value is bound as a parameter.
//!
//! # Example
//!
//! ```
//! use homewatt_store::{CalculationQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let last_week = OffsetDateTime::now_utc() - Duration::days(7);
//!
//! let query = CalculationQuery::new().since(last_week).limit(10);
//! let calculations = store.query_calculations(&query)?;
//! assert!(calculations.is_empty());
//! # Ok::<(), homewatt_store::Error>(())
//! ```

use time::OffsetDateTime;

use homewatt_core::{DeviceQuery, DeviceSort, SortOrder};

/// Columns selected for a device row, in [`crate::models`] mapping order.
pub(crate) const DEVICE_COLUMNS: &str = "id, type, brand, model, watts, hours_per_day, \
     days_per_week, label, category, description, specifications, created_at";

/// SQL expression matching `DeviceRecord::display_name`.
const NAME_EXPR: &str = "COALESCE(NULLIF(TRIM(label), ''), brand || ' ' || model)";

/// Fluent query builder for calculation history.
///
/// By default, queries return results ordered by `created_at` descending
/// (newest first), ties broken by id in the same direction.
#[derive(Debug, Default, Clone)]
pub struct CalculationQuery {
    /// Include only calculations at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Include only calculations at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by created_at descending (newest first).
    pub newest_first: bool,
}

impl CalculationQuery {
    /// Create a new query: no filters, no limit, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter to calculations created at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to calculations created at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first N results.
    ///
    /// Use with `limit()` for pagination.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results oldest first.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL WHERE clause and parameters.
    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(since) = self.since {
            conditions.push("created_at >= ?");
            params.push(Box::new(since.unix_timestamp()));
        }

        if let Some(until) = self.until {
            conditions.push("created_at <= ?");
            params.push(Box::new(until.unix_timestamp()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, total_consumption, created_at FROM calculations {} \
             ORDER BY created_at {order}, id {order}",
            where_clause
        );

        // SQLite only accepts OFFSET after a LIMIT.
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        sql
    }
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn sort_expr(sort: DeviceSort) -> &'static str {
    match sort {
        DeviceSort::Name => NAME_EXPR,
        DeviceSort::Type => "type",
        DeviceSort::Brand => "brand",
        DeviceSort::Model => "model",
        DeviceSort::Watts => "watts",
        DeviceSort::CreatedAt => "created_at",
    }
}

/// Build the SQL and parameters for a device listing.
pub(crate) fn device_sql(query: &DeviceQuery) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut conditions = vec!["watts >= ?".to_string(), "watts <= ?".to_string()];
    let mut params: Vec<Box<dyn rusqlite::ToSql>> =
        vec![Box::new(query.min_watts), Box::new(query.max_watts)];

    if let Some(ref category) = query.category {
        conditions.push("category = ?".to_string());
        params.push(Box::new(category.clone()));
    }

    if let Some(ref search) = query.search {
        let fields = [NAME_EXPR, "brand", "model", "type"];
        let clause = fields
            .iter()
            .map(|f| format!("LOWER({f}) LIKE ? ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        conditions.push(format!("({clause})"));
        let pattern = like_pattern(search);
        for _ in fields {
            params.push(Box::new(pattern.clone()));
        }
    }

    let order = match query.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    let sql = format!(
        "SELECT {DEVICE_COLUMNS} FROM devices WHERE {} ORDER BY {} {order}, id {order}",
        conditions.join(" AND "),
        sort_expr(query.sort),
    );

    (sql, params)
}
