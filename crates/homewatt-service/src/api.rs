//! REST API endpoints for the homewatt-service.
//!
//! Every response uses the same envelope: `{"success": true, "data": ...}`
//! on success and `{"success": false, "error": ..., "details": ...}` on
//! failure, with `details` only present when there is more to say.
//!
//! # Concurrency and Lock Acquisition
//!
//! - **`state.config`** (RwLock): Read to pick up the default rate and
//!   series order.
//! - **`state.store`** (Mutex): Acquired for database operations and held
//!   only for the duration of the store call.
//!
//! When both are needed, `config` is read and released before `store` is
//! locked.
//!
//! # Example
//!
//! ```ignore
//! use homewatt_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info};

use homewatt_core::query::{DEFAULT_MAX_WATTS, DEFAULT_MIN_WATTS};
use homewatt_core::filter::optional_watts;
use homewatt_core::{
    CatalogEntry, ConsumptionCalculator, ConsumptionReport, DeviceQuery, DeviceSort, FilterSpec,
    HistoryRollup, SeriesOrder, SortOrder, TrendPoint, build_catalog, random_tip, verify_total,
};
use homewatt_store::CalculationQuery;
use homewatt_types::{
    CalculationRecord, CategoryRecord, DeviceRecord, DeviceUsage, NewCategory, NewDevice,
    ValidationError,
};

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        // Catalog
        .route("/api/catalog", get(get_catalog))
        // Calculations and history
        .route("/api/calculate", get(list_calculations).post(calculate))
        .route("/api/calculate/export", get(export_calculations))
        .route("/api/historical-data", get(historical_data))
        .route("/api/historical-data/series", get(historical_series))
        // Registered devices
        .route("/api/devices", get(list_devices).post(create_device))
        .route("/api/devices/{id}", delete(delete_device))
        // Categories
        .route("/api/categories", get(list_categories).post(create_category))
}

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<ApiResponse<HealthResponse>> {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

// ==========================================================================
// Catalog
// ==========================================================================

/// Aggregated catalog, filtered by `search`, `category`, `minWatts`,
/// `maxWatts`, `brand` and `schedule`.
async fn get_catalog(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterSpec>, QueryRejection>,
) -> ApiResult<Vec<CatalogEntry>> {
    let Query(filter) = query?;
    filter.validate()?;

    let records = {
        let store = state.store.lock().await;
        store.list_devices(&DeviceQuery::new().watts_between(0.0, f64::MAX))?
    };

    let catalog = build_catalog(&records);
    Ok(ApiResponse::ok(filter.apply(&catalog)))
}

// ==========================================================================
// Calculations
// ==========================================================================

/// Request body for `POST /api/calculate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub devices: Vec<DeviceUsage>,
    /// Total computed by the client, checked against the server's.
    #[serde(default)]
    pub total_consumption: Option<f64>,
    /// Rate override; the configured rate applies otherwise.
    #[serde(default)]
    pub rate: Option<f64>,
}

/// Data returned by `POST /api/calculate`.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub calculation: CalculationRecord,
    pub report: ConsumptionReport,
    pub tip: &'static str,
}

/// Compute, verify and persist a calculation.
async fn calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<CalculateResponse> {
    let Json(request) = payload?;

    let rate = match request.rate {
        Some(rate) => rate,
        None => state.default_rate().await,
    };
    let calculator = ConsumptionCalculator::new(rate)?;
    let snapshots = ConsumptionCalculator::snapshots(&request.devices)?;

    if let Some(supplied) = request.total_consumption {
        let computed = calculator.compute(&snapshots)?.total_consumption;
        verify_total(supplied, computed)?;
    }

    let recorded = {
        let store = state.store.lock().await;
        calculator.record(&*store, &snapshots)?
    };

    Ok(ApiResponse::ok(CalculateResponse {
        calculation: recorded.calculation,
        report: recorded.report,
        tip: random_tip(),
    }))
}

/// Every calculation, newest first.
async fn list_calculations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<CalculationRecord>> {
    let store = state.store.lock().await;
    let calculations = HistoryRollup::new(&*store).all()?;
    Ok(ApiResponse::ok(calculations))
}

/// Calculation history as CSV, one row per snapshot device.
async fn export_calculations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let mut csv = Vec::new();
    let rows = {
        let store = state.store.lock().await;
        store.export_calculations_csv(&mut csv, &CalculationQuery::new())?
    };
    info!(rows, "Served CSV export");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"calculations.csv\"",
            ),
        ],
        csv,
    ))
}

/// The ten most recent calculations, newest first.
async fn historical_data(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<CalculationRecord>> {
    let store = state.store.lock().await;
    let recent = HistoryRollup::new(&*store).recent()?;
    Ok(ApiResponse::ok(recent))
}

/// Query parameters for the trend series.
#[derive(Debug, Default, Deserialize)]
pub struct SeriesParams {
    /// `chronological` or `newest`.
    pub order: Option<String>,
}

/// Trend points for the recent history window.
async fn historical_series(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SeriesParams>, QueryRejection>,
) -> ApiResult<Vec<TrendPoint>> {
    let Query(params) = query?;
    let order = match params.order.as_deref() {
        Some(order) => order.parse::<SeriesOrder>()?,
        None => state.config.read().await.history.series_order(),
    };

    let store = state.store.lock().await;
    let series = HistoryRollup::new(&*store).series(order)?;
    Ok(ApiResponse::ok(series))
}

// ==========================================================================
// Devices
// ==========================================================================

/// Query parameters for listing registered devices.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListParams {
    pub search: Option<String>,
    /// Category value, `all` disables the filter.
    pub category: Option<String>,
    #[serde(default, deserialize_with = "optional_watts")]
    pub min_watts: Option<f64>,
    #[serde(default, deserialize_with = "optional_watts")]
    pub max_watts: Option<f64>,
    /// `name`, `type`, `brand`, `model`, `watts` or `createdAt`.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub order: Option<String>,
}

impl DeviceListParams {
    /// Convert to a validated [`DeviceQuery`].
    pub fn to_query(&self) -> Result<DeviceQuery, ValidationError> {
        let mut query = DeviceQuery::new().watts_between(
            self.min_watts.unwrap_or(DEFAULT_MIN_WATTS),
            self.max_watts.unwrap_or(DEFAULT_MAX_WATTS),
        );

        if let Some(search) = &self.search {
            query = query.search(search);
        }
        if let Some(category) = &self.category
            && !category.eq_ignore_ascii_case(homewatt_core::filter::ALL)
        {
            query = query.category(category);
        }

        let sort = match &self.sort {
            Some(sort) => sort.parse::<DeviceSort>()?,
            None => DeviceSort::default(),
        };
        let order = match &self.order {
            Some(order) => order.parse::<SortOrder>()?,
            None => SortOrder::default(),
        };
        query = query.sort_by(sort, order);

        query.validate()?;
        Ok(query)
    }
}

/// Data returned by `GET /api/devices`.
#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceRecord>,
    pub categories: Vec<CategoryRecord>,
}

/// Registered devices with the category list.
async fn list_devices(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DeviceListParams>, QueryRejection>,
) -> ApiResult<DeviceListResponse> {
    let Query(params) = query?;
    let query = params.to_query()?;

    let store = state.store.lock().await;
    let devices = store.list_devices(&query)?;
    let categories = store.list_categories()?;

    Ok(ApiResponse::ok(DeviceListResponse {
        devices,
        categories,
    }))
}

/// Register a device.
async fn create_device(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewDevice>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<DeviceRecord>>), AppError> {
    let Json(device) = payload?;

    let store = state.store.lock().await;
    let created = store.create_device(&device)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(created)))
}

/// Delete a device, returning the removed record.
///
/// # Errors
///
/// - [`AppError::NotFound`] if no device has this id.
async fn delete_device(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<DeviceRecord> {
    let Path(id) = id?;
    let store = state.store.lock().await;
    let deleted = store.delete_device(id)?;
    Ok(ApiResponse::ok(deleted))
}

// ==========================================================================
// Categories
// ==========================================================================

/// Categories ordered by label.
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<CategoryRecord>> {
    let store = state.store.lock().await;
    Ok(ApiResponse::ok(store.list_categories()?))
}

/// Create a category.
///
/// # Errors
///
/// - [`AppError::BadRequest`] if the value or label is blank.
/// - [`AppError::Conflict`] if the value is taken.
async fn create_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryRecord>>), AppError> {
    let Json(category) = payload?;

    let store = state.store.lock().await;
    let created = store.create_category(&category)?;

    Ok((StatusCode::CREATED, ApiResponse::ok(created)))
}

// ==========================================================================
// Errors
// ==========================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Store(homewatt_store::Error),
    Internal(String),
}

impl From<homewatt_store::Error> for AppError {
    fn from(e: homewatt_store::Error) -> Self {
        match e {
            homewatt_store::Error::Validation(e) => AppError::BadRequest(e.to_string()),
            homewatt_store::Error::DeviceNotFound(_) => AppError::NotFound(e.to_string()),
            homewatt_store::Error::CategoryExists(_) => AppError::Conflict(e.to_string()),
            other => AppError::Store(other),
        }
    }
}

impl From<homewatt_core::Error> for AppError {
    fn from(e: homewatt_core::Error) -> Self {
        match e {
            homewatt_core::Error::NotFound { .. } => AppError::NotFound(e.to_string()),
            homewatt_core::Error::Conflict(_) => AppError::Conflict(e.to_string()),
            e if e.is_client_error() => AppError::BadRequest(e.to_string()),
            e => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, details) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(e.to_string()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(msg),
            ),
        };

        if status.is_server_error() {
            error!(details = details.as_deref().unwrap_or_default(), "Request failed");
        }

        let body = ErrorBody {
            success: false,
            error,
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use time::Duration;
    use time::macros::datetime;
    use tower::ServiceExt;

    use crate::config::Config;

    fn create_test_state() -> Arc<AppState> {
        let store = homewatt_store::Store::open_in_memory().unwrap();
        AppState::new(store, Config::default())
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> axum::response::Response {
        router()
            .with_state(Arc::clone(state))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn send(
        state: &Arc<AppState>,
        method: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> axum::response::Response {
        router()
            .with_state(Arc::clone(state))
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn tv_body() -> serde_json::Value {
        serde_json::json!({
            "devices": [{
                "type": "tv",
                "brand": "Samsung",
                "model": "QLED Q80T",
                "watts": 150,
                "hoursPerDay": 4,
                "daysPerWeek": 7
            }],
            "totalConsumption": 0.6
        })
    }

    async fn seed_history(state: &Arc<AppState>, count: i64) {
        let store = state.store.lock().await;
        let start = datetime!(2024-03-01 08:00 UTC);
        let device = DeviceUsage::new("tv", "LG", "OLED C1", 100.0).snapshot();
        for i in 0..count {
            let created_at = start + Duration::days(i);
            store
                .create_calculation_at((i + 1) as f64, &[device.clone()], created_at)
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state();
        let response = get(&state, "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
        assert!(json["data"]["version"].is_string());
        assert!(json["data"]["timestamp"].is_string());
    }

    // ==================== Catalog ====================

    #[tokio::test]
    async fn test_catalog_lists_templates() {
        let state = create_test_state();
        let json = response_json(get(&state, "/api/catalog").await).await;
        let entries = json["data"].as_array().unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0]["key"], "default_tv");
        assert_eq!(entries[0]["isDefault"], true);
    }

    #[tokio::test]
    async fn test_catalog_includes_registered_devices() {
        let state = create_test_state();
        let device = serde_json::json!({
            "type": "coffeeMaker",
            "brand": "Nespresso",
            "model": "Vertuo",
            "watts": 1350,
            "category": "kitchen"
        });
        let response = send(&state, "POST", "/api/devices", device).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(get(&state, "/api/catalog?category=kitchen").await).await;
        let keys: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["key"].as_str().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec!["default_refrigerator", "default_microwave", "custom_coffeeMaker"]
        );
    }

    #[tokio::test]
    async fn test_catalog_rejects_inverted_range() {
        let state = create_test_state();
        let response = get(&state, "/api/catalog?minWatts=500&maxWatts=100").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_catalog_blank_watt_bounds() {
        let state = create_test_state();
        let response = get(&state, "/api/catalog?minWatts=&maxWatts=&category=all").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_catalog_malformed_query_uses_envelope() {
        let state = create_test_state();
        let response = get(&state, "/api/catalog?maxWatts=plenty").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("plenty"));
    }

    // ==================== Calculate ====================

    #[tokio::test]
    async fn test_calculate_success() {
        let state = create_test_state();
        let response = send(&state, "POST", "/api/calculate", tv_body()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["success"], true);
        let data = &json["data"];
        let total = data["calculation"]["totalConsumption"].as_f64().unwrap();
        assert!((total - 0.6).abs() < 1e-9);
        let cost = data["report"]["monthlyCost"].as_f64().unwrap();
        assert!((cost - 90.0).abs() < 1e-9);
        assert_eq!(data["calculation"]["devices"][0]["name"], "Samsung QLED Q80T");
        assert!(data["tip"].is_string());
    }

    #[tokio::test]
    async fn test_calculate_uses_rate_override() {
        let state = create_test_state();
        let mut body = tv_body();
        body["rate"] = serde_json::json!(2.0);

        let json = response_json(send(&state, "POST", "/api/calculate", body).await).await;
        let cost = json["data"]["report"]["monthlyCost"].as_f64().unwrap();
        assert!((cost - 36.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_calculate_uses_configured_rate() {
        let state = create_test_state();
        state.config.write().await.pricing.rate = 1.0;

        let json = response_json(send(&state, "POST", "/api/calculate", tv_body()).await).await;
        assert_eq!(json["data"]["report"]["rate"], 1.0);
    }

    #[tokio::test]
    async fn test_calculate_rejects_bad_input() {
        let state = create_test_state();

        let mut mismatch = tv_body();
        mismatch["totalConsumption"] = serde_json::json!(5.0);
        let empty = serde_json::json!({ "devices": [], "totalConsumption": 1.0 });
        let missing_devices = serde_json::json!({ "totalConsumption": 1.0 });
        let negative_watts = serde_json::json!({
            "devices": [{ "type": "tv", "brand": "LG", "model": "C1", "watts": -1 }]
        });
        let bad_hours = serde_json::json!({
            "devices": [{
                "type": "tv", "brand": "LG", "model": "C1", "watts": 100, "hoursPerDay": 25
            }]
        });

        for body in [mismatch, empty, missing_devices, negative_watts, bad_hours] {
            let response = send(&state, "POST", "/api/calculate", body.clone()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            let json = response_json(response).await;
            assert_eq!(json["success"], false);
        }

        let stats = state.store.lock().await.stats().unwrap();
        assert_eq!(stats.calculations, 0);
    }

    #[tokio::test]
    async fn test_calculate_invalid_json() {
        let state = create_test_state();
        let response = router()
            .with_state(Arc::clone(&state))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/calculate")
                    .header("content-type", "application/json")
                    .body(Body::from("{ invalid json }"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_calculations_newest_first() {
        let state = create_test_state();
        seed_history(&state, 12).await;

        let json = response_json(get(&state, "/api/calculate").await).await;
        let calculations = json["data"].as_array().unwrap();
        assert_eq!(calculations.len(), 12);
        assert_eq!(calculations[0]["totalConsumption"], 12.0);
    }

    #[tokio::test]
    async fn test_export_csv() {
        let state = create_test_state();
        send(&state, "POST", "/api/calculate", tv_body()).await;

        let response = get(&state, "/api/calculate/export").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/csv"));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("QLED Q80T"));
    }

    // ==================== History ====================

    #[tokio::test]
    async fn test_historical_data_returns_ten_newest() {
        let state = create_test_state();
        seed_history(&state, 11).await;

        let json = response_json(get(&state, "/api/historical-data").await).await;
        let records = json["data"].as_array().unwrap();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0]["totalConsumption"], 11.0);
        assert_eq!(records[9]["totalConsumption"], 2.0);
        assert_eq!(records[0]["devices"][0]["model"], "OLED C1");
    }

    #[tokio::test]
    async fn test_historical_series_ordering() {
        let state = create_test_state();
        seed_history(&state, 3).await;

        let json = response_json(get(&state, "/api/historical-data/series").await).await;
        let values: Vec<f64> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["consumption"].as_f64().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);

        let json =
            response_json(get(&state, "/api/historical-data/series?order=newest").await).await;
        assert_eq!(json["data"][0]["consumption"], 3.0);

        let response = get(&state, "/api/historical-data/series?order=sideways").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Unknown order 'sideways'"));
    }

    #[tokio::test]
    async fn test_historical_series_config_default() {
        let state = create_test_state();
        state.config.write().await.history.chronological_series = false;
        seed_history(&state, 2).await;

        let json = response_json(get(&state, "/api/historical-data/series").await).await;
        assert_eq!(json["data"][0]["consumption"], 2.0);
    }

    // ==================== Devices ====================

    #[tokio::test]
    async fn test_device_lifecycle() {
        let state = create_test_state();
        let body = serde_json::json!({
            "type": "heater",
            "brand": "Dyson",
            "model": "Hot+Cool",
            "watts": 2000,
            "hoursPerDay": 2,
            "label": "Bedroom heater",
            "specifications": { "mode": "fan" }
        });

        let response = send(&state, "POST", "/api/devices", body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = response_json(response).await;
        let id = created["data"]["id"].as_i64().unwrap();
        assert_eq!(created["data"]["daysPerWeek"], 7);

        let json = response_json(get(&state, "/api/devices?search=bedroom").await).await;
        assert_eq!(json["data"]["devices"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"]["categories"].as_array().unwrap().len(), 6);

        let uri = format!("/api/devices/{id}");
        let response = send(&state, "DELETE", &uri, serde_json::Value::Null).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await["data"]["model"], "Hot+Cool");

        let response = send(&state, "DELETE", &uri, serde_json::Value::Null).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_create_device_validation() {
        let state = create_test_state();
        let zero_watts = serde_json::json!({
            "type": "tv", "brand": "LG", "model": "C1", "watts": 0
        });
        let response = send(&state, "POST", "/api/devices", zero_watts).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let missing_brand = serde_json::json!({ "type": "tv", "model": "C1", "watts": 100 });
        let response = send(&state, "POST", "/api/devices", missing_brand).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_devices_sorting_and_params() {
        let state = create_test_state();
        for (model, watts) in [("A", 300), ("B", 100), ("C", 200)] {
            let body = serde_json::json!({
                "type": "lamp", "brand": "IKEA", "model": model, "watts": watts
            });
            send(&state, "POST", "/api/devices", body).await;
        }

        let json = response_json(get(&state, "/api/devices?sort=watts&order=desc").await).await;
        let models: Vec<&str> = json["data"]["devices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["model"].as_str().unwrap())
            .collect();
        assert_eq!(models, vec!["A", "C", "B"]);

        let json =
            response_json(get(&state, "/api/devices?minWatts=150&maxWatts=250").await).await;
        assert_eq!(json["data"]["devices"].as_array().unwrap().len(), 1);

        let response = get(&state, "/api/devices?sort=colour").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_devices_blank_watt_bounds() {
        let state = create_test_state();
        let body = serde_json::json!({
            "type": "lamp", "brand": "IKEA", "model": "Tertial", "watts": 40
        });
        send(&state, "POST", "/api/devices", body).await;

        let response = get(&state, "/api/devices?minWatts=&maxWatts=").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"]["devices"].as_array().unwrap().len(), 1);

        let response = get(&state, "/api/devices?minWatts=lots").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete_device_invalid_id() {
        let state = create_test_state();
        let response = send(&state, "DELETE", "/api/devices/abc", serde_json::Value::Null).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].is_string());
    }

    // ==================== Categories ====================

    #[tokio::test]
    async fn test_categories() {
        let state = create_test_state();
        let garden = serde_json::json!({ "value": "garden", "label": "Garden" });

        let response = send(&state, "POST", "/api/categories", garden.clone()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&state, "POST", "/api/categories", garden).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let blank = serde_json::json!({ "value": "", "label": "Nothing" });
        let response = send(&state, "POST", "/api/categories", blank).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(get(&state, "/api/categories").await).await;
        let labels: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["label"].as_str().unwrap())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
        assert!(labels.contains(&"Garden"));
    }

    // ==================== Errors ====================

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = homewatt_store::Error::DeviceNotFound(3).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = homewatt_core::Error::UnknownTemplate("toaster".into()).into();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err: AppError = homewatt_core::Error::persistence("disk full").into();
        assert!(matches!(err, AppError::Internal(_)));

        let err: AppError = homewatt_store::Error::InvalidTimestamp("bad".into()).into();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn test_internal_error_envelope() {
        let response = AppError::Internal("disk full".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = response_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["details"], "disk full");
    }
}
