//! HTTP REST API for household energy estimates.
//!
//! This crate provides a service that:
//! - Serves the device catalog (built-in templates plus registered devices)
//! - Computes consumption and cost, storing each calculation with its devices
//! - Exposes recent history and a trend series
//! - Manages registered devices and categories
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/catalog` - Filtered device catalog
//! - `POST /api/calculate` - Compute and store a calculation
//! - `GET /api/calculate` - All calculations, newest first
//! - `GET /api/calculate/export` - Calculation history as CSV
//! - `GET /api/historical-data` - Ten most recent calculations
//! - `GET /api/historical-data/series` - Trend points
//! - `GET|POST /api/devices`, `DELETE /api/devices/{id}` - Registered devices
//! - `GET|POST /api/categories` - Device categories
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/homewatt/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [storage]
//! path = "~/.local/share/homewatt/data.db"
//!
//! [pricing]
//! rate = 5.0
//!
//! [history]
//! chronological_series = true
//! ```

pub mod api;
pub mod config;
pub mod seed;
pub mod state;

pub use config::{
    Config, ConfigError, ConfigValidationError, HistoryConfig, PricingConfig, ServerConfig,
    StorageConfig,
};
pub use seed::{SeedSummary, seed};
pub use state::AppState;
