//! # restodash - restaurant dataset dashboard backend
//!
//! Loads a restaurant dataset, left-joins it with a country lookup and
//! serves ten canned aggregation views as small tables plus chart hints.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ restaurants  │────▶│   Parser    │────▶│    Prepare    │────▶│      Views       │
//! │ countries    │     │ (auto-enc)  │     │ (left join)   │     │ (10 recipes)     │
//! └──────────────┘     └─────────────┘     └───────────────┘     └──────────────────┘
//!                                                                  │ CLI / HTTP API
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restodash::{aggregate, load_table, DataSources, ViewId};
//!
//! let table = load_table(&DataSources {
//!     restaurants: "data/zomato.csv".into(),
//!     countries: "data/country_codes.csv".into(),
//! })?;
//! let result = aggregate(&table, ViewId::CityAverageCost);
//! for row in result.records() {
//!     println!("{}", row);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Load errors and the empty-result warning
//! - [`models`] - Restaurant records, country lookup, enriched table
//! - [`parser`] - CSV reading with encoding detection
//! - [`prepare`] - Loading and the country join
//! - [`views`] - View identifiers and aggregation recipes
//! - [`dashboard`] - Shared table handle used by the binary and the API
//! - [`config`] - Paths and port from env and flags
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod parser;
pub mod prepare;

// Aggregation
pub mod views;

// Host
pub mod config;
pub mod dashboard;
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{EmptyResultWarning, LoadError, ServerError, ViewParseError};

pub use models::{CountryLookup, EnrichedRow, EnrichedTable, JoinSummary, RestaurantRecord};

pub use prepare::{
    load_countries_bytes, load_countries_file, load_restaurants_bytes, load_restaurants_file,
    load_table, prepare, DataSources, LoadedRestaurants,
};

pub use views::{
    aggregate, AggregationResult, ChartKind, MarkerPoint, Metric, RenderHints, ResultRow, ViewId,
};

pub use config::Config;
pub use dashboard::Dashboard;

pub use api::types::{view_list, ViewResponse, ViewSummary};

// Server
pub mod server {
    pub use crate::api::server::{router, serve, start_server};
}
