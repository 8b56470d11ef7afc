//! `heatwatch`: heat-stress monitoring backend.
//!
//! Records indoor (internal) and outdoor (external) temperature/humidity
//! readings, derives an apparent temperature for each, and classifies them
//! against configurable risk thresholds.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): each
//! module exposes a small surface and this file is the gateway re-exporting
//! what siblings and the binary need.

pub mod apparent;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod schema;
pub mod simulator;
pub mod state;
pub mod store;
pub mod thresholds;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Observation, Reading, Source};
pub use state::AppContext;
