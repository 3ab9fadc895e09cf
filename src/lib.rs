//! Monte Carlo comfort evaluation of a thermostatically controlled load.

/// Scenario configuration, presets and validation.
pub mod config;
pub mod error;
/// CSV export.
pub mod io;
pub mod model;
/// Benchmark line formatting.
pub mod reporting;
/// Rollout engine, schedules and batch aggregation.
pub mod sim;
pub mod telemetry;

pub use error::SimError;
