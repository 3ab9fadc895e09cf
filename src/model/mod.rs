//! First-order thermal model of a thermostatically controlled load.

/// Comfort band and discomfort scoring.
pub mod comfort;
/// Parameter fitting and the per-step temperature update.
pub mod thermal;

pub use comfort::ComfortBand;
pub use thermal::ThermalModel;
