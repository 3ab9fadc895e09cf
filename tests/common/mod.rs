//! Shared test fixtures for integration tests.

use tcl_sim::model::ThermalModel;
use tcl_sim::sim::batch::BatchRunner;
use tcl_sim::sim::rollout::RolloutEngine;

/// Seed used by the reference benchmark.
pub const REFERENCE_SEED: u64 = 74_329_834_795;

/// Reference TCL: 20 minutes to heat, 35 minutes to cool.
pub fn reference_model() -> ThermalModel {
    ThermalModel::new(20 * 60, 35 * 60).expect("reference model should build")
}

/// Sequential runner over one day at 5-minute steps with the reference sampler.
pub fn reference_runner() -> BatchRunner {
    BatchRunner::new(reference_model(), RolloutEngine::default())
}
