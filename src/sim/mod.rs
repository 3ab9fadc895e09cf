/// Monte Carlo batch sampling, evaluation and checksum reduction.
pub mod batch;
/// Post-hoc batch statistics.
pub mod report;
pub mod rollout;
/// Power schedules fed to rollouts.
pub mod schedule;
pub mod types;
