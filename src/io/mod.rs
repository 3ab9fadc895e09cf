//! File output for batch results.

/// CSV export of rewards and trajectories.
pub mod export;
