//! Error type shared by the thermal model and the rollout engine.

use thiserror::Error;

/// Errors raised by model construction and rollouts.
///
/// Every operation in this crate is pure and deterministic, so none of these
/// errors is transient: retrying with the same inputs fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A construction argument was outside its allowed domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A power schedule did not cover exactly one rollout horizon.
    #[error("schedule length mismatch: expected {expected} steps, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl SimError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}
