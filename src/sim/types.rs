//! Core rollout types: timing constants, trial inputs and trajectory records.

use std::fmt;

use super::schedule::PowerSchedule;

/// Length of one rollout step in seconds (5 minutes).
pub const STEP_SECONDS: i64 = 5 * 60;

/// Length of one simulated day in seconds.
pub const DAY_SECONDS: i64 = 24 * 60 * 60;

/// Number of steps in one rollout: one day at 5-minute resolution.
pub const HORIZON: usize = (DAY_SECONDS / STEP_SECONDS) as usize;

/// Fixed outdoor temperature during a rollout (°C).
pub const T_OUT: f64 = 0.0;

/// Inputs of a single Monte Carlo trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialInput {
    /// Indoor temperature at the start of the day (°C).
    pub t_start: f64,
    /// Heater activation for every step of the day.
    pub schedule: PowerSchedule,
}

/// One visited state of a recorded rollout.
///
/// Record 0 is the initial state; record `k` is the state after `k` steps,
/// reached by applying `power` over the preceding step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Step index (0 = initial state).
    pub step: usize,
    /// Simulated seconds since the start of the rollout.
    pub elapsed_seconds: i64,
    /// Heater level applied during the preceding step (0 for the initial state).
    pub power: f64,
    /// Indoor temperature (°C).
    pub temperature_c: f64,
    /// Comfort score of `temperature_c`.
    pub comfort_score: f64,
    /// Reward accumulated up to and including this record.
    pub cumulative_reward: f64,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "k={:>3} ({:>5.2}h) | power={:.3}  T_in={:>7.3} °C | score={:>8.4}  reward={:>10.4}",
            self.step,
            self.elapsed_seconds as f64 / 3600.0,
            self.power,
            self.temperature_c,
            self.comfort_score,
            self.cumulative_reward,
        )
    }
}
