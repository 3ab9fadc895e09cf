//! Single-day rollout of a thermal model under a fixed power schedule.

use crate::error::SimError;
use crate::model::ThermalModel;

use super::schedule::PowerSchedule;
use super::types::{HORIZON, STEP_SECONDS, StepRecord, T_OUT};

/// Drives a [`ThermalModel`] across a fixed horizon and accumulates comfort reward.
///
/// The engine holds only timing and boundary conditions, so it is `Copy` and
/// can be shared freely between threads alongside the model. The default
/// engine steps 5 minutes at a time over one day with a 0 °C outdoor
/// temperature.
///
/// # Examples
///
/// ```
/// use tcl_sim::model::ThermalModel;
/// use tcl_sim::sim::rollout::RolloutEngine;
/// use tcl_sim::sim::schedule::PowerSchedule;
/// use tcl_sim::sim::types::HORIZON;
///
/// let tcl = ThermalModel::new(1200, 2100)?;
/// let engine = RolloutEngine::default();
/// let schedule = PowerSchedule::constant(HORIZON, false);
///
/// let reward = engine.run(&tcl, 20.0, &schedule)?;
/// assert!(reward < 0.0);
/// # Ok::<(), tcl_sim::SimError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloutEngine {
    step_seconds: i64,
    horizon: usize,
    outdoor_temp_c: f64,
}

impl RolloutEngine {
    /// Creates an engine covering `horizon_seconds` in steps of `step_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if the step is not strictly
    /// positive, does not divide the horizon evenly, or the outdoor
    /// temperature is not finite.
    pub fn new(
        step_seconds: i64,
        horizon_seconds: i64,
        outdoor_temp_c: f64,
    ) -> Result<Self, SimError> {
        if step_seconds < 1 {
            return Err(SimError::invalid(format!(
                "step length must be strictly positive, got {step_seconds} s"
            )));
        }
        if horizon_seconds < step_seconds || horizon_seconds % step_seconds != 0 {
            return Err(SimError::invalid(format!(
                "horizon of {horizon_seconds} s is not a whole number of {step_seconds} s steps"
            )));
        }
        if !outdoor_temp_c.is_finite() {
            return Err(SimError::invalid("outdoor temperature must be finite"));
        }
        Ok(Self {
            step_seconds,
            horizon: (horizon_seconds / step_seconds) as usize,
            outdoor_temp_c,
        })
    }

    pub fn step_seconds(&self) -> i64 {
        self.step_seconds
    }

    /// Number of steps per rollout.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn outdoor_temp_c(&self) -> f64 {
        self.outdoor_temp_c
    }

    /// Runs one rollout and returns the total comfort reward.
    ///
    /// The reward sums `horizon + 1` comfort scores: the starting temperature
    /// plus the temperature after every step, accumulated in step order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] if the schedule does not have
    /// exactly [`horizon`](Self::horizon) entries.
    pub fn run(
        &self,
        model: &ThermalModel,
        t_start: f64,
        schedule: &PowerSchedule,
    ) -> Result<f64, SimError> {
        self.check_length(schedule)?;

        let mut t_in = t_start;
        let mut reward = model.comfort_score(t_in);

        for &power in schedule.levels() {
            t_in = model.next_temperature(t_in, self.outdoor_temp_c, self.step_seconds, power);
            reward += model.comfort_score(t_in);
        }

        Ok(reward)
    }

    /// Runs one rollout and records every visited state.
    ///
    /// Returns `horizon + 1` records. The last record's cumulative reward is
    /// bit-for-bit the value [`run`](Self::run) returns for the same inputs.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] on a schedule of the wrong length.
    pub fn trajectory(
        &self,
        model: &ThermalModel,
        t_start: f64,
        schedule: &PowerSchedule,
    ) -> Result<Vec<StepRecord>, SimError> {
        self.check_length(schedule)?;

        let mut records = Vec::with_capacity(self.horizon + 1);
        let mut t_in = t_start;
        let score = model.comfort_score(t_in);
        let mut reward = score;
        records.push(StepRecord {
            step: 0,
            elapsed_seconds: 0,
            power: 0.0,
            temperature_c: t_in,
            comfort_score: score,
            cumulative_reward: reward,
        });

        for (k, &power) in schedule.levels().iter().enumerate() {
            t_in = model.next_temperature(t_in, self.outdoor_temp_c, self.step_seconds, power);
            let score = model.comfort_score(t_in);
            reward += score;
            records.push(StepRecord {
                step: k + 1,
                elapsed_seconds: (k as i64 + 1) * self.step_seconds,
                power,
                temperature_c: t_in,
                comfort_score: score,
                cumulative_reward: reward,
            });
        }

        Ok(records)
    }

    fn check_length(&self, schedule: &PowerSchedule) -> Result<(), SimError> {
        if schedule.len() != self.horizon {
            return Err(SimError::LengthMismatch {
                expected: self.horizon,
                actual: schedule.len(),
            });
        }
        Ok(())
    }
}

impl Default for RolloutEngine {
    fn default() -> Self {
        Self {
            step_seconds: STEP_SECONDS,
            horizon: HORIZON,
            outdoor_temp_c: T_OUT,
        }
    }
}
