//! Monte Carlo batches: trial sampling, evaluation and checksum reduction.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::SimError;
use crate::model::ThermalModel;

use super::rollout::RolloutEngine;
use super::schedule::PowerSchedule;
use super::types::{HORIZON, TrialInput};

/// Maximum number of trial inputs held in memory at once.
pub const CHUNK_TRIALS: usize = 1024;

/// How a batch evaluates its trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One trial after another on the calling thread.
    #[default]
    Sequential,
    /// Trials of each chunk spread over the rayon thread pool.
    Parallel,
}

impl ExecutionMode {
    /// Every mode, in reporting order.
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::Sequential, ExecutionMode::Parallel];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(ExecutionMode::Sequential),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(format!(
                "unknown execution mode \"{other}\", expected \"sequential\" or \"parallel\""
            )),
        }
    }
}

/// Draws random trial inputs: a Bernoulli on/off schedule and a uniform
/// starting temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSampler {
    horizon: usize,
    t_start_min_c: f64,
    t_start_max_c: f64,
    on_probability: f64,
}

impl TrialSampler {
    /// Creates a sampler producing `horizon`-step schedules.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if the temperature range is
    /// empty or not finite, or `on_probability` is outside `[0, 1]`.
    pub fn new(
        horizon: usize,
        t_start_min_c: f64,
        t_start_max_c: f64,
        on_probability: f64,
    ) -> Result<Self, SimError> {
        if !t_start_min_c.is_finite() || !t_start_max_c.is_finite() {
            return Err(SimError::invalid("start temperature range must be finite"));
        }
        if t_start_min_c >= t_start_max_c {
            return Err(SimError::invalid(format!(
                "start temperature range [{t_start_min_c}, {t_start_max_c}) is empty"
            )));
        }
        if !(0.0..=1.0).contains(&on_probability) {
            return Err(SimError::invalid(format!(
                "on probability must be in [0, 1], got {on_probability}"
            )));
        }
        Ok(Self {
            horizon,
            t_start_min_c,
            t_start_max_c,
            on_probability,
        })
    }

    /// Reference sampler for a given horizon: start in `[18, 20)` °C, heater
    /// on half of the time.
    pub fn for_horizon(horizon: usize) -> Self {
        Self {
            horizon,
            t_start_min_c: 18.0,
            t_start_max_c: 20.0,
            on_probability: 0.5,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Samples one trial. The schedule is drawn before the start temperature.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TrialInput {
        let schedule = PowerSchedule::sample(rng, self.horizon, self.on_probability);
        let t_start =
            self.t_start_min_c + (self.t_start_max_c - self.t_start_min_c) * rng.random::<f64>();
        TrialInput { t_start, schedule }
    }
}

impl Default for TrialSampler {
    fn default() -> Self {
        Self::for_horizon(HORIZON)
    }
}

/// Runs many independent rollouts of one shared model.
///
/// Trial inputs are always drawn sequentially from the caller's RNG, so a
/// given seed yields the same trials in every mode. Only the evaluation of
/// the rollouts is spread over threads in [`ExecutionMode::Parallel`].
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    model: ThermalModel,
    engine: RolloutEngine,
    sampler: TrialSampler,
    mode: ExecutionMode,
}

impl BatchRunner {
    /// Creates a sequential runner with the reference sampler for the engine's horizon.
    pub fn new(model: ThermalModel, engine: RolloutEngine) -> Self {
        Self {
            model,
            engine,
            sampler: TrialSampler::for_horizon(engine.horizon()),
            mode: ExecutionMode::Sequential,
        }
    }

    pub fn with_sampler(mut self, sampler: TrialSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn model(&self) -> &ThermalModel {
        &self.model
    }

    pub fn engine(&self) -> &RolloutEngine {
        &self.engine
    }

    pub fn sampler(&self) -> &TrialSampler {
        &self.sampler
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Samples and evaluates `trials` rollouts, returning rewards in trial order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::LengthMismatch`] if the sampler's horizon differs
    /// from the engine's.
    pub fn run<R: Rng + ?Sized>(&self, trials: usize, rng: &mut R) -> Result<Vec<f64>, SimError> {
        self.run_timed(trials, rng).map(|(rewards, _)| rewards)
    }

    /// Like [`run`](Self::run), also returning the time spent in rollouts alone.
    ///
    /// Sampling is excluded from the returned duration.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_timed<R: Rng + ?Sized>(
        &self,
        trials: usize,
        rng: &mut R,
    ) -> Result<(Vec<f64>, Duration), SimError> {
        info!(trials, mode = %self.mode, model = %self.model, "starting batch");

        let mut rewards = Vec::with_capacity(trials);
        let mut inputs = Vec::with_capacity(CHUNK_TRIALS.min(trials));
        let mut rollout_time = Duration::ZERO;
        while rewards.len() < trials {
            let chunk = CHUNK_TRIALS.min(trials - rewards.len());
            inputs.clear();
            inputs.extend((0..chunk).map(|_| self.sampler.sample(&mut *rng)));

            let start = Instant::now();
            let evaluated = self.evaluate(&inputs)?;
            rollout_time += start.elapsed();

            rewards.extend(evaluated);
            debug!(done = rewards.len(), trials, "batch chunk evaluated");
        }

        Ok((rewards, rollout_time))
    }

    /// Evaluates pre-sampled trials, returning rewards in input order.
    ///
    /// # Errors
    ///
    /// Returns the first [`SimError::LengthMismatch`] encountered.
    pub fn evaluate(&self, inputs: &[TrialInput]) -> Result<Vec<f64>, SimError> {
        let run = |trial: &TrialInput| self.engine.run(&self.model, trial.t_start, &trial.schedule);
        match self.mode {
            ExecutionMode::Sequential => inputs.iter().map(run).collect(),
            ExecutionMode::Parallel => inputs.par_iter().map(run).collect(),
        }
    }
}

/// Sums rewards left to right, starting from `0.0`.
///
/// Floating-point addition is not associative: a different reduction order
/// (for instance a parallel tree sum) may change the last bits of the result.
/// Batches therefore keep rewards in trial order and reduce them here.
pub fn checksum(rewards: &[f64]) -> f64 {
    rewards.iter().fold(0.0, |acc, &r| acc + r)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn runner() -> BatchRunner {
        let model = ThermalModel::new(1200, 2100).expect("reference model should build");
        BatchRunner::new(model, RolloutEngine::default())
    }

    #[test]
    fn mode_round_trips_through_str() {
        for mode in ExecutionMode::ALL {
            assert_eq!(mode.as_str().parse::<ExecutionMode>(), Ok(mode));
        }
        assert!("gpu".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn sampler_rejects_bad_ranges() {
        assert!(TrialSampler::new(HORIZON, 20.0, 18.0, 0.5).is_err());
        assert!(TrialSampler::new(HORIZON, 18.0, 18.0, 0.5).is_err());
        assert!(TrialSampler::new(HORIZON, 18.0, f64::INFINITY, 0.5).is_err());
        assert!(TrialSampler::new(HORIZON, 18.0, 20.0, 1.5).is_err());
    }

    #[test]
    fn sampled_start_temperature_stays_in_range() {
        let sampler = TrialSampler::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let trial = sampler.sample(&mut rng);
            assert!((18.0..20.0).contains(&trial.t_start));
            assert_eq!(trial.schedule.len(), HORIZON);
        }
    }

    #[test]
    fn run_returns_one_reward_per_trial_across_chunks() {
        let mut rng = StdRng::seed_from_u64(11);
        let rewards = runner()
            .run(CHUNK_TRIALS + 17, &mut rng)
            .expect("batch should run");
        assert_eq!(rewards.len(), CHUNK_TRIALS + 17);
        assert!(rewards.iter().all(|r| r.is_finite() && *r <= 0.0));
    }

    #[test]
    fn timed_run_returns_the_same_rewards() {
        let plain = runner()
            .run(300, &mut StdRng::seed_from_u64(21))
            .expect("batch should run");
        let (timed, rollout_time) = runner()
            .run_timed(300, &mut StdRng::seed_from_u64(21))
            .expect("batch should run");
        assert_eq!(plain, timed);
        assert!(rollout_time > Duration::ZERO);
    }

    #[test]
    fn zero_trials_is_an_empty_batch() {
        let mut rng = StdRng::seed_from_u64(0);
        let rewards = runner().run(0, &mut rng).expect("batch should run");
        assert!(rewards.is_empty());
        assert_eq!(checksum(&rewards), 0.0);
    }

    #[test]
    fn sequential_and_parallel_agree_bitwise() {
        let seq = runner()
            .run(600, &mut StdRng::seed_from_u64(5))
            .expect("batch should run");
        let par = runner()
            .with_mode(ExecutionMode::Parallel)
            .run(600, &mut StdRng::seed_from_u64(5))
            .expect("batch should run");
        assert_eq!(seq, par);
        assert_eq!(checksum(&seq).to_bits(), checksum(&par).to_bits());
    }

    #[test]
    fn mismatched_sampler_horizon_fails_fast() {
        let sampler = TrialSampler::for_horizon(HORIZON / 2);
        let err = runner()
            .with_sampler(sampler)
            .run(3, &mut StdRng::seed_from_u64(1));
        assert!(matches!(err, Err(SimError::LengthMismatch { .. })));
    }

    #[test]
    fn checksum_folds_in_order() {
        assert_eq!(checksum(&[-1.0, -2.5, -0.5]), -4.0);
    }
}
