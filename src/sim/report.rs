//! Post-hoc statistics over the rewards of a Monte Carlo batch.

use std::fmt;

use super::batch::checksum;

/// Aggregate statistics derived from a complete batch of rollout rewards.
///
/// Computed post-hoc from the reward vector so the reported checksum is
/// always the in-order sum of the rewards that were exported.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Number of trials.
    pub trials: usize,
    /// Sum of all rewards, accumulated in trial order.
    pub checksum: f64,
    /// Mean reward per trial.
    pub mean_reward: f64,
    /// Worst (most negative) reward.
    pub min_reward: f64,
    /// Best reward.
    pub max_reward: f64,
    /// Population standard deviation of the rewards.
    pub std_reward: f64,
    /// Trials that never left the comfort band (reward of exactly zero).
    pub comfortable_trials: usize,
}

impl BatchReport {
    /// Computes all statistics from the rewards of a batch.
    ///
    /// # Returns
    ///
    /// A `BatchReport` with all fields populated; an empty batch reports zeros.
    pub fn from_rewards(rewards: &[f64]) -> Self {
        if rewards.is_empty() {
            return Self {
                trials: 0,
                checksum: 0.0,
                mean_reward: 0.0,
                min_reward: 0.0,
                max_reward: 0.0,
                std_reward: 0.0,
                comfortable_trials: 0,
            };
        }

        let n = rewards.len() as f64;
        let total = checksum(rewards);
        let mean = total / n;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sq_dev_sum = 0.0_f64;
        let mut comfortable = 0_usize;

        for &r in rewards {
            min = min.min(r);
            max = max.max(r);
            sq_dev_sum += (r - mean) * (r - mean);
            if r == 0.0 {
                comfortable += 1;
            }
        }

        Self {
            trials: rewards.len(),
            checksum: total,
            mean_reward: mean,
            min_reward: min,
            max_reward: max,
            std_reward: (sq_dev_sum / n).sqrt(),
            comfortable_trials: comfortable,
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Batch Report ---")?;
        writeln!(f, "Trials:                {}", self.trials)?;
        writeln!(f, "Checksum:              {:.6}", self.checksum)?;
        writeln!(f, "Mean reward:           {:.6}", self.mean_reward)?;
        writeln!(
            f,
            "Reward range:          [{:.6}, {:.6}]",
            self.min_reward, self.max_reward
        )?;
        writeln!(f, "Reward std. dev.:      {:.6}", self.std_reward)?;
        write!(f, "Comfortable trials:    {}", self.comfortable_trials)
    }
}
