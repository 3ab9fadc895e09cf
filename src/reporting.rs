use std::fmt;
use std::time::Duration;

use crate::sim::batch::ExecutionMode;

/// One timed batch, printed in the cross-language benchmark format:
///
/// ```text
/// Rust loop   : per-run 0.0000012345s, total  0.01234s. (checksum -12345.678901)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkLine {
    pub label: String,
    pub trials: usize,
    /// Wall-clock time of the whole batch, sampling included.
    pub elapsed: Duration,
    /// Time spent inside rollouts only.
    pub rollout_time: Duration,
    pub checksum: f64,
}

impl BenchmarkLine {
    pub fn new(
        mode: ExecutionMode,
        trials: usize,
        elapsed: Duration,
        rollout_time: Duration,
        checksum: f64,
    ) -> Self {
        Self {
            label: mode_label(mode).to_string(),
            trials,
            elapsed,
            rollout_time,
            checksum,
        }
    }

    /// Mean rollout seconds per trial, sampling excluded.
    pub fn per_run_secs(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.rollout_time.as_secs_f64() / self.trials as f64
    }
}

impl fmt::Display for BenchmarkLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12}: per-run {:.10}s, total {:8.5}s. (checksum {:.6})",
            self.label,
            self.per_run_secs(),
            self.elapsed.as_secs_f64(),
            self.checksum
        )
    }
}

fn mode_label(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::Sequential => "Rust loop",
        ExecutionMode::Parallel => "Rust rayon",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_reference_benchmarks() {
        let line = BenchmarkLine::new(
            ExecutionMode::Sequential,
            4,
            Duration::from_millis(3),
            Duration::from_millis(2),
            -1234.5,
        );
        assert_eq!(
            line.to_string(),
            "Rust loop   : per-run 0.0005000000s, total  0.00300s. (checksum -1234.500000)"
        );
    }

    #[test]
    fn per_run_excludes_sampling_time() {
        let line = BenchmarkLine::new(
            ExecutionMode::Sequential,
            10,
            Duration::from_secs(5),
            Duration::from_secs(1),
            0.0,
        );
        assert_eq!(line.per_run_secs(), 0.1);
    }

    #[test]
    fn zero_trials_has_zero_per_run() {
        let line = BenchmarkLine::new(
            ExecutionMode::Parallel,
            0,
            Duration::from_secs(1),
            Duration::from_secs(1),
            0.0,
        );
        assert_eq!(line.per_run_secs(), 0.0);
        assert!(line.to_string().starts_with("Rust rayon  :"));
    }
}
