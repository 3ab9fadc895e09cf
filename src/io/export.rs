//! CSV export for batch rewards and rollout trajectories.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::{StepRecord, TrialInput};

/// Column header for per-trial reward export.
const REWARDS_HEADER: &str = "trial,t_start_c,duty_cycle,reward";

/// Column header for trajectory export.
const TRAJECTORY_HEADER: &str =
    "step,elapsed_s,power,temperature_c,comfort_score,cumulative_reward";

/// Writes per-trial rewards to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_rewards_csv(trials: &[TrialInput], rewards: &[f64], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_rewards_csv(trials, rewards, io::BufWriter::new(file))
}

/// Writes per-trial rewards as CSV to any writer.
///
/// Rows pair `trials[i]` with `rewards[i]`; extra entries on either side are
/// ignored. Rewards are written with full round-trip precision.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_rewards_csv(
    trials: &[TrialInput],
    rewards: &[f64],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(REWARDS_HEADER.split(','))?;

    for (i, (trial, reward)) in trials.iter().zip(rewards).enumerate() {
        wtr.write_record(&[
            i.to_string(),
            format!("{:.6}", trial.t_start),
            format!("{:.4}", trial.schedule.duty_cycle()),
            reward.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a rollout trajectory to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trajectory_csv(records: &[StepRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_trajectory_csv(records, io::BufWriter::new(file))
}

/// Writes a rollout trajectory as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_trajectory_csv(records: &[StepRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRAJECTORY_HEADER.split(','))?;

    for r in records {
        wtr.write_record(&[
            r.step.to_string(),
            r.elapsed_seconds.to_string(),
            r.power.to_string(),
            format!("{:.6}", r.temperature_c),
            format!("{:.6}", r.comfort_score),
            format!("{:.6}", r.cumulative_reward),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
