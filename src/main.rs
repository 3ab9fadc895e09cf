//! tcl-sim entry point: CLI wiring and config-driven Monte Carlo batches.

use std::path::Path;
use std::process;
use std::time::Instant;

use rand::{SeedableRng, rngs::StdRng};
use tracing::{info, warn};

use tcl_sim::config::ScenarioConfig;
use tcl_sim::io::export::{export_rewards_csv, export_trajectory_csv};
use tcl_sim::reporting::BenchmarkLine;
use tcl_sim::sim::batch::{BatchRunner, ExecutionMode, checksum};
use tcl_sim::sim::report::BatchReport;
use tcl_sim::sim::types::TrialInput;
use tcl_sim::telemetry::init_tracing;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    trials_override: Option<usize>,
    mode_override: Option<String>,
    compare: bool,
    rewards_out: Option<String>,
    trace_out: Option<String>,
}

fn print_help() {
    eprintln!("tcl-sim: Monte Carlo comfort evaluation of a thermostatically controlled load");
    eprintln!();
    eprintln!("Usage: tcl-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --trials <usize>         Override number of trials");
    eprintln!("  --mode <name>            Execution mode (sequential, parallel)");
    eprintln!("  --compare                Run the batch once per execution mode");
    eprintln!("  --rewards-out <path>     Export per-trial rewards to CSV");
    eprintln!("  --trace-out <path>       Export the trajectory of trial 0 to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the reference preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str, expected: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v.as_str(),
        None => {
            eprintln!("error: {flag} requires {expected} argument");
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str, kind: &str) -> T {
    raw.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{raw}\" is not a valid {kind}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        trials_override: None,
        mode_override: None,
        compare: false,
        rewards_out: None,
        trace_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(next_value(&args, i, flag, "a path").to_string());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(next_value(&args, i, flag, "a name").to_string());
            }
            "--seed" => {
                i += 1;
                let raw = next_value(&args, i, flag, "a u64");
                cli.seed_override = Some(parse_number(raw, flag, "u64"));
            }
            "--trials" => {
                i += 1;
                let raw = next_value(&args, i, flag, "a usize");
                cli.trials_override = Some(parse_number(raw, flag, "usize"));
            }
            "--mode" => {
                i += 1;
                cli.mode_override = Some(next_value(&args, i, flag, "a mode").to_string());
            }
            "--compare" => {
                cli.compare = true;
            }
            "--rewards-out" => {
                i += 1;
                cli.rewards_out = Some(next_value(&args, i, flag, "a path").to_string());
            }
            "--trace-out" => {
                i += 1;
                cli.trace_out = Some(next_value(&args, i, flag, "a path").to_string());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --scenario and --preset are mutually exclusive");
        process::exit(1);
    }

    cli
}

fn load_scenario(cli: &CliArgs) -> ScenarioConfig {
    // --scenario takes priority, then --preset, then the reference default
    let loaded = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::reference())
    };

    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(trials) = cli.trials_override {
        scenario.simulation.trials = trials;
    }
    if let Some(ref mode) = cli.mode_override {
        scenario.simulation.mode = mode.clone();
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    scenario
}

/// Re-draws the batch inputs from the seed; sampling order matches `BatchRunner::run`.
fn resample_trials(runner: &BatchRunner, seed: u64, count: usize) -> Vec<TrialInput> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| runner.sampler().sample(&mut rng)).collect()
}

fn main() {
    let cli = parse_args();
    init_tracing();

    let scenario = load_scenario(&cli);
    let seed = scenario.simulation.seed;
    let trials = scenario.simulation.trials;

    let runner = scenario.batch_runner().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });
    info!(model = %runner.model(), horizon = runner.engine().horizon(), seed, "scenario loaded");

    let modes: Vec<ExecutionMode> = if cli.compare {
        ExecutionMode::ALL.to_vec()
    } else {
        vec![runner.mode()]
    };

    let mut rewards = Vec::new();
    let mut checksums = Vec::with_capacity(modes.len());
    for mode in modes {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = Instant::now();
        let (batch, rollout_time) = match runner.with_mode(mode).run_timed(trials, &mut rng) {
            Ok(timed) => timed,
            Err(e) => {
                eprintln!("error: {mode} batch failed: {e}");
                process::exit(1);
            }
        };
        let elapsed = start.elapsed();
        rewards = batch;
        let total = checksum(&rewards);
        checksums.push(total);
        println!(
            "{}",
            BenchmarkLine::new(mode, trials, elapsed, rollout_time, total)
        );
    }

    if checksums.windows(2).any(|w| w[0].to_bits() != w[1].to_bits()) {
        warn!(?checksums, "execution modes disagree on the checksum");
    }

    println!("\n{}", BatchReport::from_rewards(&rewards));

    if let Some(ref path) = cli.rewards_out {
        let inputs = resample_trials(&runner, seed, trials);
        if let Err(e) = export_rewards_csv(&inputs, &rewards, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path, "rewards written");
    }

    if let Some(ref path) = cli.trace_out {
        let first = resample_trials(&runner, seed, 1);
        let records = first
            .first()
            .map(|t| runner.engine().trajectory(runner.model(), t.t_start, &t.schedule));
        match records {
            Some(Ok(records)) => {
                if let Err(e) = export_trajectory_csv(&records, Path::new(path)) {
                    eprintln!("error: failed to write CSV: {e}");
                    process::exit(1);
                }
                info!(path = %path, "trajectory written");
            }
            Some(Err(e)) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
            None => {}
        }
    }
}
