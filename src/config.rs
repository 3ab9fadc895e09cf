//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SimError;
use crate::model::{ComfortBand, ThermalModel};
use crate::sim::batch::{BatchRunner, ExecutionMode, TrialSampler};
use crate::sim::rollout::RolloutEngine;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the reference benchmark. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::reference`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Thermal model parameters.
    #[serde(default)]
    pub model: ModelConfig,
    /// Batch size, seed and rollout timing.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Random trial input distribution.
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Thermal model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Seconds to heat from the lower to the upper comfort edge (must be > 0).
    pub seconds_to_heat: i64,
    /// Seconds to cool from the upper to the lower comfort edge (must be > 0).
    pub seconds_to_cool: i64,
    /// Comfort setpoint (°C).
    pub setpoint_c: f64,
    /// Comfort band half-width (°C, must be > 0).
    pub deadband_c: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seconds_to_heat: 20 * 60,
            seconds_to_cool: 35 * 60,
            setpoint_c: 20.0,
            deadband_c: 0.5,
        }
    }
}

/// Batch size, seed and rollout timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of Monte Carlo trials (must be > 0).
    pub trials: usize,
    /// Master random seed.
    pub seed: u64,
    /// Rollout step length in seconds.
    pub step_seconds: i64,
    /// Rollout length in seconds (a whole number of steps).
    pub horizon_seconds: i64,
    /// Constant outdoor temperature (°C).
    pub outdoor_temp_c: f64,
    /// Execution mode: `"sequential"` or `"parallel"`.
    pub mode: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            seed: 74_329_834_795,
            step_seconds: 5 * 60,
            horizon_seconds: 24 * 60 * 60,
            outdoor_temp_c: 0.0,
            mode: "sequential".to_string(),
        }
    }
}

/// Random trial input distribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    /// Lower bound of the starting temperature (°C, inclusive).
    pub t_start_min_c: f64,
    /// Upper bound of the starting temperature (°C, exclusive).
    pub t_start_max_c: f64,
    /// Probability that the heater is on during a step.
    pub on_probability: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            t_start_min_c: 18.0,
            t_start_max_c: 20.0,
            on_probability: 0.5,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"model.seconds_to_heat"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn from_sim(field: &str, err: SimError) -> Self {
        Self::new(field, err.to_string())
    }
}

impl ScenarioConfig {
    /// Returns the reference benchmark scenario: 20 min to heat, 35 min to
    /// cool, 10000 trials.
    pub fn reference() -> Self {
        Self {
            model: ModelConfig::default(),
            simulation: SimulationConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }

    /// Returns the fast-cycling preset: a light building that crosses the
    /// comfort band in minutes.
    pub fn fast_cycling() -> Self {
        Self {
            model: ModelConfig {
                seconds_to_heat: 5 * 60,
                seconds_to_cool: 10 * 60,
                ..ModelConfig::default()
            },
            ..Self::reference()
        }
    }

    /// Returns the well-insulated preset: slow decay and a start temperature
    /// already inside the comfort band.
    pub fn well_insulated() -> Self {
        Self {
            model: ModelConfig {
                seconds_to_heat: 30 * 60,
                seconds_to_cool: 4 * 60 * 60,
                ..ModelConfig::default()
            },
            sampling: SamplingConfig {
                t_start_min_c: 19.5,
                t_start_max_c: 20.5,
                on_probability: 0.3,
            },
            ..Self::reference()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["reference", "fast_cycling", "well_insulated"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "reference" => Ok(Self::reference()),
            "fast_cycling" => Ok(Self::fast_cycling()),
            "well_insulated" => Ok(Self::well_insulated()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let m = &self.model;
        if m.seconds_to_heat <= 0 {
            errors.push(ConfigError::new("model.seconds_to_heat", "must be > 0"));
        }
        if m.seconds_to_cool <= 0 {
            errors.push(ConfigError::new("model.seconds_to_cool", "must be > 0"));
        }
        match ComfortBand::new(m.setpoint_c, m.deadband_c) {
            Ok(band) => {
                if m.seconds_to_heat > 0 && m.seconds_to_cool > 0 {
                    if let Err(e) =
                        ThermalModel::with_comfort_band(m.seconds_to_heat, m.seconds_to_cool, band)
                    {
                        errors.push(ConfigError::from_sim("model.seconds_to_cool", e));
                    }
                }
            }
            Err(e) => {
                let field = if m.deadband_c.is_finite() && m.deadband_c > 0.0 {
                    "model.setpoint_c"
                } else {
                    "model.deadband_c"
                };
                errors.push(ConfigError::from_sim(field, e));
            }
        }

        let s = &self.simulation;
        if s.trials == 0 {
            errors.push(ConfigError::new("simulation.trials", "must be > 0"));
        }
        if let Err(e) = RolloutEngine::new(s.step_seconds, s.horizon_seconds, s.outdoor_temp_c) {
            errors.push(ConfigError::from_sim("simulation.step_seconds", e));
        }
        if let Err(e) = s.mode.parse::<ExecutionMode>() {
            errors.push(ConfigError::new("simulation.mode", e));
        }

        let smp = &self.sampling;
        if let Err(e) = TrialSampler::new(0, smp.t_start_min_c, smp.t_start_max_c, smp.on_probability)
        {
            errors.push(ConfigError::from_sim("sampling", e));
        }

        errors
    }

    /// Builds the thermal model described by `[model]`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for invalid durations or band.
    pub fn thermal_model(&self) -> Result<ThermalModel, SimError> {
        let m = &self.model;
        let band = ComfortBand::new(m.setpoint_c, m.deadband_c)?;
        ThermalModel::with_comfort_band(m.seconds_to_heat, m.seconds_to_cool, band)
    }

    /// Builds the rollout engine described by `[simulation]`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for invalid timing.
    pub fn rollout_engine(&self) -> Result<RolloutEngine, SimError> {
        let s = &self.simulation;
        RolloutEngine::new(s.step_seconds, s.horizon_seconds, s.outdoor_temp_c)
    }

    /// Builds a batch runner wiring model, engine and sampler together.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if any section is invalid.
    pub fn batch_runner(&self) -> Result<BatchRunner, SimError> {
        let engine = self.rollout_engine()?;
        let smp = &self.sampling;
        let sampler = TrialSampler::new(
            engine.horizon(),
            smp.t_start_min_c,
            smp.t_start_max_c,
            smp.on_probability,
        )?;
        let mode = self
            .simulation
            .mode
            .parse::<ExecutionMode>()
            .map_err(SimError::InvalidParameter)?;
        Ok(BatchRunner::new(self.thermal_model()?, engine)
            .with_sampler(sampler)
            .with_mode(mode))
    }
}
