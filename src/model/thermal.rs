use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::debug;

use super::comfort::ComfortBand;
use crate::error::SimError;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// First-order (single resistance, single capacitance) thermal model of a
/// thermostatically controlled load.
///
/// The model is parameterised by two human-friendly durations measured under
/// a reference outdoor temperature of 0 °C:
///
/// * `seconds_to_heat`: time to climb from the lower to the upper comfort edge
///   with the heater at full power;
/// * `seconds_to_cool`: time to decay from the upper to the lower comfort edge
///   with the heater off.
///
/// ```text
///             |  \
///   MAX 20.5  | . *.  .  .  .  .
///             |    \
///             |     \
///   MIN 19.5  | .  .  *  .  .  .
///             |   cool \
///   REF  0.0  | .  .  .  \------
/// ```
///
/// From these the capacitance `C` (hours) and heating power `P` are fitted
/// once at construction; the resistance is fixed at 1. The fits use the exact
/// same transcendental calls and evaluation order as the reference benchmark,
/// so that rollout checksums match to the last bit.
///
/// # Examples
///
/// ```
/// use tcl_sim::model::ThermalModel;
///
/// let tcl = ThermalModel::new(20 * 60, 35 * 60)?;
/// assert!(tcl.capacitance() > 0.0);
/// assert_eq!(tcl.comfort_score(20.0), 0.0);
/// # Ok::<(), tcl_sim::SimError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ThermalModel {
    capacitance: f64,
    power: f64,
    band: ComfortBand,
}

impl ThermalModel {
    /// Fits a model to the default 20 °C ± 0.5 °C comfort band.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if either duration is not
    /// strictly positive.
    pub fn new(seconds_to_heat: i64, seconds_to_cool: i64) -> Result<Self, SimError> {
        Self::with_comfort_band(seconds_to_heat, seconds_to_cool, ComfortBand::default())
    }

    /// Fits a model to a custom comfort band.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if either duration is not
    /// strictly positive, or if the durations are too long for the fitted
    /// capacitance and power to be finite.
    pub fn with_comfort_band(
        seconds_to_heat: i64,
        seconds_to_cool: i64,
        band: ComfortBand,
    ) -> Result<Self, SimError> {
        if seconds_to_heat < 1 || seconds_to_cool < 1 {
            return Err(SimError::invalid("decay durations must be strictly positive"));
        }

        let lower = band.lower_c();
        let upper = band.upper_c();

        // Per-second decay ratio taking MAX to MIN in `seconds_to_cool` seconds.
        let alpha = (lower / upper).powf(1.0 / seconds_to_cool as f64);

        let capacitance = (-1.0 / SECONDS_PER_HOUR) / alpha.ln();

        let heat = seconds_to_heat as f64;
        let power = (lower * alpha.powf(heat) - upper) / (alpha.powf(heat) - 1.0);

        // alpha rounds to 1.0 once seconds_to_cool exceeds f64 precision
        if !(capacitance.is_finite() && capacitance > 0.0 && power.is_finite()) {
            return Err(SimError::invalid(format!(
                "durations ({seconds_to_heat} s, {seconds_to_cool} s) are too long to fit a finite model"
            )));
        }

        debug!(
            seconds_to_heat,
            seconds_to_cool, capacitance, power, "fitted thermal model"
        );

        Ok(Self {
            capacitance,
            power,
            band,
        })
    }

    /// Thermal capacitance `C` in hours.
    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }

    /// Heating power `P`: the equilibrium temperature rise at full power.
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Thermal resistance `R`, fixed at 1.
    pub fn resistance(&self) -> f64 {
        1.0
    }

    pub fn comfort_band(&self) -> &ComfortBand {
        &self.band
    }

    /// Advances the indoor temperature by `delta_seconds`.
    ///
    /// The temperature decays exponentially toward the equilibrium
    /// `t_out + power * P`. The decay factor is recomputed on every call, so
    /// step sizes may vary between calls.
    ///
    /// # Arguments
    ///
    /// * `t_in` - Current indoor temperature (°C)
    /// * `t_out` - Outdoor temperature (°C)
    /// * `delta_seconds` - Step length in seconds
    /// * `power` - Heater activation level in `[0, 1]`
    pub fn next_temperature(&self, t_in: f64, t_out: f64, delta_seconds: i64, power: f64) -> f64 {
        let alpha = ((-delta_seconds as f64 / SECONDS_PER_HOUR) / self.capacitance).exp();
        alpha * t_in + (1.0 - alpha) * (t_out + power * self.power)
    }

    /// Comfort reward of a single temperature: `0` inside the comfort band,
    /// `-error²` outside it.
    pub fn comfort_score(&self, t_in: f64) -> f64 {
        self.band.score(t_in)
    }
}

impl PartialEq for ThermalModel {
    fn eq(&self, other: &Self) -> bool {
        self.capacitance.to_bits() == other.capacitance.to_bits()
            && self.power.to_bits() == other.power.to_bits()
    }
}

impl Eq for ThermalModel {}

impl Hash for ThermalModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.capacitance.to_bits().hash(state);
        self.power.to_bits().hash(state);
    }
}

impl fmt::Display for ThermalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<C={:.2}, P={:.2}>", self.capacitance, self.power)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use approx::assert_relative_eq;

    use super::*;

    fn reference() -> ThermalModel {
        ThermalModel::new(1200, 2100).expect("reference model should build")
    }

    #[test]
    fn rejects_non_positive_durations() {
        for (heat, cool) in [(0, 2100), (1200, 0), (-1, 2100), (1200, -60), (0, 0)] {
            let err = ThermalModel::new(heat, cool);
            assert!(
                matches!(err, Err(SimError::InvalidParameter(_))),
                "({heat}, {cool}) should be rejected"
            );
        }
    }

    #[test]
    fn rejects_durations_beyond_float_precision() {
        for cool in [1_000_000_000_000_000, i64::MAX] {
            assert!(
                matches!(
                    ThermalModel::new(1200, cool),
                    Err(SimError::InvalidParameter(_))
                ),
                "cool = {cool} should be rejected"
            );
        }
    }

    #[test]
    fn long_but_representable_durations_still_fit() {
        let tcl = ThermalModel::new(i64::MAX, 10_000_000_000).expect("model should build");
        assert!(tcl.capacitance().is_finite() && tcl.capacitance() > 0.0);
        assert!(tcl.power().is_finite());
    }

    #[test]
    fn derived_parameters_are_finite_and_positive() {
        let tcl = reference();
        assert!(tcl.capacitance().is_finite() && tcl.capacitance() > 0.0);
        assert!(tcl.power().is_finite() && tcl.power() > tcl.comfort_band().upper_c());
        assert_eq!(tcl.resistance(), 1.0);
    }

    #[test]
    fn cooling_from_max_reaches_min_after_seconds_to_cool() {
        let tcl = reference();
        let t = tcl.next_temperature(20.5, 0.0, 2100, 0.0);
        assert_relative_eq!(t, 19.5, max_relative = 1e-9);
    }

    #[test]
    fn heating_from_min_reaches_max_after_seconds_to_heat() {
        let tcl = reference();
        let t = tcl.next_temperature(19.5, 0.0, 1200, 1.0);
        assert_relative_eq!(t, 20.5, max_relative = 1e-9);
    }

    #[test]
    fn next_temperature_is_pure() {
        let tcl = reference();
        let a = tcl.next_temperature(19.8, 0.0, 300, 1.0);
        let b = tcl.next_temperature(19.8, 0.0, 300, 1.0);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn zero_length_step_keeps_temperature() {
        let tcl = reference();
        assert_eq!(tcl.next_temperature(19.8, 0.0, 0, 1.0), 19.8);
    }

    #[test]
    fn unpowered_decay_is_monotonic_and_never_overshoots() {
        let tcl = reference();
        let mut t = 25.0;
        for _ in 0..1000 {
            let next = tcl.next_temperature(t, 0.0, 300, 0.0);
            assert!(next < t, "temperature should strictly decrease");
            assert!(next > 0.0, "temperature should never overshoot below 0");
            t = next;
        }
    }

    #[test]
    fn comfort_score_matches_band() {
        let tcl = reference();
        assert_eq!(tcl.comfort_score(20.0), 0.0);
        assert_eq!(tcl.comfort_score(19.5), 0.0);
        assert_eq!(tcl.comfort_score(20.5), 0.0);
        assert_eq!(tcl.comfort_score(21.5), -1.0);
    }

    #[test]
    fn equality_and_hash_follow_derived_bits() {
        let a = reference();
        let b = reference();
        assert_eq!(a, b);
        assert_ne!(a, ThermalModel::new(1200, 2400).expect("model should build"));

        let set: HashSet<ThermalModel> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn custom_band_shifts_fit() {
        let band = ComfortBand::new(5.0, 1.0).expect("band should be valid");
        let fridge = ThermalModel::with_comfort_band(1200, 2100, band).expect("model should build");
        let t = fridge.next_temperature(6.0, 0.0, 2100, 0.0);
        assert_relative_eq!(t, 4.0, max_relative = 1e-9);
        assert_eq!(fridge.comfort_score(5.0), 0.0);
        assert_eq!(fridge.comfort_score(8.0), -4.0);
    }

    #[test]
    fn display_shows_two_decimals() {
        let s = reference().to_string();
        assert!(s.starts_with("<C="));
        assert!(s.contains(", P="));
        assert!(s.ends_with('>'));
    }
}
