use std::ops::Index;

use rand::Rng;

use crate::error::SimError;

/// Heater activation levels for consecutive rollout steps.
///
/// Every level lies in `[0, 1]`: `0` is off, `1` is full power. Randomly
/// sampled schedules only contain the two extremes. The length is not fixed
/// here; the rollout engine checks it against its horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSchedule {
    levels: Vec<f64>,
}

impl PowerSchedule {
    /// Creates a schedule from explicit power levels.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if a level is not finite or lies
    /// outside `[0, 1]`.
    pub fn new(levels: Vec<f64>) -> Result<Self, SimError> {
        if let Some((step, level)) = levels
            .iter()
            .enumerate()
            .find(|(_, l)| !(0.0..=1.0).contains(*l))
        {
            return Err(SimError::invalid(format!(
                "power level {level} at step {step} is outside [0, 1]"
            )));
        }
        Ok(Self { levels })
    }

    /// Creates an on/off schedule.
    pub fn from_states(states: &[bool]) -> Self {
        Self {
            levels: states
                .iter()
                .map(|&on| if on { 1.0 } else { 0.0 })
                .collect(),
        }
    }

    /// Schedule keeping the heater at a single state for `len` steps.
    pub fn constant(len: usize, on: bool) -> Self {
        Self::from_states(&vec![on; len])
    }

    /// Samples `len` independent on/off states, each on with `on_probability`.
    ///
    /// # Panics
    ///
    /// Panics if `on_probability` is outside `[0, 1]`.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, len: usize, on_probability: f64) -> Self {
        Self {
            levels: (0..len)
                .map(|_| {
                    if rng.random_bool(on_probability) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Fraction of steps with the heater on, weighted by level.
    pub fn duty_cycle(&self) -> f64 {
        if self.levels.is_empty() {
            return 0.0;
        }
        self.levels.iter().sum::<f64>() / self.levels.len() as f64
    }
}

impl Index<usize> for PowerSchedule {
    type Output = f64;

    fn index(&self, step: usize) -> &f64 {
        &self.levels[step]
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::PowerSchedule;

    #[test]
    fn accepts_levels_in_unit_interval() {
        let s = PowerSchedule::new(vec![0.0, 0.25, 1.0]).expect("levels are valid");
        assert_eq!(s.len(), 3);
        assert_eq!(s[1], 0.25);
    }

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(PowerSchedule::new(vec![0.0, 1.5]).is_err());
        assert!(PowerSchedule::new(vec![-0.1]).is_err());
        assert!(PowerSchedule::new(vec![f64::NAN]).is_err());
    }

    #[test]
    fn from_states_maps_to_extremes() {
        let s = PowerSchedule::from_states(&[true, false, true]);
        assert_eq!(s.levels(), &[1.0, 0.0, 1.0]);
        assert!((s.duty_cycle() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn sampling_is_reproducible_and_binary() {
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let a = PowerSchedule::sample(&mut rng_a, 288, 0.5);
        let b = PowerSchedule::sample(&mut rng_b, 288, 0.5);
        assert_eq!(a, b);
        assert!(a.levels().iter().all(|&l| l == 0.0 || l == 1.0));
    }

    #[test]
    fn sampling_respects_degenerate_probabilities() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(PowerSchedule::sample(&mut rng, 10, 0.0).duty_cycle(), 0.0);
        assert_eq!(PowerSchedule::sample(&mut rng, 10, 1.0).duty_cycle(), 1.0);
    }

    #[test]
    fn empty_schedule_has_zero_duty_cycle() {
        let s = PowerSchedule::from_states(&[]);
        assert!(s.is_empty());
        assert_eq!(s.duty_cycle(), 0.0);
    }
}
