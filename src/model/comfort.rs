use std::fmt;

use crate::error::SimError;

/// Default indoor temperature goal in °C.
pub const DEFAULT_SETPOINT_C: f64 = 20.0;

/// Default half-width of the comfort band in °C.
pub const DEFAULT_DEADBAND_C: f64 = 0.5;

/// The temperature interval `[setpoint - deadband, setpoint + deadband]`
/// inside which occupants are scored as perfectly comfortable.
///
/// # Examples
///
/// ```
/// use tcl_sim::model::ComfortBand;
///
/// let band = ComfortBand::default();
/// assert_eq!(band.lower_c(), 19.5);
/// assert_eq!(band.upper_c(), 20.5);
/// assert_eq!(band.score(21.5), -1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComfortBand {
    setpoint_c: f64,
    deadband_c: f64,
}

impl ComfortBand {
    /// Creates a comfort band around `setpoint_c`.
    ///
    /// The lower edge has to stay strictly above 0 °C, the reference outdoor
    /// temperature the model parameters are fitted against; otherwise the
    /// cooling ratio `lower / upper` has no real root.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if either value is not finite,
    /// the deadband is not strictly positive, or the lower edge is not above 0 °C.
    pub fn new(setpoint_c: f64, deadband_c: f64) -> Result<Self, SimError> {
        if !setpoint_c.is_finite() || !deadband_c.is_finite() {
            return Err(SimError::invalid("comfort band values must be finite"));
        }
        if deadband_c <= 0.0 {
            return Err(SimError::invalid(format!(
                "deadband must be strictly positive, got {deadband_c}"
            )));
        }
        if setpoint_c - deadband_c <= 0.0 {
            return Err(SimError::invalid(format!(
                "comfort band lower edge must be above 0 °C, got {}",
                setpoint_c - deadband_c
            )));
        }
        Ok(Self {
            setpoint_c,
            deadband_c,
        })
    }

    pub fn setpoint_c(&self) -> f64 {
        self.setpoint_c
    }

    pub fn deadband_c(&self) -> f64 {
        self.deadband_c
    }

    /// Lower comfort edge (`MIN`).
    pub fn lower_c(&self) -> f64 {
        self.setpoint_c - self.deadband_c
    }

    /// Upper comfort edge (`MAX`).
    pub fn upper_c(&self) -> f64 {
        self.setpoint_c + self.deadband_c
    }

    /// Returns `true` when `t_in` lies inside the band, edges included.
    pub fn contains(&self, t_in: f64) -> bool {
        (self.lower_c()..=self.upper_c()).contains(&t_in)
    }

    /// Quadratic discomfort penalty: zero inside the band, `-error²` outside,
    /// where `error` is the distance beyond the nearest edge.
    ///
    /// A NaN temperature scores NaN.
    pub fn score(&self, t_in: f64) -> f64 {
        let excess = (t_in - self.setpoint_c).abs() - self.deadband_c;
        // f64::max would swallow a NaN excess as 0
        let error = if excess.is_nan() {
            excess
        } else {
            f64::max(0.0, excess)
        };
        -error * error
    }
}

impl Default for ComfortBand {
    fn default() -> Self {
        Self {
            setpoint_c: DEFAULT_SETPOINT_C,
            deadband_c: DEFAULT_DEADBAND_C,
        }
    }
}

impl fmt::Display for ComfortBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}±{:.2} °C", self.setpoint_c, self.deadband_c)
    }
}
