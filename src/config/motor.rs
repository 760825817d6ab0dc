//! Motor and driver configuration from TOML.

use serde::Deserialize;

use super::units::{Degrees, Microsteps};

/// Peak-to-RMS ratio of a sinusoidal coil current.
pub const PEAK_TO_RMS: f32 = 1.414;

/// Motor geometry and driver settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    /// Full-step angle of the motor (1.8° or 0.9°).
    #[serde(rename = "full_step_angle_deg")]
    pub full_step_angle: Degrees,

    /// Microstep divisor (1, 2, 4, 8, 16, 32, 64, 128, 256).
    pub microsteps: Microsteps,

    /// Microsteps moved per step input pulse.
    pub microstep_multiplier: u16,

    /// Invert the rotation direction.
    pub reversed: bool,

    /// Enable input is active-low.
    pub enable_inverted: bool,

    /// RMS coil current in milliamps.
    pub rms_current_ma: u16,

    /// Board limit for the peak coil current in milliamps.
    pub max_peak_current_ma: u16,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            full_step_angle: Degrees(1.8),
            microsteps: Microsteps::THIRTY_SECOND,
            microstep_multiplier: 1,
            reversed: false,
            enable_inverted: false,
            rms_current_ma: 500,
            max_peak_current_ma: 3500,
        }
    }
}

impl MotorConfig {
    /// Largest RMS current the board allows.
    pub fn max_rms_current_ma(&self) -> u16 {
        (self.max_peak_current_ma as f32 / PEAK_TO_RMS) as u16
    }

    /// Full steps per mechanical rotation.
    pub fn full_steps_per_rotation(&self) -> u32 {
        libm::roundf(360.0 / self.full_step_angle.0) as u32
    }
}
