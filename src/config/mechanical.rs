//! Step geometry derived from motor configuration.

use super::correction::{CorrectionConfig, StallConfig};
use super::motor::MotorConfig;
use super::units::{Degrees, Microsteps, Steps};

/// Derived step parameters.
///
/// Computed once at initialization and again whenever microstepping changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepGeometry {
    /// Full-step angle of the motor.
    pub full_step_angle: Degrees,

    /// Active microstep divisor.
    pub microsteps: Microsteps,

    /// Angle of one microstep.
    pub microstep_angle: Degrees,

    /// Microsteps per mechanical rotation.
    pub microsteps_per_rotation: u32,

    /// Correction tick rate in Hz.
    pub tick_frequency_hz: f32,

    /// Out-of-tolerance ticks tolerated before a stall latches.
    pub stall_tick_budget: f32,

    base_update_hz: f32,
    fault_time_sec: f32,
}

impl StepGeometry {
    /// Compute the geometry from motor, correction and stall settings.
    pub fn from_config(motor: &MotorConfig, correction: &CorrectionConfig, stall: &StallConfig) -> Self {
        Self::compute(
            motor.full_step_angle,
            motor.microsteps,
            correction.update_frequency_hz,
            stall.fault_time_sec,
        )
    }

    fn compute(full_step_angle: Degrees, microsteps: Microsteps, base_update_hz: f32, fault_time_sec: f32) -> Self {
        let microstep_angle = Degrees(full_step_angle.0 / microsteps.value() as f32);
        let microsteps_per_rotation = libm::roundf(360.0 / microstep_angle.0) as u32;
        let tick_frequency_hz = base_update_hz * microsteps.value() as f32;

        Self {
            full_step_angle,
            microsteps,
            microstep_angle,
            microsteps_per_rotation,
            tick_frequency_hz,
            stall_tick_budget: fault_time_sec * tick_frequency_hz,
            base_update_hz,
            fault_time_sec,
        }
    }

    /// Same motor with a different microstep divisor.
    pub fn with_microsteps(&self, microsteps: Microsteps) -> Self {
        Self::compute(self.full_step_angle, microsteps, self.base_update_hz, self.fault_time_sec)
    }

    /// Nearest microstep for an angle.
    #[inline]
    pub fn angle_to_steps(&self, angle: Degrees) -> Steps {
        angle.to_steps(self.microstep_angle)
    }

    /// Angle of a microstep count.
    #[inline]
    pub fn steps_to_angle(&self, steps: Steps) -> Degrees {
        steps.to_degrees(self.microstep_angle)
    }
}
