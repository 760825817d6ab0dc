//! Motor enable state and drive current.

use crate::config::{MotorConfig, PEAK_TO_RMS};

/// Enable state of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    /// Coils driven, following the enable input.
    Enabled,
    /// Coils idle, following the enable input.
    Disabled,
    /// Coils driven regardless of the enable input.
    ForcedEnabled,
    /// Coils idle regardless of the enable input.
    ForcedDisabled,
    /// Shut down by the thermal guard.
    Overtemperature,
}

impl MotorState {
    /// Get the state name as a static string.
    pub fn name(self) -> &'static str {
        match self {
            MotorState::Enabled => "Enabled",
            MotorState::Disabled => "Disabled",
            MotorState::ForcedEnabled => "ForcedEnabled",
            MotorState::ForcedDisabled => "ForcedDisabled",
            MotorState::Overtemperature => "Overtemperature",
        }
    }

    /// Whether the state follows the enable input.
    ///
    /// Forced and fault states are sticky: only a transition that clears
    /// errors leaves them.
    #[inline]
    pub fn follows_input(self) -> bool {
        matches!(self, MotorState::Enabled | MotorState::Disabled)
    }

    /// Whether the coils are driven in this state.
    #[inline]
    pub fn is_driving(self) -> bool {
        matches!(self, MotorState::Enabled | MotorState::ForcedEnabled)
    }
}

/// Motor state and current control as seen by the servo core.
pub trait MotorControl {
    /// Current state.
    fn state(&self) -> MotorState;

    /// Request a state; returns whether the state changed.
    ///
    /// Without `clear_errors` only [`MotorState::follows_input`] states may
    /// transition.
    fn set_state(&mut self, state: MotorState, clear_errors: bool) -> bool;

    /// RMS coil current in milliamps.
    fn rms_current(&self) -> u16;

    /// Set the RMS coil current in milliamps (clamped to the board limit).
    fn set_rms_current(&mut self, milliamps: u16);
}

impl<C: MotorControl + ?Sized> MotorControl for &mut C {
    fn state(&self) -> MotorState {
        (**self).state()
    }

    fn set_state(&mut self, state: MotorState, clear_errors: bool) -> bool {
        (**self).set_state(state, clear_errors)
    }

    fn rms_current(&self) -> u16 {
        (**self).rms_current()
    }

    fn set_rms_current(&mut self, milliamps: u16) {
        (**self).set_rms_current(milliamps)
    }
}

/// State and current holder for a single motor.
#[derive(Debug, Clone)]
pub struct MotorStatus {
    state: MotorState,
    rms_current: u16,
    peak_current: u16,
    max_peak_current: u16,
}

impl MotorStatus {
    /// Create a disabled motor with an RMS current and board peak limit (mA).
    pub fn new(rms_current: u16, max_peak_current: u16) -> Self {
        let mut status = Self {
            state: MotorState::Disabled,
            rms_current: 0,
            peak_current: 0,
            max_peak_current,
        };
        status.set_rms_current(rms_current);
        status
    }

    /// Create from motor configuration.
    pub fn from_config(config: &MotorConfig) -> Self {
        Self::new(config.rms_current_ma, config.max_peak_current_ma)
    }

    /// Peak coil current in milliamps.
    #[inline]
    pub fn peak_current(&self) -> u16 {
        self.peak_current
    }

    /// Largest RMS current the board limit allows.
    #[inline]
    pub fn max_rms_current(&self) -> u16 {
        (self.max_peak_current as f32 / PEAK_TO_RMS) as u16
    }
}

impl MotorControl for MotorStatus {
    fn state(&self) -> MotorState {
        self.state
    }

    fn set_state(&mut self, state: MotorState, clear_errors: bool) -> bool {
        if self.state == state {
            return false;
        }
        if !clear_errors && !self.state.follows_input() {
            return false;
        }

        debug!("motor state {} -> {}", self.state, state);
        self.state = state;
        true
    }

    fn rms_current(&self) -> u16 {
        self.rms_current
    }

    fn set_rms_current(&mut self, milliamps: u16) {
        self.rms_current = milliamps.min(self.max_rms_current());
        self.peak_current = ((self.rms_current as f32 * PEAK_TO_RMS) as u16).min(self.max_peak_current);
    }
}
