//! Stall and overtemperature fault handling.

use crate::config::units::Celsius;
use crate::config::{StallConfig, ThermalConfig};

use super::state::{MotorControl, MotorState};

/// Counts out-of-tolerance correction ticks and latches a stall fault.
#[derive(Debug, Clone)]
pub struct StallDetector {
    enabled: bool,
    /// Ticks tolerated before latching (fault time × tick rate).
    tick_budget: f32,
    fault_step_count: u32,
    count: u32,
    latched: bool,
}

impl StallDetector {
    /// Create a detector for a correction loop ticking `tick_hz` times per second.
    pub fn new(config: &StallConfig, tick_hz: f32) -> Self {
        Self {
            enabled: config.enabled,
            tick_budget: config.fault_time_sec * tick_hz,
            fault_step_count: config.fault_step_count,
            count: 0,
            latched: false,
        }
    }

    /// Record an out-of-tolerance tick; returns whether the fault is latched.
    pub fn record(&mut self, step_error: i64) -> bool {
        if !self.enabled {
            return false;
        }

        self.count = self.count.saturating_add(1);
        if !self.latched
            && (self.count as f32 > self.tick_budget || step_error.unsigned_abs() > self.fault_step_count as u64)
        {
            warn!("stall detected: error {=i64} steps after {=u32} ticks", step_error, self.count);
            self.latched = true;
        }
        self.latched
    }

    /// Back in tolerance: reset the counter and release the fault.
    pub fn clear(&mut self) {
        if self.latched {
            info!("stall cleared");
        }
        self.count = 0;
        self.latched = false;
    }

    /// Whether the fault is latched.
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Consecutive out-of-tolerance ticks.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Rescale the tick budget after the tick rate changed.
    pub fn set_tick_budget(&mut self, ticks: f32) {
        self.tick_budget = ticks;
    }
}

/// Outcome of one thermal evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThermalAction {
    /// Nothing changed.
    None,
    /// Cooled below the clear threshold; motor returned to disabled.
    Cleared,
    /// Reached the shutdown threshold; motor forced to overtemperature.
    Shutdown,
    /// Current reduced; carries the new RMS current (mA).
    CurrentReduced(u16),
}

/// Overtemperature hysteresis and current back-off.
#[derive(Debug, Clone)]
pub struct ThermalGuard {
    enabled: bool,
    warning: Celsius,
    shutdown: Celsius,
    clear: Celsius,
    current_step_ma: u16,
    interval_secs: u64,
    last_adjustment_secs: u64,
}

impl ThermalGuard {
    /// Create a guard; the back-off interval starts counting at `now_secs`.
    pub fn new(config: &ThermalConfig, now_secs: u64) -> Self {
        Self {
            enabled: config.enabled,
            warning: config.warning,
            shutdown: config.shutdown,
            clear: config.clear,
            current_step_ma: config.current_step_ma,
            interval_secs: config.interval_sec as u64,
            last_adjustment_secs: now_secs,
        }
    }

    /// Apply a temperature reading to the motor.
    pub fn evaluate<C: MotorControl + ?Sized>(&mut self, temperature: Celsius, now_secs: u64, motor: &mut C) -> ThermalAction {
        if !self.enabled {
            return ThermalAction::None;
        }

        if motor.state() == MotorState::Overtemperature {
            if temperature < self.clear {
                info!("temperature back to normal");
                motor.set_state(MotorState::Disabled, true);
                return ThermalAction::Cleared;
            }
            return ThermalAction::None;
        }

        if temperature < self.warning {
            return ThermalAction::None;
        }

        if temperature >= self.shutdown {
            error!("overtemperature shutdown");
            motor.set_state(MotorState::Overtemperature, true);
            return ThermalAction::Shutdown;
        }

        if now_secs.saturating_sub(self.last_adjustment_secs) >= self.interval_secs {
            let reduced = motor.rms_current().saturating_sub(self.current_step_ma);
            motor.set_rms_current(reduced);
            self.last_adjustment_secs = now_secs;
            warn!("temperature high, current reduced to {=u16} mA", motor.rms_current());
            return ThermalAction::CurrentReduced(motor.rms_current());
        }

        ThermalAction::None
    }

    /// Time of the last current reduction.
    #[inline]
    pub fn last_adjustment_secs(&self) -> u64 {
        self.last_adjustment_secs
    }
}
