//! Correction loop, stall detection and direct stepping settings.

use serde::Deserialize;

/// Position correction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CorrectionMode {
    /// Step straight toward the measured position.
    #[default]
    Direct,
    /// Drive a fine-step timer from a PID controller.
    Pid,
}

/// PID gains and output limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    /// Proportional gain.
    pub kp: f32,
    /// Integral gain.
    pub ki: f32,
    /// Derivative gain.
    pub kd: f32,
    /// Integral term clamp (symmetric).
    pub max_integral: f32,
    /// Output clamp in steps per second.
    pub max_step_rate_hz: f32,
    /// Outputs below this rate pause the fine-step timer.
    pub min_step_rate_hz: f32,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 1000.0,
            ki: 2.0,
            kd: 0.0,
            max_integral: 10.0,
            max_step_rate_hz: 50_000.0,
            min_step_rate_hz: 0.0,
        }
    }
}

/// Correction loop settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Base update rate; the tick runs at this times the microstep divisor.
    pub update_frequency_hz: f32,
    /// Correction policy.
    pub mode: CorrectionMode,
    /// PID parameters (used in `pid` mode).
    pub pid: PidConfig,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            update_frequency_hz: 78.0,
            mode: CorrectionMode::Direct,
            pid: PidConfig::default(),
        }
    }
}

/// Stall detection settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StallConfig {
    /// Latch stall faults.
    pub enabled: bool,
    /// Seconds out of tolerance before a stall latches.
    pub fault_time_sec: f32,
    /// Error in microsteps that latches a stall immediately.
    pub fault_step_count: u32,
}

impl Default for StallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fault_time_sec: 1.0,
            fault_step_count: 10,
        }
    }
}

/// Direct stepping defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectSteppingConfig {
    /// Rate used when a request does not specify one.
    pub default_rate_hz: u32,
}

impl Default for DirectSteppingConfig {
    fn default() -> Self {
        Self { default_rate_hz: 1000 }
    }
}
