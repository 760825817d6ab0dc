//! Overtemperature protection settings.

use serde::Deserialize;

use super::units::Celsius;

/// Thermal back-off and shutdown thresholds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    /// Evaluate the thermal guard on temperature reads.
    pub enabled: bool,

    /// Start reducing current at or above this temperature.
    #[serde(rename = "warning_c")]
    pub warning: Celsius,

    /// Force the motor into overtemperature at or above this temperature.
    #[serde(rename = "shutdown_c")]
    pub shutdown: Celsius,

    /// Leave overtemperature once below this temperature.
    #[serde(rename = "clear_c")]
    pub clear: Celsius,

    /// Current reduction per back-off interval.
    pub current_step_ma: u16,

    /// Minimum seconds between two current reductions.
    pub interval_sec: u32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning: Celsius(70.0),
            shutdown: Celsius(80.0),
            clear: Celsius(70.0),
            current_step_ma: 50,
            interval_sec: 30,
        }
    }
}
