//! Angle sensor configuration.

use serde::Deserialize;

/// How rotor speed is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    /// Differentiate successive absolute angle readings.
    #[default]
    FiniteDifference,
    /// Read the sensor's own speed register.
    SpeedRegister,
}

/// Sensor protocol settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Read and check the safety word after every transaction.
    pub verify_safety: bool,

    /// Attempts before a reading is reported as unresponsive.
    pub max_read_attempts: u32,

    /// Speed estimation strategy.
    pub speed_mode: SpeedMode,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            verify_safety: true,
            max_read_attempts: 16,
            speed_mode: SpeedMode::FiniteDifference,
        }
    }
}
