//! Servo configuration - root configuration structure.

use serde::Deserialize;

use super::correction::{CorrectionConfig, DirectSteppingConfig, StallConfig};
use super::filter::FilterConfig;
use super::motor::MotorConfig;
use super::sensor::SensorConfig;
use super::thermal::ThermalConfig;

/// Root configuration structure from TOML.
///
/// Every section is optional; missing sections and keys take the board defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Angle sensor protocol.
    pub sensor: SensorConfig,

    /// Averaging windows.
    pub filters: FilterConfig,

    /// Motor geometry and driver.
    pub motor: MotorConfig,

    /// Correction loop.
    pub correction: CorrectionConfig,

    /// Stall detection.
    pub stall: StallConfig,

    /// Overtemperature protection.
    pub thermal: ThermalConfig,

    /// Direct stepping.
    pub direct_stepping: DirectSteppingConfig,
}
