//! Configuration module for stepper-servo.
//!
//! Provides types for loading and validating the sensor, filter, motor,
//! correction and fault settings from TOML files (with `std` feature) or
//! pre-built values.

mod correction;
mod filter;
mod mechanical;
mod motor;
mod sensor;
mod system;
mod thermal;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use correction::{CorrectionConfig, CorrectionMode, DirectSteppingConfig, PidConfig, StallConfig};
pub use filter::FilterConfig;
pub use mechanical::StepGeometry;
pub use motor::{MotorConfig, PEAK_TO_RMS};
pub use sensor::{SensorConfig, SpeedMode};
pub use system::ServoConfig;
pub use thermal::ThermalConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Celsius, Degrees, DegreesPerSec, DegreesPerSecSquared, Microsteps, Steps};
