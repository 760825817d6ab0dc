//! Configuration validation.

use crate::error::{ConfigError, Error, Result};
use crate::motion::average::MAX_WINDOW;

use super::correction::{CorrectionConfig, DirectSteppingConfig, StallConfig};
use super::filter::FilterConfig;
use super::motor::MotorConfig;
use super::sensor::SensorConfig;
use super::thermal::ThermalConfig;
use super::ServoConfig;

/// Validate a servo configuration.
///
/// Checks:
/// - Full-step angle is 1.8° or 0.9° and the microstep multiplier is at least 1
/// - Averaging windows fit the filter storage
/// - Frequencies are positive and PID gains non-negative
/// - Thermal thresholds are ordered (warning and clear not above shutdown)
pub fn validate_config(config: &ServoConfig) -> Result<()> {
    validate_sensor(&config.sensor)?;
    validate_filters(&config.filters)?;
    validate_motor(&config.motor)?;
    validate_correction(&config.correction)?;
    validate_stall(&config.stall)?;
    validate_thermal(&config.thermal)?;
    validate_direct_stepping(&config.direct_stepping)?;
    Ok(())
}

fn validate_sensor(config: &SensorConfig) -> Result<()> {
    if config.max_read_attempts == 0 {
        return Err(Error::Config(ConfigError::InvalidRetryLimit(config.max_read_attempts)));
    }
    Ok(())
}

fn validate_filters(config: &FilterConfig) -> Result<()> {
    for (signal, size) in config.windows() {
        if size == 0 || size > MAX_WINDOW {
            return Err(Error::Config(ConfigError::InvalidWindow { signal, size }));
        }
    }
    Ok(())
}

fn validate_motor(config: &MotorConfig) -> Result<()> {
    let angle = config.full_step_angle.0;
    if libm::fabsf(angle - 1.8) > 1e-4 && libm::fabsf(angle - 0.9) > 1e-4 {
        return Err(Error::Config(ConfigError::InvalidFullStepAngle(angle)));
    }

    if config.microstep_multiplier == 0 {
        return Err(Error::Config(ConfigError::InvalidMicrostepMultiplier(
            config.microstep_multiplier,
        )));
    }

    Ok(())
}

fn validate_correction(config: &CorrectionConfig) -> Result<()> {
    if config.update_frequency_hz <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidFrequency {
            parameter: "update_frequency_hz",
            value: config.update_frequency_hz,
        }));
    }

    let pid = &config.pid;
    for (parameter, value) in [
        ("kp", pid.kp),
        ("ki", pid.ki),
        ("kd", pid.kd),
        ("max_integral", pid.max_integral),
        ("min_step_rate_hz", pid.min_step_rate_hz),
    ] {
        if value < 0.0 {
            return Err(Error::Config(ConfigError::InvalidGain { parameter, value }));
        }
    }

    if pid.max_step_rate_hz <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidFrequency {
            parameter: "max_step_rate_hz",
            value: pid.max_step_rate_hz,
        }));
    }

    Ok(())
}

fn validate_stall(config: &StallConfig) -> Result<()> {
    if config.fault_time_sec <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidFaultTime(config.fault_time_sec)));
    }
    Ok(())
}

fn validate_thermal(config: &ThermalConfig) -> Result<()> {
    if config.warning > config.shutdown || config.clear > config.shutdown {
        return Err(Error::Config(ConfigError::InvalidThermalThresholds {
            warning: config.warning.0,
            shutdown: config.shutdown.0,
            clear: config.clear.0,
        }));
    }
    Ok(())
}

fn validate_direct_stepping(config: &DirectSteppingConfig) -> Result<()> {
    if config.default_rate_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidFrequency {
            parameter: "default_rate_hz",
            value: 0.0,
        }));
    }
    Ok(())
}
