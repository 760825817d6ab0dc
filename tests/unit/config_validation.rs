//! Unit tests for configuration validation.

use stepper_servo::config::{validate_config, Celsius, Degrees, ServoConfig};
use stepper_servo::error::{ConfigError, Error};

/// Test validation of the default configuration.
#[test]
fn test_default_config_passes_validation() {
    assert!(validate_config(&ServoConfig::default()).is_ok());
}

/// Test validation of a configuration parsed from TOML.
#[test]
fn test_valid_toml_passes_validation() {
    let toml_str = r#"
[motor]
full_step_angle_deg = 0.9
microstep_multiplier = 4

[thermal]
warning_c = 60.0
shutdown_c = 60.0
clear_c = 50.0
"#;

    let config: ServoConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_unsupported_full_step_angle() {
    let mut config = ServoConfig::default();
    config.motor.full_step_angle = Degrees(7.5);

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidFullStepAngle(7.5)))
    );
}

#[test]
fn test_zero_multiplier() {
    let mut config = ServoConfig::default();
    config.motor.microstep_multiplier = 0;

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidMicrostepMultiplier(0)))
    );
}

/// Windows larger than the filter storage are rejected.
#[test]
fn test_oversized_window() {
    let mut config = ServoConfig::default();
    config.filters.temperature = 100_000;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidWindow {
            signal: "temperature",
            ..
        }))
    ));
}

#[test]
fn test_zero_update_frequency() {
    let mut config = ServoConfig::default();
    config.correction.update_frequency_hz = 0.0;

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidFrequency {
            parameter: "update_frequency_hz",
            ..
        }))
    ));
}

#[test]
fn test_negative_gain() {
    let mut config = ServoConfig::default();
    config.correction.pid.ki = -1.0;

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidGain {
            parameter: "ki",
            value: -1.0,
        }))
    );
}

/// Test that a clear threshold above shutdown is rejected.
#[test]
fn test_thermal_thresholds_out_of_order() {
    let mut config = ServoConfig::default();
    config.thermal.clear = Celsius(90.0);

    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidThermalThresholds { .. }))
    ));
}

#[test]
fn test_zero_retry_limit() {
    let mut config = ServoConfig::default();
    config.sensor.max_read_attempts = 0;

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidRetryLimit(0)))
    );
}

#[test]
fn test_zero_stall_time() {
    let mut config = ServoConfig::default();
    config.stall.fault_time_sec = 0.0;

    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidFaultTime(0.0)))
    );
}
