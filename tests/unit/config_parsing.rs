//! Unit tests for TOML configuration parsing.

use stepper_servo::config::{
    load_config, parse_config, Celsius, CorrectionMode, Degrees, Microsteps, ServoConfig, SpeedMode,
};
use stepper_servo::error::{ConfigError, Error};

/// Test parsing every section of a configuration file.
#[test]
fn test_parse_full_config() {
    let toml_str = r#"
[sensor]
verify_safety = true
max_read_attempts = 4
speed_mode = "speed_register"

[filters]
angle = 8
absolute_angle = 4
speed = 2
acceleration = 2
temperature = 64

[motor]
full_step_angle_deg = 0.9
microsteps = 16
microstep_multiplier = 2
reversed = true
enable_inverted = true
rms_current_ma = 800

[correction]
update_frequency_hz = 100.0
mode = "pid"

[correction.pid]
kp = 500.0
ki = 1.0
kd = 0.5
min_step_rate_hz = 10.0

[stall]
fault_time_sec = 0.5
fault_step_count = 20

[thermal]
warning_c = 65.0
shutdown_c = 75.0
clear_c = 60.0

[direct_stepping]
default_rate_hz = 400
"#;

    let config = parse_config(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.sensor.max_read_attempts, 4);
    assert_eq!(config.sensor.speed_mode, SpeedMode::SpeedRegister);
    assert_eq!(config.filters.angle, 8);
    assert_eq!(config.filters.temperature, 64);
    assert_eq!(config.motor.full_step_angle, Degrees(0.9));
    assert_eq!(config.motor.microsteps, Microsteps::SIXTEENTH);
    assert_eq!(config.motor.microstep_multiplier, 2);
    assert!(config.motor.reversed);
    assert!(config.motor.enable_inverted);
    assert_eq!(config.motor.rms_current_ma, 800);
    assert_eq!(config.correction.mode, CorrectionMode::Pid);
    assert_eq!(config.correction.pid.kd, 0.5);
    assert_eq!(config.correction.pid.min_step_rate_hz, 10.0);
    assert_eq!(config.stall.fault_step_count, 20);
    assert_eq!(config.thermal.clear, Celsius(60.0));
    assert_eq!(config.direct_stepping.default_rate_hz, 400);
}

/// Omitted sections and keys fall back to the defaults.
#[test]
fn test_partial_config_uses_defaults() {
    let config = parse_config("[motor]\nreversed = true\n").expect("Failed to parse TOML");

    assert!(config.motor.reversed);
    assert_eq!(config.motor.microsteps, Microsteps::THIRTY_SECOND);
    assert_eq!(config.correction, ServoConfig::default().correction);
    assert_eq!(config.thermal.shutdown, Celsius(80.0));
}

/// Test that a microstep value that is not a power of two is rejected.
#[test]
fn test_invalid_microsteps_rejected() {
    let result = parse_config("[motor]\nmicrosteps = 12\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Test that an unknown speed mode is rejected.
#[test]
fn test_unknown_speed_mode_rejected() {
    let result = parse_config("[sensor]\nspeed_mode = \"doppler\"\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}

/// Parsing also validates.
#[test]
fn test_parse_runs_validation() {
    let result = parse_config("[filters]\nspeed = 0\n");
    assert_eq!(
        result,
        Err(Error::Config(ConfigError::InvalidWindow {
            signal: "speed",
            size: 0,
        }))
    );
}

#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("stepper-servo-{}.toml", std::process::id()));
    std::fs::write(&path, "[correction]\nmode = \"pid\"\n").expect("Failed to write config");

    let config = load_config(&path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.expect("Failed to load config").correction.mode, CorrectionMode::Pid);
}

#[test]
fn test_load_missing_file() {
    let result = load_config("/nonexistent/stepper-servo.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
}
