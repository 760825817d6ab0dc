//! # stepper-servo
//!
//! Closed-loop servo core for stepper motors with a magnetic angle sensor,
//! built on embedded-hal 1.0.
//!
//! ## Features
//!
//! - **Sensor protocol**: register reads, burst reads and bit-field access for
//!   TLE5012-class sensors, with safety word and CRC checking
//! - **Motion estimation**: averaged angle, absolute angle, speed,
//!   acceleration and temperature
//! - **Closed-loop correction**: direct or PID correction, stall detection and
//!   overtemperature back-off
//! - **Configuration-driven**: every tuning parameter comes from a TOML file
//! - **no_std compatible**: the core works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_servo::{CriticalSection, ServoController, ServoPins};
//!
//! let config = stepper_servo::load_config("servo.toml")?;
//! let critical = CriticalSection::new(irq_mask);
//!
//! let mut servo = ServoController::builder()
//!     .config(config)
//!     .critical(&critical)
//!     .sensor_bus(SpiSensorBus::new(spi, cs_pin))
//!     .clock(clock)
//!     .motor(MotorStatus::new(500, 3500))
//!     .coils(coils)
//!     .pins(ServoPins { enable, stall_fault, led })
//!     .correction_timer(tim1)
//!     .fine_timer(tim2)
//!     .step_timer(tim3)
//!     .build()?;
//!
//! servo.start()?;
//!
//! // From the correction timer interrupt
//! servo.correction_tick()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Core modules
pub mod clock;
pub mod config;
pub mod critical;
pub mod error;
pub mod motion;
pub mod motor;
pub mod sensor;

#[cfg(test)]
mod testing;

// Re-exports for ergonomic API
pub use clock::Clock;
pub use config::{validate_config, ServoConfig, StepGeometry};
pub use critical::{CriticalGuard, CriticalSection, InterruptMask, NoInterrupts};
pub use error::{Error, Result, SensorError};
pub use motion::{Direction, MotionEstimator, MovingAverage};
pub use motor::{
    CoilDriver, MotorControl, MotorState, MotorStatus, ServoController, ServoPins, StepTimer, TickOutcome,
};
pub use sensor::{RegisterProtocol, SensorBus, SpiSensorBus};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Celsius, Degrees, DegreesPerSec, DegreesPerSecSquared, Microsteps, Steps};
