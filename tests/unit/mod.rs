//! Unit test harness for stepper-servo.
//!
//! This module organizes unit tests for each component of the library.

mod averaging_properties;
mod bitfield_access;
mod config_parsing;
mod config_validation;
mod safety_properties;
pub mod sim;
