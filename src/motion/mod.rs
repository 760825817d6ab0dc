//! Motion module for stepper-servo.
//!
//! Signal smoothing, derivative estimation and the motion estimator built on
//! the angle sensor.

pub mod average;
mod derivative;
mod direction;
mod estimator;
mod pid;

pub use average::{MovingAverage, Sample, MAX_WINDOW};
pub use direction::Direction;
pub use estimator::{MotionEstimator, MotionSample};
pub use pid::PidController;
