//! Motor module for stepper-servo.
//!
//! Motor state, fault handling, the correction loop and the servo context
//! that owns them.

mod builder;
mod controller;
mod correction;
mod drive;
mod fault;
mod schedule;
pub mod state;

pub use builder::ServoControllerBuilder;
pub use controller::ServoController;
pub use correction::{
    Correction, CorrectionScheduler, Corrector, DirectCorrector, MotionCorrector, PidCorrector, ServoPins,
    TickOutcome, STEP_TOLERANCE,
};
pub use drive::{CoilDriver, StepTimer};
pub use fault::{StallDetector, ThermalAction, ThermalGuard};
pub use schedule::DirectStepper;
pub use state::{MotorControl, MotorState, MotorStatus};
