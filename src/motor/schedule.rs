//! Open-loop fixed-count stepping.

use crate::config::DirectSteppingConfig;
use crate::error::MotorError;
use crate::motion::Direction;

use super::drive::StepTimer;

/// Fixed-count, fixed-rate step schedule driven by its own timer.
///
/// Bypasses the position error comparison: each timer interrupt calls
/// [`on_timer`](Self::on_timer) and steps in the scheduled direction until the
/// count runs out.
#[derive(Debug)]
pub struct DirectStepper<T: StepTimer> {
    timer: T,
    remaining: u64,
    direction: Direction,
    rate_hz: u32,
    default_rate_hz: u32,
}

impl<T: StepTimer> DirectStepper<T> {
    /// Create an idle stepper; the timer is paused.
    pub fn new(mut timer: T, config: &DirectSteppingConfig) -> Self {
        timer.pause();
        Self {
            timer,
            remaining: 0,
            direction: Direction::CounterClockwise,
            rate_hz: config.default_rate_hz,
            default_rate_hz: config.default_rate_hz,
        }
    }

    /// Arm the timer at `rate_hz` for `count` steps in `direction`.
    ///
    /// Replaces any schedule in progress. A zero count leaves the timer paused.
    pub fn schedule_steps(&mut self, count: u64, rate_hz: u32, direction: Direction) -> Result<(), MotorError> {
        if rate_hz == 0 {
            return Err(MotorError::InvalidStepRate(rate_hz));
        }

        self.timer.pause();
        self.remaining = count;
        self.direction = direction;
        self.rate_hz = rate_hz;
        if count > 0 {
            info!("scheduled {=u64} steps at {=u32} Hz", count, rate_hz);
            self.timer.start(rate_hz);
        }
        Ok(())
    }

    /// Schedule at the configured default rate.
    pub fn schedule_default(&mut self, count: u64, direction: Direction) -> Result<(), MotorError> {
        self.schedule_steps(count, self.default_rate_hz, direction)
    }

    /// Timer interrupt body: the direction to step in, if a step is due.
    ///
    /// The timer is paused once the last step is handed out.
    pub fn on_timer(&mut self) -> Option<Direction> {
        if self.remaining == 0 {
            self.timer.pause();
            return None;
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.timer.pause();
            debug!("step schedule finished");
        }
        Some(self.direction)
    }

    /// Drop the remaining steps and pause the timer.
    pub fn cancel(&mut self) {
        self.remaining = 0;
        self.timer.pause();
    }

    /// Steps still to take.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Whether a schedule is in progress.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// Direction of the current schedule.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Pause the timer without dropping the schedule.
    pub fn suspend(&mut self) {
        self.timer.pause();
    }

    /// Restart the timer of a suspended schedule.
    pub fn resume(&mut self) {
        if self.is_active() {
            self.timer.start(self.rate_hz);
        }
    }

    /// Rate of the current schedule.
    #[inline]
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// The step timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }
}
