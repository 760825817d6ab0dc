//! The servo context tying sensor, correction loop and motor together.
//!
//! [`ServoController`] owns every piece of shared motion state. Interrupt
//! handlers call its entry points (`step_pulse`, `scheduled_step`,
//! `correction_tick`, `fine_correction_step`); the foreground calls the rest.
//! Each entry point holds the shared critical section while it runs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;
use crate::config::units::{Celsius, Degrees, Microsteps};
use crate::critical::InterruptMask;
use crate::error::{MotorError, Result};
use crate::motion::{Direction, MotionEstimator};
use crate::sensor::SensorBus;

use super::builder::ServoControllerBuilder;
use super::correction::{CorrectionScheduler, TickOutcome};
use super::drive::{CoilDriver, StepTimer};
use super::fault::ThermalGuard;
use super::schedule::DirectStepper;
use super::state::{MotorControl, MotorState};

/// Closed-loop servo built from a sensor, a motor and its timers.
pub struct ServoController<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS>
where
    B: SensorBus,
    M: InterruptMask,
    C: Clock,
    MC: MotorControl,
    D: CoilDriver,
    EN: InputPin,
    FAULT: OutputPin,
    LED: OutputPin,
    TC: StepTimer,
    TF: StepTimer,
    TS: StepTimer,
{
    pub(super) estimator: MotionEstimator<'cs, B, M, C>,
    pub(super) scheduler: CorrectionScheduler<EN, FAULT, LED, TC, TF>,
    pub(super) stepper: DirectStepper<TS>,
    pub(super) thermal: ThermalGuard,
    pub(super) motor: MC,
    pub(super) coils: D,
    pub(super) reversed: bool,
    pub(super) timers_enabled: bool,
}

impl<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS> ServoController<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS>
where
    B: SensorBus,
    M: InterruptMask,
    C: Clock,
    MC: MotorControl,
    D: CoilDriver,
    EN: InputPin,
    FAULT: OutputPin,
    LED: OutputPin,
    TC: StepTimer,
    TF: StepTimer,
    TS: StepTimer,
{
    /// Start building a controller.
    pub fn builder() -> ServoControllerBuilder<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS> {
        ServoControllerBuilder::new()
    }

    /// Bring the servo up: prime the estimator, hold the rotor where it is
    /// and start the correction timer.
    pub fn start(&mut self) -> Result<()> {
        let _guard = self.estimator.protocol().critical().enter();

        self.estimator.start()?;
        let position = self.estimator.absolute_angle()?;
        self.scheduler.hold_position(position, &mut self.coils);
        self.enable_timers();

        info!("servo started at {=f32} deg", position.0);
        Ok(())
    }

    /// Step input interrupt body.
    ///
    /// `dir_level` is the level of the DIR input. Moves by the microstep
    /// multiplier and updates the target.
    pub fn step_pulse(&mut self, dir_level: bool) {
        let _guard = self.estimator.protocol().critical().enter();

        let direction = Direction::from_pin(dir_level, self.reversed);
        self.scheduler.step(direction, true, true, &mut self.coils);
    }

    /// Step schedule timer interrupt body.
    pub fn scheduled_step(&mut self) {
        let _guard = self.estimator.protocol().critical().enter();

        if let Some(direction) = self.stepper.on_timer() {
            self.scheduler.step(direction, true, true, &mut self.coils);
        }
    }

    /// Correction timer interrupt body.
    ///
    /// A sensor failure skips the tick and leaves the motor state alone.
    pub fn correction_tick(&mut self) -> Result<TickOutcome> {
        let _guard = self.estimator.protocol().critical().enter();

        let position = self.estimator.absolute_angle()?;
        let outcome = self.scheduler.tick(position, &mut self.motor, &mut self.coils)?;
        Ok(outcome)
    }

    /// Fine-correction timer interrupt body.
    pub fn fine_correction_step(&mut self) {
        let _guard = self.estimator.protocol().critical().enter();
        self.scheduler.fine_correction_step(&mut self.coils);
    }

    /// Start an open-loop move of `count` steps.
    pub fn schedule_steps(&mut self, count: u64, rate_hz: u32, direction: Direction) -> core::result::Result<(), MotorError> {
        let _guard = self.estimator.protocol().critical().enter();
        self.stepper.schedule_steps(count, rate_hz, direction)
    }

    /// Resume the correction timer and any suspended step schedule.
    pub fn enable_timers(&mut self) {
        let _guard = self.estimator.protocol().critical().enter();

        self.scheduler.start_correction();
        self.stepper.resume();
        self.timers_enabled = true;
    }

    /// Pause every motion timer; the motor is left alone.
    pub fn disable_timers(&mut self) {
        let _guard = self.estimator.protocol().critical().enter();

        self.scheduler.stop_correction();
        self.stepper.suspend();
        self.timers_enabled = false;
    }

    /// Whether the motion timers are running.
    #[inline]
    pub fn timers_enabled(&self) -> bool {
        self.timers_enabled
    }

    /// Measured absolute angle minus the target angle.
    pub fn angle_error(&mut self) -> Result<Degrees> {
        let _guard = self.estimator.protocol().critical().enter();

        let position = self.estimator.absolute_angle()?;
        Ok(position - self.scheduler.desired_angle())
    }

    /// Measure and apply the sensor step offset.
    ///
    /// Timers are paused during the measurement and the rotor is held at its
    /// new position afterwards.
    pub fn calibrate<DL: DelayNs>(&mut self, delay: &mut DL) -> Result<Degrees> {
        let _guard = self.estimator.protocol().critical().enter();

        let was_enabled = self.timers_enabled;
        self.disable_timers();

        let full_step_angle = self.scheduler.geometry().full_step_angle;
        let offset = self
            .estimator
            .calibrate_step_offset(&mut self.coils, delay, full_step_angle)?;
        self.estimator.set_step_offset(offset);

        let position = self.estimator.absolute_angle()?;
        self.scheduler.hold_position(position, &mut self.coils);
        if was_enabled {
            self.enable_timers();
        }
        Ok(offset)
    }

    /// Change the microstep divisor and the correction tick rate with it.
    pub fn set_microstepping(&mut self, microsteps: Microsteps) {
        let _guard = self.estimator.protocol().critical().enter();
        self.scheduler.set_microstepping(microsteps);
    }

    /// Read the temperature and apply the thermal guard.
    pub fn update_temperature(&mut self) -> Result<Celsius> {
        let _guard = self.estimator.protocol().critical().enter();
        Ok(self.estimator.temperature(&mut self.thermal, &mut self.motor)?)
    }

    /// Averaged speed in RPM.
    pub fn rpm(&mut self) -> Result<f32> {
        let _guard = self.estimator.protocol().critical().enter();
        Ok(self.estimator.rpm()?)
    }

    /// Request a motor state; see [`MotorControl::set_state`].
    pub fn set_state(&mut self, state: MotorState, clear_errors: bool) -> bool {
        let _guard = self.estimator.protocol().critical().enter();

        let changed = self.motor.set_state(state, clear_errors);
        if changed {
            info!("motor state -> {}", state.name());
        }
        changed
    }

    /// The motion estimator.
    pub fn estimator(&self) -> &MotionEstimator<'cs, B, M, C> {
        &self.estimator
    }

    /// Mutable access to the motion estimator.
    pub fn estimator_mut(&mut self) -> &mut MotionEstimator<'cs, B, M, C> {
        &mut self.estimator
    }

    /// The correction scheduler.
    pub fn scheduler(&self) -> &CorrectionScheduler<EN, FAULT, LED, TC, TF> {
        &self.scheduler
    }

    /// Mutable access to the correction scheduler.
    pub fn scheduler_mut(&mut self) -> &mut CorrectionScheduler<EN, FAULT, LED, TC, TF> {
        &mut self.scheduler
    }

    /// The direct stepper.
    pub fn stepper(&self) -> &DirectStepper<TS> {
        &self.stepper
    }

    /// The thermal guard.
    pub fn thermal(&self) -> &ThermalGuard {
        &self.thermal
    }

    /// The motor state holder.
    pub fn motor(&self) -> &MC {
        &self.motor
    }

    /// Mutable access to the motor state holder.
    pub fn motor_mut(&mut self) -> &mut MC {
        &mut self.motor
    }

    /// The coil driver.
    pub fn coils(&self) -> &D {
        &self.coils
    }
}
