//! Closed-loop position correction.
//!
//! [`CorrectionScheduler`] owns the step counters. The step input moves the
//! desired position, and the periodic correction tick compares it with the
//! measured rotor position and steps the coils back into tolerance.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::units::{Degrees, Microsteps, Steps};
use crate::config::{CorrectionConfig, CorrectionMode, StallConfig, StepGeometry};
use crate::error::MotorError;
use crate::motion::{Direction, PidController};

use super::drive::{CoilDriver, StepTimer};
use super::fault::StallDetector;
use super::state::{MotorControl, MotorState};

/// Step error, in microsteps, still considered in position.
pub const STEP_TOLERANCE: i64 = 1;

/// What a corrector asks the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Correction {
    /// Take one microstep now.
    Step(Direction),
    /// Step from the fine-correction timer at `rate_hz`.
    Timer {
        /// Fine-correction step rate.
        rate_hz: u32,
        /// Fine-correction direction.
        direction: Direction,
    },
    /// Stop the fine-correction timer.
    Pause,
}

/// Policy turning a position error into a correction.
pub trait MotionCorrector {
    /// Decide how to correct an out-of-tolerance error.
    ///
    /// `step_error` and `angle_error` are desired minus measured; `dt_ms` is the
    /// tick period.
    fn correct(&mut self, step_error: i64, angle_error: Degrees, dt_ms: f32) -> Correction;

    /// Forget accumulated state once back in tolerance.
    fn reset(&mut self) {}
}

/// Bang-bang correction: one step toward the desired position per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectCorrector;

impl MotionCorrector for DirectCorrector {
    fn correct(&mut self, step_error: i64, _angle_error: Degrees, _dt_ms: f32) -> Correction {
        Correction::Step(Direction::from_steps(step_error))
    }
}

/// PID correction driving the fine-correction timer.
#[derive(Debug, Clone)]
pub struct PidCorrector {
    pid: PidController,
    min_rate_hz: f32,
}

impl PidCorrector {
    /// Create from correction settings.
    pub fn new(config: &CorrectionConfig) -> Self {
        Self {
            pid: PidController::from_config(&config.pid),
            min_rate_hz: config.pid.min_step_rate_hz,
        }
    }

    /// The underlying controller.
    pub fn controller(&self) -> &PidController {
        &self.pid
    }
}

impl MotionCorrector for PidCorrector {
    fn correct(&mut self, _step_error: i64, angle_error: Degrees, dt_ms: f32) -> Correction {
        let output = libm::roundf(self.pid.update(angle_error.0, dt_ms));
        let rate = libm::fabsf(output);

        // Outputs at or under the threshold would only dither the rotor
        if rate == 0.0 || rate <= self.min_rate_hz {
            return Correction::Pause;
        }

        let direction = if output > 0.0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        };
        Correction::Timer {
            rate_hz: rate as u32,
            direction,
        }
    }

    fn reset(&mut self) {
        self.pid.reset();
    }
}

/// Correction policy selected by [`CorrectionMode`].
#[derive(Debug, Clone)]
pub enum Corrector {
    /// See [`DirectCorrector`].
    Direct(DirectCorrector),
    /// See [`PidCorrector`].
    Pid(PidCorrector),
}

impl Corrector {
    /// Build the configured policy.
    pub fn from_config(config: &CorrectionConfig) -> Self {
        match config.mode {
            CorrectionMode::Direct => Corrector::Direct(DirectCorrector),
            CorrectionMode::Pid => Corrector::Pid(PidCorrector::new(config)),
        }
    }

    /// The policy's mode.
    pub fn mode(&self) -> CorrectionMode {
        match self {
            Corrector::Direct(_) => CorrectionMode::Direct,
            Corrector::Pid(_) => CorrectionMode::Pid,
        }
    }
}

impl MotionCorrector for Corrector {
    fn correct(&mut self, step_error: i64, angle_error: Degrees, dt_ms: f32) -> Correction {
        match self {
            Corrector::Direct(c) => c.correct(step_error, angle_error, dt_ms),
            Corrector::Pid(c) => c.correct(step_error, angle_error, dt_ms),
        }
    }

    fn reset(&mut self) {
        match self {
            Corrector::Direct(c) => c.reset(),
            Corrector::Pid(c) => c.reset(),
        }
    }
}

/// Result of one correction tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Enable input released; motor disabled.
    Disabled,
    /// Motor held in a forced-disabled or fault state; nothing corrected.
    Idle,
    /// Within [`STEP_TOLERANCE`].
    InTolerance,
    /// A correction was issued.
    Corrected {
        /// Desired minus measured step.
        error: i64,
        /// Whether the stall fault is latched.
        stalled: bool,
    },
}

/// Digital lines used by the correction loop.
pub struct ServoPins<EN, FAULT, LED> {
    /// Enable input (active low unless `enable_inverted`).
    pub enable: EN,
    /// Stall fault output, high while a stall is latched.
    pub stall_fault: FAULT,
    /// Status LED, mirrors the stall fault.
    pub led: LED,
}

/// Step counters and the periodic correction loop.
pub struct CorrectionScheduler<EN, FAULT, LED, TC, TF>
where
    EN: InputPin,
    FAULT: OutputPin,
    LED: OutputPin,
    TC: StepTimer,
    TF: StepTimer,
{
    geometry: StepGeometry,
    microstep_multiplier: u16,
    enable_inverted: bool,

    desired_step: i64,
    current_step: i64,
    desired_angle: Degrees,
    current_angle: Degrees,
    last_measured_step: i64,

    corrector: Corrector,
    stall: StallDetector,

    pins: ServoPins<EN, FAULT, LED>,
    correction_timer: TC,
    correction_armed: bool,
    fine_timer: TF,
    fine_direction: Direction,
    fine_running: bool,
}

impl<EN, FAULT, LED, TC, TF> CorrectionScheduler<EN, FAULT, LED, TC, TF>
where
    EN: InputPin,
    FAULT: OutputPin,
    LED: OutputPin,
    TC: StepTimer,
    TF: StepTimer,
{
    /// Create a scheduler at step 0 with both timers stopped.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        geometry: StepGeometry,
        microstep_multiplier: u16,
        enable_inverted: bool,
        correction: &CorrectionConfig,
        stall: &StallConfig,
        pins: ServoPins<EN, FAULT, LED>,
        correction_timer: TC,
        fine_timer: TF,
    ) -> Self {
        Self {
            geometry,
            microstep_multiplier: microstep_multiplier.max(1),
            enable_inverted,
            desired_step: 0,
            current_step: 0,
            desired_angle: Degrees(0.0),
            current_angle: Degrees(0.0),
            last_measured_step: 0,
            corrector: Corrector::from_config(correction),
            stall: StallDetector::new(stall, geometry.tick_frequency_hz),
            pins,
            correction_timer,
            correction_armed: false,
            fine_timer,
            fine_direction: Direction::CounterClockwise,
            fine_running: false,
        }
    }

    /// One correction tick.
    ///
    /// `measured_angle` is the averaged absolute rotor angle.
    pub fn tick<MC, D>(&mut self, measured_angle: Degrees, motor: &mut MC, coils: &mut D) -> Result<TickOutcome, MotorError>
    where
        MC: MotorControl + ?Sized,
        D: CoilDriver + ?Sized,
    {
        let enable_high = self.pins.enable.is_high().map_err(|_| MotorError::PinError)?;
        let enable_asserted = enable_high == self.enable_inverted;

        if !enable_asserted && motor.state() != MotorState::ForcedEnabled {
            if motor.set_state(MotorState::Disabled, false) {
                debug!("motor disabled by enable input");
            }
            self.pause_fine();
            self.set_fault_outputs(false)?;
            return Ok(TickOutcome::Disabled);
        }

        if motor.set_state(MotorState::Enabled, false) {
            debug!("motor enabled by enable input");
        }
        if !motor.state().is_driving() {
            self.pause_fine();
            return Ok(TickOutcome::Idle);
        }

        let measured = self.geometry.angle_to_steps(measured_angle).0;
        self.last_measured_step = measured;
        let error = self.desired_step - measured;

        if error.abs() <= STEP_TOLERANCE {
            self.pause_fine();
            self.corrector.reset();
            self.stall.clear();
            self.set_fault_outputs(false)?;
            return Ok(TickOutcome::InTolerance);
        }

        let angle_error = self.desired_angle - measured_angle;
        let dt_ms = 1000.0 / self.geometry.tick_frequency_hz;
        match self.corrector.correct(error, angle_error, dt_ms) {
            Correction::Step(direction) => self.step(direction, false, false, coils),
            Correction::Timer { rate_hz, direction } => {
                self.fine_direction = direction;
                self.fine_timer.start(rate_hz);
                self.fine_running = true;
            }
            Correction::Pause => self.pause_fine(),
        }

        let stalled = self.stall.record(error);
        if stalled {
            self.set_fault_outputs(true)?;
        }
        Ok(TickOutcome::Corrected { error, stalled })
    }

    /// Move the coils by one step (or `microstep_multiplier` steps).
    ///
    /// With `update_desired` the target moves too; corrections leave it alone.
    pub fn step<D>(&mut self, direction: Direction, use_multiplier: bool, update_desired: bool, coils: &mut D)
    where
        D: CoilDriver + ?Sized,
    {
        let count = if use_multiplier {
            i64::from(self.microstep_multiplier)
        } else {
            1
        };
        let delta = direction.sign() * count;
        let angle = self.geometry.microstep_angle * delta as f32;

        if update_desired {
            self.desired_step += delta;
            self.desired_angle = self.desired_angle + angle;
        }
        self.current_step += delta;
        self.current_angle = self.current_angle + angle;

        coils.drive_coils(self.current_step);
    }

    /// Fine-correction timer body.
    pub fn fine_correction_step<D>(&mut self, coils: &mut D)
    where
        D: CoilDriver + ?Sized,
    {
        if self.fine_running {
            self.step(self.fine_direction, false, false, coils);
        }
    }

    /// Change the microstep divisor.
    ///
    /// Step counters are rescaled from their angles and the correction timer
    /// is rearmed at the new tick rate.
    pub fn set_microstepping(&mut self, microsteps: Microsteps) {
        if microsteps == self.geometry.microsteps {
            return;
        }

        self.geometry = self.geometry.with_microsteps(microsteps);
        self.desired_step = self.geometry.angle_to_steps(self.desired_angle).0;
        self.current_step = self.geometry.angle_to_steps(self.current_angle).0;
        self.stall.set_tick_budget(self.geometry.stall_tick_budget);

        if self.correction_timer_armed() {
            self.start_correction();
        }
        info!(
            "microstepping set to 1/{=u16}, tick {=f32} Hz",
            microsteps.value(),
            self.geometry.tick_frequency_hz
        );
    }

    /// Arm the correction timer at the tick rate.
    pub fn start_correction(&mut self) {
        self.correction_timer.start(libm::roundf(self.geometry.tick_frequency_hz) as u32);
        self.correction_armed = true;
    }

    /// Stop the correction timer and any fine correction.
    pub fn stop_correction(&mut self) {
        self.correction_timer.pause();
        self.correction_armed = false;
        self.pause_fine();
    }

    /// Set the desired position directly.
    pub fn set_desired_step(&mut self, steps: Steps) {
        self.desired_step = steps.0;
        self.desired_angle = self.geometry.steps_to_angle(steps);
    }

    /// Take the measured rotor angle as both the target and the driven position.
    pub fn hold_position<D>(&mut self, measured_angle: Degrees, coils: &mut D)
    where
        D: CoilDriver + ?Sized,
    {
        let step = self.geometry.angle_to_steps(measured_angle).0;
        self.desired_step = step;
        self.current_step = step;
        self.desired_angle = measured_angle;
        self.current_angle = measured_angle;
        self.last_measured_step = step;
        coils.drive_coils(step);
    }

    /// Make the current position the origin for both counters.
    pub fn reset_position(&mut self) {
        self.desired_step = 0;
        self.current_step = 0;
        self.desired_angle = Degrees(0.0);
        self.current_angle = Degrees(0.0);
    }

    /// Target position.
    #[inline]
    pub fn desired_step(&self) -> Steps {
        Steps(self.desired_step)
    }

    /// Electrical step the coils are driven to.
    #[inline]
    pub fn current_step(&self) -> Steps {
        Steps(self.current_step)
    }

    /// Target angle.
    #[inline]
    pub fn desired_angle(&self) -> Degrees {
        self.desired_angle
    }

    /// Electrical angle the coils are driven to.
    #[inline]
    pub fn current_angle(&self) -> Degrees {
        self.current_angle
    }

    /// Rotor step seen by the last enabled tick.
    #[inline]
    pub fn last_measured_step(&self) -> Steps {
        Steps(self.last_measured_step)
    }

    /// Step geometry in use.
    #[inline]
    pub fn geometry(&self) -> &StepGeometry {
        &self.geometry
    }

    /// The stall detector.
    #[inline]
    pub fn stall(&self) -> &StallDetector {
        &self.stall
    }

    /// Active correction policy.
    #[inline]
    pub fn corrector(&self) -> &Corrector {
        &self.corrector
    }

    /// Whether the fine-correction timer is running.
    #[inline]
    pub fn fine_running(&self) -> bool {
        self.fine_running
    }

    /// Direction of fine-correction steps.
    #[inline]
    pub fn fine_direction(&self) -> Direction {
        self.fine_direction
    }

    /// Whether the correction timer is armed.
    #[inline]
    pub fn correction_timer_armed(&self) -> bool {
        self.correction_armed
    }

    /// The digital lines.
    pub fn pins(&self) -> &ServoPins<EN, FAULT, LED> {
        &self.pins
    }

    /// Mutable access to the digital lines.
    pub fn pins_mut(&mut self) -> &mut ServoPins<EN, FAULT, LED> {
        &mut self.pins
    }

    /// The correction and fine-correction timers.
    pub fn timers(&self) -> (&TC, &TF) {
        (&self.correction_timer, &self.fine_timer)
    }

    fn pause_fine(&mut self) {
        if self.fine_running {
            self.fine_timer.pause();
            self.fine_running = false;
        }
    }

    fn set_fault_outputs(&mut self, asserted: bool) -> Result<(), MotorError> {
        let (fault, led) = if asserted {
            (self.pins.stall_fault.set_high(), self.pins.led.set_high())
        } else {
            (self.pins.stall_fault.set_low(), self.pins.led.set_low())
        };
        fault.map_err(|_| MotorError::PinError)?;
        led.map_err(|_| MotorError::PinError)
    }
}
