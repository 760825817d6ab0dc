//! Position, velocity, acceleration and temperature estimation.
//!
//! [`MotionEstimator`] turns raw sensor registers into smoothed physical
//! signals. Every public entry point holds the shared critical section for its
//! whole duration, so the correction interrupt never sees a half-updated
//! average or offset.
//!
//! Readings are retried up to `max_read_attempts` times; a sensor that keeps
//! failing is reported as [`SensorError::Unresponsive`] instead of hanging the
//! caller.

use embedded_hal::delay::DelayNs;

use crate::clock::Clock;
use crate::config::units::{Celsius, Degrees, DegreesPerSec, DegreesPerSecSquared};
use crate::config::{FilterConfig, SensorConfig, SpeedMode};
use crate::critical::InterruptMask;
use crate::error::{SensorError, SensorFault};
use crate::motor::{CoilDriver, MotorControl, ThermalAction, ThermalGuard};
use crate::sensor::{decode, Register, RegisterProtocol, SensorBus};

use super::average::{MovingAverage, MAX_WINDOW};
use super::derivative::{FirstDifference, SecondDifference};

type Window = MovingAverage<f32, MAX_WINDOW>;

/// Words in the angle/speed/revolution snapshot starting at `AVAL`.
const POSITION_BURST: usize = 3;

/// Words in the speed register burst starting at `ASPD`.
const SPEED_BURST: usize = 4;

/// Settling time between calibration readings.
const CALIBRATION_SETTLE_MS: u32 = 10;

/// Speed and acceleration from one position sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionSample {
    /// Averaged absolute angle the derivatives were taken from.
    pub position: Degrees,
    /// Averaged angular velocity.
    pub speed: DegreesPerSec,
    /// Averaged angular acceleration.
    pub acceleration: DegreesPerSecSquared,
}

/// Smoothed motion signals derived from the angle sensor.
pub struct MotionEstimator<'cs, B, M, C>
where
    B: SensorBus,
    M: InterruptMask,
    C: Clock,
{
    protocol: RegisterProtocol<'cs, B, M>,
    clock: C,
    speed_mode: SpeedMode,
    max_attempts: u32,

    startup_angle_offset: f32,
    startup_revolution_offset: i32,
    step_offset: f32,

    angle: Window,
    absolute_angle: Window,
    speed: Window,
    acceleration: Window,
    temperature: Window,

    speed_derivative: FirstDifference,
    acceleration_derivative: SecondDifference,
}

impl<'cs, B, M, C> MotionEstimator<'cs, B, M, C>
where
    B: SensorBus,
    M: InterruptMask,
    C: Clock,
{
    /// Create an estimator; call [`start`](Self::start) before reading.
    pub fn new(protocol: RegisterProtocol<'cs, B, M>, clock: C, sensor: &SensorConfig, filters: &FilterConfig) -> Self {
        Self {
            protocol,
            clock,
            speed_mode: sensor.speed_mode,
            max_attempts: sensor.max_read_attempts.max(1),
            startup_angle_offset: 0.0,
            startup_revolution_offset: 0,
            step_offset: 0.0,
            angle: Window::with_capacity(filters.angle),
            absolute_angle: Window::with_capacity(filters.absolute_angle),
            speed: Window::with_capacity(filters.speed),
            acceleration: Window::with_capacity(filters.acceleration),
            temperature: Window::with_capacity(filters.temperature),
            speed_derivative: FirstDifference::default(),
            acceleration_derivative: SecondDifference::default(),
        }
    }

    /// Prime the estimator at power-up.
    ///
    /// Fills the angle average, takes the current revolution count as zero and
    /// seeds both derivatives with the current position. The first speed and
    /// acceleration values after this are relative to the startup sample.
    pub fn start(&mut self) -> Result<(), SensorError> {
        let _guard = self.protocol.critical().enter();

        for _ in 0..self.angle.capacity() {
            self.angle(true)?;
        }

        let raw = self.read_word(Register::Arev)?;
        self.startup_revolution_offset = decode::revolutions(raw);

        let position = self.absolute_angle()?.0;
        let now = self.clock.now_micros();
        self.speed_derivative.seed(position, now);
        self.acceleration_derivative.seed(position, now);

        info!(
            "estimator started: revolution offset {=i32}, angle {=f32}",
            self.startup_revolution_offset,
            position
        );
        Ok(())
    }

    /// Single-turn angle relative to the logical zero.
    ///
    /// The reading always feeds the angle average; `use_average` selects
    /// whether the average or the instantaneous value is returned.
    pub fn angle(&mut self, use_average: bool) -> Result<Degrees, SensorError> {
        let _guard = self.protocol.critical().enter();

        let raw = self.read_word(Register::Aval)?;
        let angle = self.record_angle(raw);
        Ok(Degrees(if use_average { self.angle.value() } else { angle }))
    }

    /// Signed revolution count relative to the logical zero.
    pub fn absolute_revolution(&mut self) -> Result<i32, SensorError> {
        let _guard = self.protocol.critical().enter();

        let raw = self.read_word(Register::Arev)?;
        Ok(decode::revolutions(raw) - self.startup_revolution_offset)
    }

    /// Averaged continuous angle: revolutions × 360 plus the single-turn angle.
    ///
    /// Angle and revolution come from one burst, so the pair is always
    /// consistent across a wrap.
    pub fn absolute_angle(&mut self) -> Result<Degrees, SensorError> {
        let _guard = self.protocol.critical().enter();

        let mut words = [0u16; POSITION_BURST];
        self.retry(|protocol| protocol.read_multiple(Register::Aval, &mut words[..]))?;

        let angle = self.record_angle(words[0]);
        let revolution = decode::revolutions(words[2]) - self.startup_revolution_offset;
        self.absolute_angle.add(revolution as f32 * 360.0 + angle);
        Ok(Degrees(self.absolute_angle.value()))
    }

    /// Averaged angular velocity.
    pub fn speed(&mut self) -> Result<DegreesPerSec, SensorError> {
        let _guard = self.protocol.critical().enter();

        match self.speed_mode {
            SpeedMode::FiniteDifference => {
                let position = self.absolute_angle()?.0;
                let now = self.clock.now_micros();
                if let Some(rate) = self.speed_derivative.update(position, now) {
                    self.speed.add(rate);
                }
            }
            SpeedMode::SpeedRegister => self.sample_speed_register()?,
        }
        Ok(DegreesPerSec(self.speed.value()))
    }

    /// Averaged angular acceleration.
    pub fn acceleration(&mut self) -> Result<DegreesPerSecSquared, SensorError> {
        let _guard = self.protocol.critical().enter();

        let position = self.absolute_angle()?.0;
        let now = self.clock.now_micros();
        if let Some(rate) = self.acceleration_derivative.update(position, now) {
            self.acceleration.add(rate);
        }
        Ok(DegreesPerSecSquared(self.acceleration.value()))
    }

    /// Read the position once and feed both derivatives from it.
    pub fn sample_motion(&mut self) -> Result<MotionSample, SensorError> {
        let _guard = self.protocol.critical().enter();

        let position = self.absolute_angle()?.0;
        let now = self.clock.now_micros();

        match self.speed_mode {
            SpeedMode::FiniteDifference => {
                if let Some(rate) = self.speed_derivative.update(position, now) {
                    self.speed.add(rate);
                }
            }
            SpeedMode::SpeedRegister => self.sample_speed_register()?,
        }
        if let Some(rate) = self.acceleration_derivative.update(position, now) {
            self.acceleration.add(rate);
        }

        Ok(MotionSample {
            position: Degrees(position),
            speed: DegreesPerSec(self.speed.value()),
            acceleration: DegreesPerSecSquared(self.acceleration.value()),
        })
    }

    /// Averaged speed in revolutions per minute.
    pub fn rpm(&mut self) -> Result<f32, SensorError> {
        Ok(self.speed()?.to_rpm())
    }

    /// Averaged die temperature, applied to the thermal guard.
    ///
    /// Reading the temperature may change the motor state or current.
    pub fn temperature<MC>(&mut self, guard: &mut ThermalGuard, motor: &mut MC) -> Result<Celsius, SensorError>
    where
        MC: MotorControl + ?Sized,
    {
        let _guard = self.protocol.critical().enter();

        let raw = self.read_word(Register::Fsync)?;
        self.temperature.add(decode::temperature_celsius(raw));
        let temperature = Celsius(self.temperature.value());

        let now = self.clock.now_secs();
        if guard.evaluate(temperature, now, motor) != ThermalAction::None {
            debug!("motor state after thermal check: {}", motor.state());
        }
        Ok(temperature)
    }

    /// Make the current instantaneous position the logical zero.
    ///
    /// Clears the position averages and reseeds the derivatives so the jump
    /// does not show up as motion.
    pub fn zero(&mut self) -> Result<(), SensorError> {
        let _guard = self.protocol.critical().enter();

        let angle = self.angle(false)?.0;
        let revolution = self.absolute_revolution()?;
        self.startup_angle_offset += angle;
        self.startup_revolution_offset += revolution;

        self.angle.clear();
        self.absolute_angle.clear();
        let position = self.absolute_angle()?.0;
        let now = self.clock.now_micros();
        self.speed_derivative.seed(position, now);
        self.acceleration_derivative.seed(position, now);

        info!("position zeroed");
        Ok(())
    }

    /// Set the calibration offset subtracted from every angle reading.
    pub fn set_step_offset(&mut self, offset: Degrees) {
        let _guard = self.protocol.critical().enter();
        self.step_offset = offset.0;
    }

    /// Calibration offset subtracted from every angle reading.
    #[inline]
    pub fn step_offset(&self) -> Degrees {
        Degrees(self.step_offset)
    }

    /// Measure the sensor offset from the nearest full step.
    ///
    /// Holds the rotor at electrical step 0, flushes the angle average with
    /// fresh readings and folds the settled angle into `[0, full_step_angle)`.
    /// The result is returned, not applied; pass it to
    /// [`set_step_offset`](Self::set_step_offset).
    pub fn calibrate_step_offset<D, DL>(
        &mut self,
        coils: &mut D,
        delay: &mut DL,
        full_step_angle: Degrees,
    ) -> Result<Degrees, SensorError>
    where
        D: CoilDriver + ?Sized,
        DL: DelayNs,
    {
        let _guard = self.protocol.critical().enter();

        coils.drive_coils(0);
        for _ in 0..2 * self.angle.capacity() {
            self.angle(true)?;
            delay.delay_ms(CALIBRATION_SETTLE_MS);
        }

        // Undo the offset currently applied to get the raw distance to step 0
        let measured = self.angle(true)?.0 + self.step_offset;
        let offset = fold_into_step(measured, full_step_angle.0);
        info!("calibrated step offset: {=f32} deg", offset);
        Ok(Degrees(offset))
    }

    /// Startup angle offset.
    #[inline]
    pub fn startup_angle_offset(&self) -> Degrees {
        Degrees(self.startup_angle_offset)
    }

    /// Startup revolution offset.
    #[inline]
    pub fn startup_revolution_offset(&self) -> i32 {
        self.startup_revolution_offset
    }

    /// Configured speed strategy.
    #[inline]
    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// The register protocol.
    #[inline]
    pub fn protocol(&self) -> &RegisterProtocol<'cs, B, M> {
        &self.protocol
    }

    /// Mutable access to the register protocol.
    pub fn protocol_mut(&mut self) -> &mut RegisterProtocol<'cs, B, M> {
        &mut self.protocol
    }

    /// Mutable access to the clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn record_angle(&mut self, aval: u16) -> f32 {
        let angle = decode::angle_degrees(aval) - (self.startup_angle_offset + self.step_offset);
        self.angle.add(angle);
        angle
    }

    fn sample_speed_register(&mut self) -> Result<(), SensorError> {
        let mut words = [0u16; SPEED_BURST];
        self.retry(|protocol| protocol.read_multiple(Register::Aspd, &mut words[..]))?;
        self.speed.add(decode::speed_degrees_per_sec(&words));
        Ok(())
    }

    fn read_word(&mut self, register: Register) -> Result<u16, SensorError> {
        self.retry(|protocol| protocol.read_register(register))
    }

    /// Run `attempt` until it succeeds, gives a static error or runs out of attempts.
    fn retry<T, F>(&mut self, mut attempt: F) -> Result<T, SensorError>
    where
        F: FnMut(&mut RegisterProtocol<'cs, B, M>) -> Result<T, SensorError>,
    {
        let mut last = SensorFault::Bus;
        for _ in 0..self.max_attempts {
            match attempt(&mut self.protocol) {
                Ok(value) => return Ok(value),
                Err(e) => match e.fault() {
                    Some(fault) => last = fault,
                    None => return Err(e),
                },
            }
        }

        error!("sensor unresponsive after {=u32} attempts", self.max_attempts);
        Err(SensorError::Unresponsive {
            attempts: self.max_attempts,
            last,
        })
    }
}

/// Fold an angle into `[0, step)`.
fn fold_into_step(angle: f32, step: f32) -> f32 {
    let folded = libm::fmodf(angle, step);
    if folded < 0.0 {
        folded + step
    } else {
        folded
    }
}
