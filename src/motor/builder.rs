//! Builder pattern for ServoController.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;
use crate::config::{validate_config, ServoConfig, StepGeometry};
use crate::critical::{CriticalSection, InterruptMask};
use crate::error::{ConfigError, Error, Result};
use crate::motion::MotionEstimator;
use crate::sensor::{RegisterProtocol, SensorBus};

use super::controller::ServoController;
use super::correction::{CorrectionScheduler, ServoPins};
use super::drive::{CoilDriver, StepTimer};
use super::fault::ThermalGuard;
use super::schedule::DirectStepper;
use super::state::MotorControl;

fn missing(component: &'static str) -> Error {
    Error::Config(ConfigError::MissingComponent(component))
}

/// Builder for creating ServoController instances.
pub struct ServoControllerBuilder<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS>
where
    M: InterruptMask,
{
    config: ServoConfig,
    critical: Option<&'cs CriticalSection<M>>,
    sensor_bus: Option<B>,
    clock: Option<C>,
    motor: Option<MC>,
    coils: Option<D>,
    pins: Option<ServoPins<EN, FAULT, LED>>,
    correction_timer: Option<TC>,
    fine_timer: Option<TF>,
    step_timer: Option<TS>,
}

impl<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS> Default
    for ServoControllerBuilder<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS>
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
    fn default() -> Self {
        Self::new()
    }
}

impl<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS> ServoControllerBuilder<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS>
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
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ServoConfig::default(),
            critical: None,
            sensor_bus: None,
            clock: None,
            motor: None,
            coils: None,
            pins: None,
            correction_timer: None,
            fine_timer: None,
            step_timer: None,
        }
    }

    /// Use a configuration (validated on build).
    pub fn config(mut self, config: ServoConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the critical section shared with the interrupt handlers.
    pub fn critical(mut self, critical: &'cs CriticalSection<M>) -> Self {
        self.critical = Some(critical);
        self
    }

    /// Set the angle sensor bus.
    pub fn sensor_bus(mut self, bus: B) -> Self {
        self.sensor_bus = Some(bus);
        self
    }

    /// Set the clock.
    pub fn clock(mut self, clock: C) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the motor state holder.
    pub fn motor(mut self, motor: MC) -> Self {
        self.motor = Some(motor);
        self
    }

    /// Set the coil driver.
    pub fn coils(mut self, coils: D) -> Self {
        self.coils = Some(coils);
        self
    }

    /// Set the enable input, stall fault output and status LED.
    pub fn pins(mut self, pins: ServoPins<EN, FAULT, LED>) -> Self {
        self.pins = Some(pins);
        self
    }

    /// Set the correction tick timer.
    pub fn correction_timer(mut self, timer: TC) -> Self {
        self.correction_timer = Some(timer);
        self
    }

    /// Set the fine-correction timer.
    pub fn fine_timer(mut self, timer: TF) -> Self {
        self.fine_timer = Some(timer);
        self
    }

    /// Set the step schedule timer.
    pub fn step_timer(mut self, timer: TS) -> Self {
        self.step_timer = Some(timer);
        self
    }

    /// Build the ServoController.
    ///
    /// Timers stay paused until [`ServoController::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a component is missing.
    #[allow(clippy::type_complexity)]
    pub fn build(self) -> Result<ServoController<'cs, B, M, C, MC, D, EN, FAULT, LED, TC, TF, TS>> {
        validate_config(&self.config)?;
        let config = self.config;

        let critical = self.critical.ok_or_else(|| missing("critical section"))?;
        let bus = self.sensor_bus.ok_or_else(|| missing("sensor bus"))?;
        let mut clock = self.clock.ok_or_else(|| missing("clock"))?;
        let motor = self.motor.ok_or_else(|| missing("motor"))?;
        let coils = self.coils.ok_or_else(|| missing("coil driver"))?;
        let pins = self.pins.ok_or_else(|| missing("pins"))?;
        let correction_timer = self.correction_timer.ok_or_else(|| missing("correction timer"))?;
        let fine_timer = self.fine_timer.ok_or_else(|| missing("fine-correction timer"))?;
        let step_timer = self.step_timer.ok_or_else(|| missing("step timer"))?;

        let thermal = ThermalGuard::new(&config.thermal, clock.now_secs());
        let protocol = RegisterProtocol::new(bus, critical, config.sensor.verify_safety);
        let estimator = MotionEstimator::new(protocol, clock, &config.sensor, &config.filters);

        let geometry = StepGeometry::from_config(&config.motor, &config.correction, &config.stall);
        let scheduler = CorrectionScheduler::new(
            geometry,
            config.motor.microstep_multiplier,
            config.motor.enable_inverted,
            &config.correction,
            &config.stall,
            pins,
            correction_timer,
            fine_timer,
        );

        Ok(ServoController {
            estimator,
            scheduler,
            stepper: DirectStepper::new(step_timer, &config.direct_stepping),
            thermal,
            motor,
            coils,
            reversed: config.motor.reversed,
            timers_enabled: false,
        })
    }
}
