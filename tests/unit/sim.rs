//! Simulated hardware for the integration tests.
//!
//! The rotor follows the coils unless blocked, and the sensor reports the
//! rotor position through the register protocol with valid safety words.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stepper_servo::sensor::{LineMode, Register, SafetyWord, SensorBus, REGISTER_COUNT};
use stepper_servo::{Clock, CoilDriver, SensorError, StepTimer};

/// Mechanical state shared by the coils and the sensor.
#[derive(Clone)]
pub struct Rotor {
    angle: Rc<Cell<f32>>,
    blocked: Rc<Cell<bool>>,
    microstep_angle: Rc<Cell<f32>>,
}

impl Rotor {
    /// Rotor at `angle` driven by a 1.8° motor at 1/32 microstepping.
    pub fn at(angle: f32) -> Self {
        Self {
            angle: Rc::new(Cell::new(angle)),
            blocked: Rc::new(Cell::new(false)),
            microstep_angle: Rc::new(Cell::new(1.8 / 32.0)),
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle.get()
    }

    /// Rotor angle as a microstep index.
    pub fn step(&self) -> i64 {
        (self.angle.get() / self.microstep_angle.get()).round() as i64
    }

    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.set(blocked);
    }

    pub fn set_microstep_angle(&self, angle: f32) {
        self.microstep_angle.set(angle);
    }
}

/// Coils pulling the rotor to the commanded microstep.
pub struct FollowingCoils {
    rotor: Rotor,
    pub last: Option<i64>,
}

impl FollowingCoils {
    pub fn new(rotor: Rotor) -> Self {
        Self { rotor, last: None }
    }
}

impl CoilDriver for FollowingCoils {
    fn drive_coils(&mut self, step: i64) {
        self.last = Some(step);
        if !self.rotor.blocked.get() {
            self.rotor.angle.set(step as f32 * self.rotor.microstep_angle.get());
        }
    }
}

/// Angle sensor answering from the rotor position and a register array.
pub struct SimulatedSensor {
    rotor: Option<Rotor>,
    pub registers: [u16; REGISTER_COUNT],
    command: Option<u16>,
}

impl SimulatedSensor {
    /// Sensor reporting a rotor.
    pub fn on(rotor: Rotor) -> Self {
        Self {
            rotor: Some(rotor),
            registers: [0; REGISTER_COUNT],
            command: None,
        }
    }

    /// Sensor that stores writes and echoes them back.
    pub fn echo() -> Self {
        Self {
            rotor: None,
            registers: [0; REGISTER_COUNT],
            command: None,
        }
    }

    pub fn set(&mut self, register: Register, value: u16) {
        self.registers[register.slot()] = value;
    }

    fn value(&self, register: Register) -> u16 {
        let Some(rotor) = &self.rotor else {
            return self.registers[register.slot()];
        };

        let angle = rotor.angle();
        match register {
            Register::Aval => {
                let turn = angle.rem_euclid(360.0);
                let raw = (turn / 360.0 * 32768.0).round() as u32 % 32768;
                0x8000 | raw as u16
            }
            Register::Arev => ((angle / 360.0).floor() as i32 as u16) & 0x01FF,
            _ => self.registers[register.slot()],
        }
    }
}

impl SensorBus for SimulatedSensor {
    fn select(&mut self) -> Result<(), SensorError> {
        self.command = None;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        let Some(command) = self.command else {
            self.command = Some(u16::from_be_bytes([buf[0], buf[1]]));
            return Ok(());
        };

        let base = Register::from_address(command & 0x03F0).ok_or(SensorError::Bus)?;
        let words = usize::from(command & 0x000F);

        if command & 0xF000 == 0x5000 {
            let value = u16::from_be_bytes([buf[0], buf[1]]);
            self.registers[base.slot()] = value;
            if buf.len() == 4 {
                buf[2..].copy_from_slice(&SafetyWord::healthy(command, &[value]).0.to_be_bytes());
            }
            return Ok(());
        }

        let mut data = Vec::new();
        for i in 0..words.min(buf.len() / 2) {
            let value = base.burst_successor(i).map_or(0, |r| self.value(r));
            data.push(value);
            buf[2 * i..2 * i + 2].copy_from_slice(&value.to_be_bytes());
        }
        if buf.len() > 2 * words {
            let safety = SafetyWord::healthy(command, &data).0;
            buf[2 * words..2 * words + 2].copy_from_slice(&safety.to_be_bytes());
        }
        Ok(())
    }

    fn set_line_mode(&mut self, _mode: LineMode) -> Result<(), SensorError> {
        Ok(())
    }
}

/// Clock advanced by the test.
#[derive(Clone, Default)]
pub struct SharedClock(pub Rc<Cell<u64>>);

impl SharedClock {
    pub fn advance_secs(&self, secs: u64) {
        self.0.set(self.0.get() + secs * 1_000_000);
    }
}

impl Clock for SharedClock {
    fn now_micros(&mut self) -> u64 {
        self.0.get()
    }
}

/// Timer recording its rate.
#[derive(Default)]
pub struct RecordingTimer {
    pub rate: Option<u32>,
}

impl StepTimer for RecordingTimer {
    fn start(&mut self, hz: u32) {
        self.rate = Some(hz);
    }

    fn pause(&mut self) {
        self.rate = None;
    }
}

/// Digital line holding a level.
#[derive(Default)]
pub struct Level {
    pub high: bool,
}

impl ErrorType for Level {
    type Error = Infallible;
}

impl InputPin for Level {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

impl OutputPin for Level {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}
