//! Test doubles shared by the unit tests.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use heapless::Vec;

use crate::clock::Clock;
use crate::error::SensorError;
use crate::motor::{CoilDriver, StepTimer};
use crate::sensor::{LineMode, Register, SafetyWord, SensorBus, REGISTER_COUNT};

/// Recorded bus event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Event {
    Select,
    Deselect,
    Mode(LineMode),
    Exchange(usize),
}

/// Simulated sensor answering reads from `registers` with a healthy safety word.
pub(crate) struct SimSensor {
    pub registers: [u16; REGISTER_COUNT],
    /// Safety word returned instead of the healthy one.
    pub safety_override: Option<u16>,
    /// Number of upcoming reads answered with a system error.
    pub failures: u32,
    pub events: Vec<Event, 64>,
    pub written: Option<(u16, u16)>,
    command: Option<u16>,
}

impl SimSensor {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            safety_override: None,
            failures: 0,
            events: Vec::new(),
            written: None,
            command: None,
        }
    }

    pub fn set(&mut self, register: Register, value: u16) {
        self.registers[register.slot()] = value;
    }

    fn record(&mut self, event: Event) {
        // Long-running tests only care about the most recent events
        if self.events.is_full() {
            self.events.clear();
        }
        let _ = self.events.push(event);
    }
}

impl SensorBus for SimSensor {
    fn select(&mut self) -> Result<(), SensorError> {
        self.record(Event::Select);
        self.command = None;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), SensorError> {
        self.record(Event::Deselect);
        Ok(())
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        self.record(Event::Exchange(buf.len()));
        let Some(command) = self.command else {
            self.command = Some(u16::from_be_bytes([buf[0], buf[1]]));
            return Ok(());
        };

        let base = Register::from_address(command & 0x3F0).ok_or(SensorError::Bus)?;
        let words = (command & 0xF) as usize;

        if command & 0xF000 == 0x5000 {
            let value = u16::from_be_bytes([buf[0], buf[1]]);
            self.written = Some((command, value));
            self.registers[base.slot()] = value;
            if buf.len() == 4 {
                let safety = SafetyWord::healthy(command, &[value]).0;
                buf[2..].copy_from_slice(&safety.to_be_bytes());
            }
            return Ok(());
        }

        let mut data: Vec<u16, 16> = Vec::new();
        for i in 0..words.min(buf.len() / 2) {
            let value = base.burst_successor(i).map_or(0, |r| self.registers[r.slot()]);
            let _ = data.push(value);
            buf[2 * i..2 * i + 2].copy_from_slice(&value.to_be_bytes());
        }

        if buf.len() > 2 * words {
            let safety = if self.failures > 0 {
                self.failures -= 1;
                SafetyWord::INTERFACE_OK | SafetyWord::ANGLE_VALID
            } else {
                self.safety_override
                    .unwrap_or(SafetyWord::healthy(command, &data).0)
            };
            buf[2 * words..2 * words + 2].copy_from_slice(&safety.to_be_bytes());
        }
        Ok(())
    }

    fn set_line_mode(&mut self, mode: LineMode) -> Result<(), SensorError> {
        self.record(Event::Mode(mode));
        Ok(())
    }
}

/// Clock driven by the test through a shared cell.
pub(crate) struct TestClock<'a>(pub &'a Cell<u64>);

impl Clock for TestClock<'_> {
    fn now_micros(&mut self) -> u64 {
        self.0.get()
    }
}

/// Coil driver recording the last commanded step.
#[derive(Default)]
pub(crate) struct TestCoils {
    pub last: Option<i64>,
    pub calls: u32,
}

impl CoilDriver for TestCoils {
    fn drive_coils(&mut self, step: i64) {
        self.last = Some(step);
        self.calls += 1;
    }
}

/// Step timer recording its rate.
#[derive(Default)]
pub(crate) struct TestTimer {
    pub rate: Option<u32>,
    pub starts: u32,
}

impl StepTimer for TestTimer {
    fn start(&mut self, hz: u32) {
        self.rate = Some(hz);
        self.starts += 1;
    }

    fn pause(&mut self) {
        self.rate = None;
    }
}

/// Digital pin holding a level.
#[derive(Default)]
pub(crate) struct TestPin {
    pub high: bool,
}

impl TestPin {
    pub fn high() -> Self {
        Self { high: true }
    }
}

impl ErrorType for TestPin {
    type Error = Infallible;
}

impl InputPin for TestPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

impl OutputPin for TestPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}
