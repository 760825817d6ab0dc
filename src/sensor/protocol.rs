//! Register read/write transactions with safety checking.

use crate::critical::{CriticalSection, InterruptMask};
use crate::error::SensorError;

use super::bitfield::BitField;
use super::registers::{Register, MAX_BURST, READ_COMMAND, REGISTER_COUNT, SAFE_HIGH};
use super::safety::SafetyWord;
use super::transport::{LineMode, SensorBus};

/// Bytes needed for the largest data phase (burst plus safety word).
const FRAME_BYTES: usize = 2 * (MAX_BURST + 1);

/// Register-level access to the angle sensor.
///
/// Each call is a single attempt: errors are reported, never retried here.
/// Every transaction runs inside one hold of the shared critical section.
pub struct RegisterProtocol<'cs, B, M>
where
    B: SensorBus,
    M: InterruptMask,
{
    bus: B,
    critical: &'cs CriticalSection<M>,
    cache: [u16; REGISTER_COUNT],
    verify_safety: bool,
}

impl<'cs, B, M> RegisterProtocol<'cs, B, M>
where
    B: SensorBus,
    M: InterruptMask,
{
    /// Create a protocol driver on a sensor bus.
    pub fn new(bus: B, critical: &'cs CriticalSection<M>, verify_safety: bool) -> Self {
        Self {
            bus,
            critical,
            cache: [0; REGISTER_COUNT],
            verify_safety,
        }
    }

    /// Whether transactions read and check the safety word.
    #[inline]
    pub fn verify_safety(&self) -> bool {
        self.verify_safety
    }

    /// Enable or disable safety word checking.
    pub fn set_verify_safety(&mut self, verify: bool) {
        self.verify_safety = verify;
    }

    /// Last value read from or written to a register.
    #[inline]
    pub fn cached(&self, register: Register) -> u16 {
        self.cache[register.slot()]
    }

    /// The register cache, indexed by [`Register::slot`].
    #[inline]
    pub fn cache(&self) -> &[u16; REGISTER_COUNT] {
        &self.cache
    }

    /// The shared critical section.
    #[inline]
    pub fn critical(&self) -> &'cs CriticalSection<M> {
        self.critical
    }

    /// Mutable access to the bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the bus.
    pub fn release(self) -> B {
        self.bus
    }

    /// Read one register.
    pub fn read_register(&mut self, register: Register) -> Result<u16, SensorError> {
        let mut data = [0u16; 1];
        // SAFE_HIGH doubles as the one-word count
        let command = READ_COMMAND | register.address() | SAFE_HIGH;
        self.transact_read(command, &mut data)?;
        self.cache[register.slot()] = data[0];
        Ok(data[0])
    }

    /// Read `data.len()` consecutive registers starting at `register`.
    ///
    /// At most [`MAX_BURST`] words fit one command.
    pub fn read_multiple(&mut self, register: Register, data: &mut [u16]) -> Result<(), SensorError> {
        if data.is_empty() || data.len() > MAX_BURST {
            return Err(SensorError::InvalidLength(data.len()));
        }

        let command = register.read_command(data.len() as u16);
        self.transact_read(command, data)?;

        for (offset, &value) in data.iter().enumerate() {
            if let Some(successor) = register.burst_successor(offset) {
                self.cache[successor.slot()] = value;
            }
        }
        Ok(())
    }

    /// Write one register.
    pub fn write_register(&mut self, register: Register, value: u16) -> Result<(), SensorError> {
        let command = register.write_command();
        let _guard = self.critical.enter();

        let result = self.frame(command, |bus, verify| {
            let mut buf = [0xFF; 4];
            buf[..2].copy_from_slice(&value.to_be_bytes());
            let len = if verify { 4 } else { 2 };
            bus.exchange(&mut buf[..len])?;

            if verify {
                SafetyWord(u16::from_be_bytes([buf[2], buf[3]])).validate(command, &[value])?;
            }
            Ok(())
        });

        self.finish(command, result)?;
        self.cache[register.slot()] = value;
        Ok(())
    }

    /// Read a bit field from its register.
    pub fn get_bit_field(&mut self, field: &BitField) -> Result<u16, SensorError> {
        if !field.access.readable() {
            return Err(SensorError::FieldNotReadable(field.name));
        }

        let value = self.read_register(field.register)?;
        Ok(field.extract(value))
    }

    /// Merge a value into a bit field of the cached register and write it back.
    ///
    /// The cache only takes the merged value once the write succeeds.
    pub fn set_bit_field(&mut self, field: &BitField, value: u16) -> Result<(), SensorError> {
        if !field.access.writable() {
            return Err(SensorError::FieldNotWritable(field.name));
        }

        let merged = field.merge(self.cache[field.register.slot()], value);
        self.write_register(field.register, merged)
    }

    /// Check a safety word against the transaction it closes.
    pub fn validate_safety(&self, safety: u16, command: u16, data: &[u16]) -> Result<(), SensorError> {
        SafetyWord(safety).validate(command, data)
    }

    fn transact_read(&mut self, command: u16, data: &mut [u16]) -> Result<(), SensorError> {
        let _guard = self.critical.enter();

        let words = data.len();
        let result = self.frame(command, |bus, verify| {
            let mut buf = [0xFF; FRAME_BYTES];
            let len = 2 * (words + usize::from(verify));
            bus.exchange(&mut buf[..len])?;

            for (i, word) in data.iter_mut().enumerate() {
                *word = u16::from_be_bytes([buf[2 * i], buf[2 * i + 1]]);
            }

            if verify {
                let safety = u16::from_be_bytes([buf[2 * words], buf[2 * words + 1]]);
                SafetyWord(safety).validate(command, data)?;
            }
            Ok(())
        });

        self.finish(command, result)
    }

    /// One chip-select frame: command word push-pull, then the data phase open-drain.
    ///
    /// Chip select is released and the line restored whatever the outcome.
    fn frame<F>(&mut self, command: u16, data_phase: F) -> Result<(), SensorError>
    where
        F: FnOnce(&mut B, bool) -> Result<(), SensorError>,
    {
        self.bus.set_line_mode(LineMode::PushPull)?;
        self.bus.select()?;

        let result = self.command_then_data(command, data_phase);

        let restored = self.bus.set_line_mode(LineMode::PushPull);
        let released = self.bus.deselect();
        result.and(restored).and(released)
    }

    fn command_then_data<F>(&mut self, command: u16, data_phase: F) -> Result<(), SensorError>
    where
        F: FnOnce(&mut B, bool) -> Result<(), SensorError>,
    {
        let mut cmd = command.to_be_bytes();
        self.bus.exchange(&mut cmd)?;
        self.bus.set_line_mode(LineMode::OpenDrain)?;
        data_phase(&mut self.bus, self.verify_safety)
    }

    fn finish(&mut self, command: u16, result: Result<(), SensorError>) -> Result<(), SensorError> {
        if let Err(e) = result {
            warn!("sensor transaction {=u16:#x} failed: {}", command, e);
            if e.needs_safety_reset() {
                self.reset_safety();
            }
        }
        result
    }

    /// Clear latched device errors: safety read command then two blank exchanges.
    fn reset_safety(&mut self) {
        debug!("sensor safety reset");
        if self.reset_frame().is_err() {
            error!("sensor safety reset failed");
        }
    }

    fn reset_frame(&mut self) -> Result<(), SensorError> {
        self.bus.select()?;
        let mut command = (READ_COMMAND | SAFE_HIGH).to_be_bytes();
        let exchanged = self
            .bus
            .exchange(&mut command)
            .and_then(|_| self.bus.exchange(&mut [0xFF; 2]))
            .and_then(|_| self.bus.exchange(&mut [0xFF; 2]));
        let released = self.bus.deselect();
        exchanged.and(released)
    }
}
