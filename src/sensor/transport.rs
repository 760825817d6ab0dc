//! Half-duplex serial link to the sensor.
//!
//! The sensor shares one data line for both directions. The command word is
//! clocked out with the line driven push-pull; the line is then released to
//! open-drain so the device can answer on it.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::SensorError;

/// Drive mode of the shared data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineMode {
    /// Host drives the line (command phase).
    PushPull,
    /// Line released for the device (data phase).
    OpenDrain,
}

/// Byte-level access to the sensor link.
pub trait SensorBus {
    /// Assert chip select.
    fn select(&mut self) -> Result<(), SensorError>;

    /// Release chip select once every byte has left the bus.
    fn deselect(&mut self) -> Result<(), SensorError>;

    /// Full-duplex exchange in place: `buf` is sent and overwritten with the reply.
    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), SensorError>;

    /// Switch the data line drive mode.
    fn set_line_mode(&mut self, mode: LineMode) -> Result<(), SensorError>;
}

impl<B: SensorBus + ?Sized> SensorBus for &mut B {
    fn select(&mut self) -> Result<(), SensorError> {
        (**self).select()
    }

    fn deselect(&mut self) -> Result<(), SensorError> {
        (**self).deselect()
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        (**self).exchange(buf)
    }

    fn set_line_mode(&mut self, mode: LineMode) -> Result<(), SensorError> {
        (**self).set_line_mode(mode)
    }
}

/// Reconfigures the data pin between push-pull and open-drain.
pub trait DataLineControl {
    /// Apply a drive mode.
    fn set_mode(&mut self, mode: LineMode);
}

/// Data line wired through an external driver that needs no switching.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLine;

impl DataLineControl for FixedLine {
    #[inline]
    fn set_mode(&mut self, _mode: LineMode) {}
}

/// [`SensorBus`] over an `embedded-hal` SPI bus and a chip-select pin.
///
/// The bus must be configured for mode 1 (CPOL 0, CPHA 1), MSB first.
pub struct SpiSensorBus<SPI, CS, LINE = FixedLine> {
    spi: SPI,
    cs: CS,
    line: LINE,
}

impl<SPI, CS> SpiSensorBus<SPI, CS, FixedLine>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Wrap a bus whose data line needs no mode switching.
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self::with_line_control(spi, cs, FixedLine)
    }
}

impl<SPI, CS, LINE> SpiSensorBus<SPI, CS, LINE>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    LINE: DataLineControl,
{
    /// Wrap a bus with a data line controller.
    pub fn with_line_control(spi: SPI, cs: CS, line: LINE) -> Self {
        Self { spi, cs, line }
    }

    /// Release the wrapped peripherals.
    pub fn release(self) -> (SPI, CS, LINE) {
        (self.spi, self.cs, self.line)
    }
}

impl<SPI, CS, LINE> SensorBus for SpiSensorBus<SPI, CS, LINE>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    LINE: DataLineControl,
{
    fn select(&mut self) -> Result<(), SensorError> {
        self.cs.set_low().map_err(|_| SensorError::Bus)
    }

    fn deselect(&mut self) -> Result<(), SensorError> {
        let flushed = self.spi.flush();
        // Chip select goes high even when the flush failed
        self.cs.set_high().map_err(|_| SensorError::Bus)?;
        flushed.map_err(|_| SensorError::Bus)
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), SensorError> {
        self.spi.transfer_in_place(buf).map_err(|_| SensorError::Bus)
    }

    fn set_line_mode(&mut self, mode: LineMode) -> Result<(), SensorError> {
        self.line.set_mode(mode);
        Ok(())
    }
}
