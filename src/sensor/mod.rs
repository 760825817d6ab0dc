//! Angle sensor module.
//!
//! Register map, bit fields, safety word checking and the register protocol
//! for TLE5012-class magnetic angle sensors.

pub mod bitfield;
pub mod decode;
mod protocol;
pub mod registers;
mod safety;
mod transport;

pub use bitfield::{AccessMode, BitField, BIT_FIELDS, BIT_FIELD_COUNT};
pub use protocol::RegisterProtocol;
pub use registers::{Register, REGISTER_COUNT};
pub use safety::{crc8, crc8_bytes, SafetyWord};
pub use transport::{DataLineControl, FixedLine, LineMode, SensorBus, SpiSensorBus};
