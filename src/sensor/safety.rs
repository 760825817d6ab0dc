//! Safety word checking.
//!
//! The device answers every transaction with a safety word: three health flags
//! in the high byte and a CRC-8 of the command and data words in the low byte.
//! The health flags are active-low on the wire; a cleared bit reports the
//! error.

use crate::error::SensorError;

/// CRC-8 generator polynomial (x^8 + x^4 + x^3 + x^2 + 1).
pub const CRC_POLYNOMIAL: u8 = 0x1D;

/// CRC-8 seed.
pub const CRC_SEED: u8 = 0xFF;

fn crc_update(mut crc: u8, byte: u8) -> u8 {
    crc ^= byte;
    for _ in 0..8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ CRC_POLYNOMIAL
        } else {
            crc << 1
        };
    }
    crc
}

/// CRC-8 over raw bytes, complemented.
pub fn crc8_bytes(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(CRC_SEED, |crc, &byte| crc_update(crc, byte))
}

/// CRC-8 of a transaction: the command word, then each data word, big-endian.
pub fn crc8(command: u16, data: &[u16]) -> u8 {
    !core::iter::once(command)
        .chain(data.iter().copied())
        .flat_map(u16::to_be_bytes)
        .fold(CRC_SEED, crc_update)
}

/// Safety word returned after the data words of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyWord(pub u16);

impl SafetyWord {
    /// Set while the device has no system error.
    pub const SYSTEM_OK: u16 = 0x4000;
    /// Set while the last interface access was valid.
    pub const INTERFACE_OK: u16 = 0x2000;
    /// Set while the angle value is valid.
    pub const ANGLE_VALID: u16 = 0x1000;

    /// Safety word a healthy device returns for this transaction.
    pub fn healthy(command: u16, data: &[u16]) -> Self {
        Self(Self::SYSTEM_OK | Self::INTERFACE_OK | Self::ANGLE_VALID | crc8(command, data) as u16)
    }

    /// System error asserted.
    #[inline]
    pub const fn system_error(self) -> bool {
        self.0 & Self::SYSTEM_OK == 0
    }

    /// Interface access error asserted.
    #[inline]
    pub const fn interface_error(self) -> bool {
        self.0 & Self::INTERFACE_OK == 0
    }

    /// Invalid angle asserted.
    #[inline]
    pub const fn invalid_angle(self) -> bool {
        self.0 & Self::ANGLE_VALID == 0
    }

    /// Checksum carried in the low byte.
    #[inline]
    pub const fn crc(self) -> u8 {
        self.0 as u8
    }

    /// Check the flags, in priority order, then the checksum.
    pub fn validate(self, command: u16, data: &[u16]) -> Result<(), SensorError> {
        if self.system_error() {
            return Err(SensorError::SystemError);
        }
        if self.interface_error() {
            return Err(SensorError::InterfaceAccessError);
        }
        if self.invalid_angle() {
            return Err(SensorError::InvalidAngleError);
        }

        let computed = crc8(command, data);
        if computed != self.crc() {
            return Err(SensorError::CrcMismatch {
                computed,
                received: self.crc(),
            });
        }

        Ok(())
    }
}
