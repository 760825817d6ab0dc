//! Conversions from raw register words to physical values.

use super::bitfield::{ANGSPD, ANGVAL, FIRMD, REVOL, TEMPR};

/// Degrees per least significant bit of the angle value.
pub const DEGREES_PER_LSB: f32 = 360.0 / 32768.0;

/// Temperature offset of the compensated reading.
pub const TEMPERATURE_OFFSET: f32 = 152.0;

/// Temperature LSBs per degree Celsius.
pub const TEMPERATURE_DIVISOR: f32 = 2.776;

/// Sign-extend the lowest `bits` bits of `value`.
#[inline]
pub fn sign_extend(value: u16, bits: u32) -> i32 {
    let shift = 32 - bits;
    (((value as u32) << shift) as i32) >> shift
}

/// Angle within one turn, in degrees (`0..360`).
#[inline]
pub fn angle_degrees(aval: u16) -> f32 {
    DEGREES_PER_LSB * ANGVAL.extract(aval) as f32
}

/// Signed revolution count.
#[inline]
pub fn revolutions(arev: u16) -> i32 {
    sign_extend(REVOL.extract(arev), REVOL.width())
}

/// Die temperature in °C.
#[inline]
pub fn temperature_celsius(fsync: u16) -> f32 {
    (sign_extend(TEMPR.extract(fsync), TEMPR.width()) as f32 + TEMPERATURE_OFFSET) / TEMPERATURE_DIVISOR
}

/// Filter update period in microseconds for a FIR_MD setting.
pub fn fir_update_period_us(fir_md: u16) -> f32 {
    match fir_md & 0x3 {
        0 => 21.3,
        1 => 42.7,
        2 => 85.3,
        _ => 170.6,
    }
}

/// Angular speed in °/s from a burst read starting at the speed register.
///
/// `words` holds ASPD, AREV, FSYNC and MOD_1; the update rate comes from MOD_1.
pub fn speed_degrees_per_sec(words: &[u16; 4]) -> f32 {
    let raw = sign_extend(ANGSPD.extract(words[0]), ANGSPD.width());
    let period = fir_update_period_us(FIRMD.extract(words[3]));
    (DEGREES_PER_LSB * raw as f32) / (2.0 * period * 1e-6)
}
