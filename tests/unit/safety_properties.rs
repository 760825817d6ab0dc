//! Property tests for the safety word checksum.

use proptest::prelude::*;
use stepper_servo::sensor::{crc8, crc8_bytes, SafetyWord};
use stepper_servo::SensorError;

fn frame_bytes(command: u16, data: &[u16]) -> Vec<u8> {
    core::iter::once(command)
        .chain(data.iter().copied())
        .flat_map(u16::to_be_bytes)
        .collect()
}

proptest! {
    #[test]
    fn crc_matches_byte_stream(command in any::<u16>(), data in prop::collection::vec(any::<u16>(), 0..15)) {
        prop_assert_eq!(crc8(command, &data), crc8_bytes(&frame_bytes(command, &data)));
    }

    /// A CRC-8 catches every single-bit error.
    #[test]
    fn single_bit_flip_detected(
        bytes in prop::collection::vec(any::<u8>(), 1..32),
        bit in 0usize..256,
    ) {
        let bit = bit % (bytes.len() * 8);
        let mut flipped = bytes.clone();
        flipped[bit / 8] ^= 1 << (bit % 8);

        prop_assert_ne!(crc8_bytes(&bytes), crc8_bytes(&flipped));
    }

    #[test]
    fn healthy_word_validates(command in any::<u16>(), data in prop::collection::vec(any::<u16>(), 1..15)) {
        prop_assert_eq!(SafetyWord::healthy(command, &data).validate(command, &data), Ok(()));
    }

    #[test]
    fn corrupted_data_rejected(
        command in any::<u16>(),
        data in prop::collection::vec(any::<u16>(), 1..15),
        index in any::<prop::sample::Index>(),
        bit in 0u32..16,
    ) {
        let safety = SafetyWord::healthy(command, &data);
        let mut corrupted = data.clone();
        corrupted[index.index(data.len())] ^= 1 << bit;

        let result = safety.validate(command, &corrupted);
        prop_assert!(
            matches!(result, Err(SensorError::CrcMismatch { .. })),
            "expected a checksum mismatch, got {:?}",
            result
        );
    }
}
