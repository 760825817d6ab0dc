//! Bit field access through the register protocol.

use stepper_servo::sensor::{AccessMode, Register, RegisterProtocol, BIT_FIELDS};
use stepper_servo::{CriticalSection, NoInterrupts, SensorError};

use super::sim::SimulatedSensor;

/// Every read-write field reads back what was written.
#[test]
fn test_read_write_fields_round_trip() {
    let cs = CriticalSection::new(NoInterrupts);
    let mut protocol = RegisterProtocol::new(SimulatedSensor::echo(), &cs, true);

    for field in BIT_FIELDS.iter().filter(|f| f.access == AccessMode::ReadWrite) {
        let max = field.mask >> field.offset;
        for value in [0, max, max / 2] {
            protocol.set_bit_field(field, value).expect("write failed");
            assert_eq!(protocol.get_bit_field(field), Ok(value), "field {}", field.name);
        }
    }
}

/// Writing a field leaves its neighbours alone.
#[test]
fn test_field_write_preserves_neighbours() {
    let cs = CriticalSection::new(NoInterrupts);
    let mut sensor = SimulatedSensor::echo();
    sensor.set(Register::Mod1, 0xC015);
    let mut protocol = RegisterProtocol::new(sensor, &cs, true);

    let clksel = BIT_FIELDS.iter().find(|f| f.name == "CLKSEL").expect("CLKSEL missing");
    protocol.read_register(Register::Mod1).expect("read failed");
    protocol.set_bit_field(clksel, 0).expect("write failed");

    assert_eq!(protocol.read_register(Register::Mod1), Ok(0xC005));
}

#[test]
fn test_access_mode_enforced() {
    let cs = CriticalSection::new(NoInterrupts);
    let mut protocol = RegisterProtocol::new(SimulatedSensor::echo(), &cs, true);

    for field in BIT_FIELDS.iter() {
        if !field.access.writable() {
            assert_eq!(
                protocol.set_bit_field(field, 1),
                Err(SensorError::FieldNotWritable(field.name))
            );
        }
        if !field.access.readable() {
            assert_eq!(
                protocol.get_bit_field(field),
                Err(SensorError::FieldNotReadable(field.name))
            );
        }
    }
    assert_eq!(cs.depth(), 0);
}
