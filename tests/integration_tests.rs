//! Integration tests for stepper-servo.
//!
//! These tests run the complete loop from a TOML configuration through the
//! builder to correction ticks, against a simulated rotor that follows the
//! coils and a sensor that reports the rotor position.

mod unit;

use stepper_servo::config::ServoConfig;
use stepper_servo::sensor::Register;
use stepper_servo::{
    parse_config, CriticalSection, Direction, Microsteps, MotorControl, MotorState, MotorStatus, NoInterrupts,
    ServoController, ServoPins, TickOutcome,
};

use unit::sim::{FollowingCoils, Level, RecordingTimer, Rotor, SharedClock, SimulatedSensor};

// =============================================================================
// Test configuration data
// =============================================================================

const UNFILTERED_CONFIG: &str = r#"
[filters]
angle = 1
absolute_angle = 1
temperature = 1
"#;

const PID_CONFIG: &str = r#"
[filters]
angle = 1
absolute_angle = 1

[correction]
mode = "pid"
"#;

type Servo<'a> = ServoController<
    'a,
    SimulatedSensor,
    NoInterrupts,
    SharedClock,
    MotorStatus,
    FollowingCoils,
    Level,
    Level,
    Level,
    RecordingTimer,
    RecordingTimer,
    RecordingTimer,
>;

fn servo<'a>(cs: &'a CriticalSection<NoInterrupts>, config: ServoConfig, rotor: &Rotor, clock: &SharedClock) -> Servo<'a> {
    let motor = MotorStatus::from_config(&config.motor);
    let mut servo = Servo::builder()
        .config(config)
        .critical(cs)
        .sensor_bus(SimulatedSensor::on(rotor.clone()))
        .clock(clock.clone())
        .motor(motor)
        .coils(FollowingCoils::new(rotor.clone()))
        .pins(ServoPins {
            enable: Level::default(),
            stall_fault: Level::default(),
            led: Level::default(),
        })
        .correction_timer(RecordingTimer::default())
        .fine_timer(RecordingTimer::default())
        .step_timer(RecordingTimer::default())
        .build()
        .expect("Failed to build servo");

    servo.start().expect("Failed to start servo");
    servo
}

fn unfiltered() -> ServoConfig {
    parse_config(UNFILTERED_CONFIG).expect("Failed to parse config")
}

fn set_temperature(servo: &mut Servo<'_>, raw: u16) {
    servo.estimator_mut().protocol_mut().bus_mut().set(Register::Fsync, raw);
}

// =============================================================================
// Closed loop
// =============================================================================

#[test]
fn test_start_holds_measured_position() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());

    assert_eq!(servo.scheduler().desired_step().0, 1600);
    assert_eq!(servo.scheduler().current_step().0, 1600);
    assert_eq!(servo.coils().last, Some(1600));
    assert_eq!(servo.scheduler().timers().0.rate, Some(2496));
    assert_eq!(cs.depth(), 0);
}

#[test]
fn test_rotor_follows_step_pulses() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());

    for _ in 0..25 {
        servo.step_pulse(true);
    }
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert_eq!(rotor.step(), 1625);
    assert_eq!(servo.motor().state(), MotorState::Enabled);

    for _ in 0..10 {
        servo.step_pulse(false);
    }
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert_eq!(servo.scheduler().desired_step().0, 1615);
    assert_eq!(servo.scheduler().last_measured_step().0, 1615);
}

/// Crossing a turn boundary keeps the absolute position continuous.
#[test]
fn test_position_continuous_across_turns() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(6380.0 * 1.8 / 32.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());
    assert_eq!(servo.scheduler().desired_step().0, 6380);

    for _ in 0..40 {
        servo.step_pulse(true);
    }
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert_eq!(servo.scheduler().last_measured_step().0, 6420);
    assert!((servo.estimator_mut().absolute_angle().unwrap().0 - 361.125).abs() < 0.01);
}

#[test]
fn test_enable_input_released() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());

    servo.scheduler_mut().pins_mut().enable.high = true;
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::Disabled));
    assert_eq!(servo.motor().state(), MotorState::Disabled);

    servo.scheduler_mut().pins_mut().enable.high = false;
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert_eq!(servo.motor().state(), MotorState::Enabled);
}

// =============================================================================
// Stall detection
// =============================================================================

#[test]
fn test_blocked_rotor_latches_stall_until_recovered() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());

    rotor.set_blocked(true);
    for _ in 0..12 {
        servo.step_pulse(true);
    }

    assert_eq!(
        servo.correction_tick(),
        Ok(TickOutcome::Corrected {
            error: 12,
            stalled: true,
        })
    );
    assert!(servo.scheduler().stall().is_latched());
    assert!(servo.scheduler().pins().stall_fault.high);
    assert!(servo.scheduler().pins().led.high);
    assert_eq!(rotor.step(), 1600);

    rotor.set_blocked(false);
    let mut ticks = 0;
    while servo.correction_tick() != Ok(TickOutcome::InTolerance) {
        ticks += 1;
        assert!(ticks < 5, "rotor did not settle");
    }

    assert!(!servo.scheduler().stall().is_latched());
    assert!(!servo.scheduler().pins().stall_fault.high);
    assert!(!servo.scheduler().pins().led.high);
    assert!((rotor.step() - 1612).abs() <= 1);
}

/// Small errors latch once the fault time has elapsed in ticks.
#[test]
fn test_persistent_small_error_latches_after_fault_time() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut config = unfiltered();
    config.stall.fault_time_sec = 0.002;
    let mut servo = servo(&cs, config, &rotor, &SharedClock::default());

    rotor.set_blocked(true);
    for _ in 0..3 {
        servo.step_pulse(true);
    }

    // Budget: 0.002 s × 2496 Hz, just under 5 ticks
    for _ in 0..4 {
        assert!(matches!(
            servo.correction_tick(),
            Ok(TickOutcome::Corrected { stalled: false, .. })
        ));
    }
    assert_eq!(
        servo.correction_tick(),
        Ok(TickOutcome::Corrected {
            error: 3,
            stalled: true,
        })
    );
}

// =============================================================================
// PID correction
// =============================================================================

#[test]
fn test_pid_correction_uses_fine_timer() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let config = parse_config(PID_CONFIG).expect("Failed to parse config");
    let mut servo = servo(&cs, config, &rotor, &SharedClock::default());

    rotor.set_blocked(true);
    for _ in 0..3 {
        servo.step_pulse(true);
    }

    assert!(matches!(
        servo.correction_tick(),
        Ok(TickOutcome::Corrected { error: 3, .. })
    ));
    assert!(servo.scheduler().fine_running());
    assert_eq!(servo.scheduler().fine_direction(), Direction::CounterClockwise);
    assert!(servo.scheduler().timers().1.rate.is_some_and(|hz| hz > 0));

    rotor.set_blocked(false);
    servo.fine_correction_step();
    assert_eq!(rotor.step(), 1604);

    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert!(!servo.scheduler().fine_running());
    assert_eq!(servo.scheduler().timers().1.rate, None);
}

// =============================================================================
// Direct stepping
// =============================================================================

#[test]
fn test_scheduled_move_tracked_by_correction() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());

    servo.schedule_steps(10, 500, Direction::Clockwise).unwrap();
    assert_eq!(servo.stepper().timer().rate, Some(500));

    let mut interrupts = 0;
    while servo.stepper().is_active() {
        servo.scheduled_step();
        interrupts += 1;
    }

    assert_eq!(interrupts, 10);
    assert_eq!(servo.stepper().timer().rate, None);
    assert_eq!(rotor.step(), 1590);
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
}

// =============================================================================
// Microstepping
// =============================================================================

#[test]
fn test_microstepping_change_keeps_position() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());

    servo.set_microstepping(Microsteps::SIXTEENTH);
    rotor.set_microstep_angle(1.8 / 16.0);

    assert_eq!(servo.scheduler().desired_step().0, 800);
    assert_eq!(servo.scheduler().timers().0.rate, Some(1248));
    assert!((servo.scheduler().geometry().stall_tick_budget - 1248.0).abs() < 1e-3);
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));

    servo.step_pulse(true);
    assert!((rotor.angle() - 90.1125).abs() < 1e-3);
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert_eq!(servo.scheduler().last_measured_step().0, 801);
}

// =============================================================================
// Thermal protection
// =============================================================================

#[test]
fn test_overtemperature_shutdown_and_recovery() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let mut servo = servo(&cs, unfiltered(), &rotor, &SharedClock::default());
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));

    // 85 °C
    set_temperature(&mut servo, 84);
    assert!(servo.update_temperature().unwrap().0 > 80.0);
    assert_eq!(servo.motor().state(), MotorState::Overtemperature);

    servo.step_pulse(true);
    assert_eq!(servo.correction_tick(), Ok(TickOutcome::Idle));
    assert_eq!(servo.motor().state(), MotorState::Overtemperature);

    // Still above the clear threshold
    set_temperature(&mut servo, 56);
    servo.update_temperature().unwrap();
    assert_eq!(servo.motor().state(), MotorState::Overtemperature);

    // 50 °C, as a negative 9-bit field
    set_temperature(&mut servo, 0x01F3);
    assert!(servo.update_temperature().unwrap().0 < 70.0);
    assert_eq!(servo.motor().state(), MotorState::Disabled);

    assert_eq!(servo.correction_tick(), Ok(TickOutcome::InTolerance));
    assert_eq!(servo.motor().state(), MotorState::Enabled);
}

#[test]
fn test_warning_temperature_reduces_current() {
    let cs = CriticalSection::new(NoInterrupts);
    let rotor = Rotor::at(90.0);
    let clock = SharedClock::default();
    let mut servo = servo(&cs, unfiltered(), &rotor, &clock);

    // 75 °C: between warning and shutdown
    set_temperature(&mut servo, 56);
    servo.update_temperature().unwrap();
    assert_eq!(servo.motor().rms_current(), 500);

    clock.advance_secs(30);
    servo.update_temperature().unwrap();
    assert_eq!(servo.motor().rms_current(), 450);
    assert_eq!(servo.thermal().last_adjustment_secs(), 30);

    clock.advance_secs(10);
    servo.update_temperature().unwrap();
    assert_eq!(servo.motor().rms_current(), 450);
}
