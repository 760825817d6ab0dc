//! Error types for stepper-servo library.
//!
//! Provides unified error handling across configuration, sensor protocol and motor control.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-servo operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Angle sensor protocol error
    Sensor(SensorError),
    /// Motor operation error
    Motor(MotorError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Full step angle is neither 1.8 nor 0.9 degrees
    InvalidFullStepAngle(f32),
    /// Microstep multiplier must be at least 1
    InvalidMicrostepMultiplier(u16),
    /// Averaging window outside `1..=MAX_WINDOW`
    InvalidWindow {
        /// Signal the window belongs to
        signal: &'static str,
        /// Configured window size
        size: usize,
    },
    /// Frequency must be > 0
    InvalidFrequency {
        /// Parameter name
        parameter: &'static str,
        /// Configured value
        value: f32,
    },
    /// PID gain or limit is negative
    InvalidGain {
        /// Parameter name
        parameter: &'static str,
        /// Configured value
        value: f32,
    },
    /// Thermal thresholds out of order (need clear <= shutdown and warning <= shutdown)
    InvalidThermalThresholds {
        /// Warning threshold
        warning: f32,
        /// Shutdown threshold
        shutdown: f32,
        /// Clear threshold
        clear: f32,
    },
    /// Retry bound must be > 0
    InvalidRetryLimit(u32),
    /// Stall fault time must be > 0
    InvalidFaultTime(f32),
    /// Builder is missing a required component
    MissingComponent(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Angle sensor protocol errors.
///
/// One value is reported per transaction attempt; the protocol never retries internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device reported a system error (safety reset issued)
    SystemError,
    /// Device reported an interface access error
    InterfaceAccessError,
    /// Device reported an invalid angle (safety reset issued)
    InvalidAngleError,
    /// Safety word checksum does not match the transaction
    CrcMismatch {
        /// Locally computed checksum
        computed: u8,
        /// Checksum carried by the safety word
        received: u8,
    },
    /// Bit field access mode forbids reading
    FieldNotReadable(&'static str),
    /// Bit field access mode forbids writing
    FieldNotWritable(&'static str),
    /// Burst length outside `1..=15` words
    InvalidLength(usize),
    /// Transport or chip-select operation failed
    Bus,
    /// Bounded retry loop gave up without a valid transaction
    Unresponsive {
        /// Number of attempts made
        attempts: u32,
        /// Error reported by the last attempt
        last: SensorFault,
    },
}

/// Transient fault kinds that a retry loop can give up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorFault {
    /// System error flag
    System,
    /// Interface access error flag
    InterfaceAccess,
    /// Invalid angle flag
    InvalidAngle,
    /// Checksum mismatch
    Crc,
    /// Transport failure
    Bus,
}

/// Motor operation errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// Step rate must be > 0 Hz
    InvalidStepRate(u32),
}

impl SensorError {
    /// Whether a retry may succeed (device flags, checksum and bus faults).
    pub fn is_transient(&self) -> bool {
        self.fault().is_some()
    }

    /// Fault kind for transient errors, `None` for static configuration errors.
    pub fn fault(&self) -> Option<SensorFault> {
        match self {
            SensorError::SystemError => Some(SensorFault::System),
            SensorError::InterfaceAccessError => Some(SensorFault::InterfaceAccess),
            SensorError::InvalidAngleError => Some(SensorFault::InvalidAngle),
            SensorError::CrcMismatch { .. } => Some(SensorFault::Crc),
            SensorError::Bus => Some(SensorFault::Bus),
            SensorError::FieldNotReadable(_)
            | SensorError::FieldNotWritable(_)
            | SensorError::InvalidLength(_)
            | SensorError::Unresponsive { .. } => None,
        }
    }

    /// Whether the device latched a fault that needs a safety reset.
    pub fn needs_safety_reset(&self) -> bool {
        matches!(self, SensorError::SystemError | SensorError::InvalidAngleError)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Sensor(e) => write!(f, "Sensor error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidFullStepAngle(v) => {
                write!(f, "Invalid full step angle: {}. Must be 1.8 or 0.9", v)
            }
            ConfigError::InvalidMicrostepMultiplier(v) => {
                write!(f, "Invalid microstep multiplier: {}. Must be >= 1", v)
            }
            ConfigError::InvalidWindow { signal, size } => {
                write!(f, "Invalid {} averaging window: {}", signal, size)
            }
            ConfigError::InvalidFrequency { parameter, value } => {
                write!(f, "Invalid {}: {}. Must be > 0", parameter, value)
            }
            ConfigError::InvalidGain { parameter, value } => {
                write!(f, "Invalid {}: {}. Must be >= 0", parameter, value)
            }
            ConfigError::InvalidThermalThresholds { warning, shutdown, clear } => write!(
                f,
                "Invalid thermal thresholds: warning {}, shutdown {}, clear {}",
                warning, shutdown, clear
            ),
            ConfigError::InvalidRetryLimit(v) => write!(f, "Invalid read attempt limit: {}. Must be > 0", v),
            ConfigError::InvalidFaultTime(v) => write!(f, "Invalid stall fault time: {}. Must be > 0", v),
            ConfigError::MissingComponent(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::SystemError => write!(f, "Sensor system error"),
            SensorError::InterfaceAccessError => write!(f, "Sensor interface access error"),
            SensorError::InvalidAngleError => write!(f, "Sensor reported an invalid angle"),
            SensorError::CrcMismatch { computed, received } => {
                write!(f, "CRC mismatch: computed {:#04x}, received {:#04x}", computed, received)
            }
            SensorError::FieldNotReadable(name) => write!(f, "Bit field '{}' is not readable", name),
            SensorError::FieldNotWritable(name) => write!(f, "Bit field '{}' is not writable", name),
            SensorError::InvalidLength(n) => write!(f, "Invalid burst length: {} words", n),
            SensorError::Bus => write!(f, "Sensor bus transfer failed"),
            SensorError::Unresponsive { attempts, last } => {
                write!(f, "Sensor gave no valid reading after {} attempts (last: {:?})", attempts, last)
            }
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::InvalidStepRate(rate) => write!(f, "Invalid step rate: {} Hz", rate),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Error::Sensor(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for SensorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}
