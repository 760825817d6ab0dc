//! Register map of the angle sensor.

/// Read command bit.
pub const READ_COMMAND: u16 = 0x8000;

/// Write command with the configuration lock key.
pub const WRITE_COMMAND: u16 = 0x5000;

/// Low-nibble flag requesting a safety word after a single-word read.
pub const SAFE_HIGH: u16 = 0x0001;

/// Largest word count a command can announce.
pub const MAX_BURST: usize = 0xF;

/// Number of cached registers.
pub const REGISTER_COUNT: usize = 22;

/// Sensor registers, in register map order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Status
    Stat,
    /// Activation status
    AcStat,
    /// Angle value
    Aval,
    /// Angle speed
    Aspd,
    /// Angle revolution
    Arev,
    /// Frame sync and temperature
    Fsync,
    /// Interface mode 1
    Mod1,
    /// SIL
    Sil,
    /// Interface mode 2
    Mod2,
    /// Interface mode 3
    Mod3,
    /// X offset
    OffX,
    /// Y offset
    OffY,
    /// Amplitude synchronicity
    Synch,
    /// IFAB
    Ifab,
    /// Interface mode 4
    Mod4,
    /// Temperature coefficient
    TcoY,
    /// X raw value
    AdcX,
    /// Y raw value
    AdcY,
    /// Angle vector magnitude
    DMag,
    /// Temperature sensor raw value
    TRaw,
    /// Incremental interface counter
    IifCnt,
    /// Temperature offset at 25 °C
    T25o,
}

impl Register {
    /// All registers, indexed by [`Register::slot`].
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::Stat,
        Register::AcStat,
        Register::Aval,
        Register::Aspd,
        Register::Arev,
        Register::Fsync,
        Register::Mod1,
        Register::Sil,
        Register::Mod2,
        Register::Mod3,
        Register::OffX,
        Register::OffY,
        Register::Synch,
        Register::Ifab,
        Register::Mod4,
        Register::TcoY,
        Register::AdcX,
        Register::AdcY,
        Register::DMag,
        Register::TRaw,
        Register::IifCnt,
        Register::T25o,
    ];

    /// Address bits of the command word.
    pub const fn address(self) -> u16 {
        match self {
            Register::Stat => 0x0000,
            Register::AcStat => 0x0010,
            Register::Aval => 0x0020,
            Register::Aspd => 0x0030,
            Register::Arev => 0x0040,
            Register::Fsync => 0x0050,
            Register::Mod1 => 0x0060,
            Register::Sil => 0x0070,
            Register::Mod2 => 0x0080,
            Register::Mod3 => 0x0090,
            Register::OffX => 0x00A0,
            Register::OffY => 0x00B0,
            Register::Synch => 0x00C0,
            Register::Ifab => 0x00D0,
            Register::Mod4 => 0x00E0,
            Register::TcoY => 0x00F0,
            Register::AdcX => 0x0100,
            Register::AdcY => 0x0110,
            Register::DMag => 0x0140,
            Register::TRaw => 0x0150,
            Register::IifCnt => 0x0200,
            Register::T25o => 0x0300,
        }
    }

    /// Position of the register in the cache.
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Register at a command address, if the map has one.
    pub fn from_address(address: u16) -> Option<Register> {
        Self::ALL.iter().copied().find(|r| r.address() == address)
    }

    /// Register following this one in a burst read (next address).
    pub fn burst_successor(self, offset: usize) -> Option<Register> {
        let address = self.address().checked_add((offset as u16).checked_mul(0x10)?)?;
        Self::from_address(address)
    }

    /// Command word reading `words` data words starting at this register.
    #[inline]
    pub const fn read_command(self, words: u16) -> u16 {
        READ_COMMAND | self.address() | (words & 0xF)
    }

    /// Command word writing one data word to this register.
    #[inline]
    pub const fn write_command(self) -> u16 {
        WRITE_COMMAND | self.address() | 1
    }
}
