//! Register bit fields.
//!
//! Each field names the register that owns it, its mask and shift, and the
//! access the device allows. [`BIT_FIELDS`] lists every field of the register
//! map; the index of a field in the table is stable.

use super::registers::Register;

/// Access the device grants to a bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessMode {
    /// Read only
    Read,
    /// Write only
    Write,
    /// Read and write
    ReadWrite,
    /// Read, value updated by the device
    ReadUpdate,
    /// Write, value updated by the device
    WriteUpdate,
    /// Read and write, value updated by the device
    ReadWriteUpdate,
    /// Reserved bits
    Reserved,
}

impl AccessMode {
    /// Whether the field may be read.
    pub const fn readable(self) -> bool {
        matches!(
            self,
            AccessMode::Read | AccessMode::ReadWrite | AccessMode::ReadUpdate | AccessMode::ReadWriteUpdate
        )
    }

    /// Whether the field may be written.
    pub const fn writable(self) -> bool {
        matches!(
            self,
            AccessMode::Write | AccessMode::ReadWrite | AccessMode::WriteUpdate | AccessMode::ReadWriteUpdate
        )
    }
}

/// A named group of bits inside one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Field name as printed in the register map.
    pub name: &'static str,
    /// Allowed access.
    pub access: AccessMode,
    /// Owning register.
    pub register: Register,
    /// Bits of the register covered by the field.
    pub mask: u16,
    /// Position of the lowest field bit.
    pub offset: u8,
    /// Reset value of the field.
    pub default: u16,
}

impl BitField {
    /// Describe a field with a zero reset value.
    pub const fn new(name: &'static str, access: AccessMode, register: Register, mask: u16, offset: u8) -> Self {
        Self {
            name,
            access,
            register,
            mask,
            offset,
            default: 0,
        }
    }

    /// Extract the field from a register value.
    #[inline]
    pub const fn extract(&self, register_value: u16) -> u16 {
        (register_value & self.mask) >> self.offset
    }

    /// Replace the field inside a register value, leaving the other bits alone.
    #[inline]
    pub const fn merge(&self, register_value: u16, field_value: u16) -> u16 {
        (register_value & !self.mask) | ((field_value << self.offset) & self.mask)
    }

    /// Number of bits in the field.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.mask.count_ones()
    }
}

/// Status reset.
pub const SRST: BitField = BitField::new("SRST", AccessMode::ReadUpdate, Register::Stat, 0x0001, 0);
/// Status watchdog.
pub const SWD: BitField = BitField::new("SWD", AccessMode::Read, Register::Stat, 0x0002, 1);
/// Status voltage regulator.
pub const SVR: BitField = BitField::new("SVR", AccessMode::Read, Register::Stat, 0x0004, 2);
/// Status fuses.
pub const SFUSE: BitField = BitField::new("SFUSE", AccessMode::Read, Register::Stat, 0x0008, 3);
/// Status digital signal processing unit.
pub const SDSPU: BitField = BitField::new("SDSPU", AccessMode::Read, Register::Stat, 0x0010, 4);
/// Status overflow.
pub const SOV: BitField = BitField::new("SOV", AccessMode::ReadUpdate, Register::Stat, 0x0020, 5);
/// Status X/Y data out of limit.
pub const SXYOL: BitField = BitField::new("SXYOL", AccessMode::ReadUpdate, Register::Stat, 0x0040, 6);
/// Status magnitude out of limit.
pub const SMAGOL: BitField = BitField::new("SMAGOL", AccessMode::ReadUpdate, Register::Stat, 0x0080, 7);
/// Reserved.
pub const STAT_RESERVED: BitField = BitField::new("STAT_RESERVED", AccessMode::Reserved, Register::Stat, 0x0100, 8);
/// Status ADC test.
pub const SADCT: BitField = BitField::new("SADCT", AccessMode::Read, Register::Stat, 0x0200, 9);
/// Status ROM.
pub const SROM: BitField = BitField::new("SROM", AccessMode::Read, Register::Stat, 0x0400, 10);
/// No valid GMR X/Y values.
pub const NOGMRXY: BitField = BitField::new("NOGMRXY", AccessMode::ReadUpdate, Register::Stat, 0x0800, 11);
/// No valid GMR angle value.
pub const NOGMRA: BitField = BitField::new("NOGMRA", AccessMode::ReadUpdate, Register::Stat, 0x1000, 12);
/// Slave number.
pub const SNR: BitField = BitField::new("SNR", AccessMode::ReadWrite, Register::Stat, 0x6000, 13);
/// Read status.
pub const RDST: BitField = BitField::new("RDST", AccessMode::ReadUpdate, Register::Stat, 0x8000, 15);

/// Activate hardware reset.
pub const ASRST: BitField = BitField::new("ASRST", AccessMode::ReadWrite, Register::AcStat, 0x0001, 0);
/// Enable DSPU watchdog.
pub const ASWD: BitField = BitField::new("ASWD", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0002, 1);
/// Enable voltage regulator check.
pub const ASVR: BitField = BitField::new("ASVR", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0004, 2);
/// Activate fuse CRC.
pub const ASFUSE: BitField = BitField::new("ASFUSE", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0008, 3);
/// Activate DSPU BIST.
pub const ASDSPU: BitField = BitField::new("ASDSPU", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0010, 4);
/// Enable DSPU overflow check.
pub const ASOV: BitField = BitField::new("ASOV", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0020, 5);
/// Activate X/Y out of limit check.
pub const ASVECXY: BitField = BitField::new("ASVECXY", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0040, 6);
/// Activate magnitude check.
pub const ASVEGMAG: BitField = BitField::new("ASVEGMAG", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0080, 7);
/// Reserved.
pub const ACSTAT_RESERVED1: BitField = BitField::new("ACSTAT_RESERVED1", AccessMode::Reserved, Register::AcStat, 0x0100, 8);
/// Enable ADC test vector check.
pub const ASADCT: BitField = BitField::new("ASADCT", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0200, 9);
/// Activate firmware reset.
pub const ASFRST: BitField = BitField::new("ASFRST", AccessMode::ReadWriteUpdate, Register::AcStat, 0x0400, 10);
/// Reserved.
pub const ACSTAT_RESERVED2: BitField = BitField::new("ACSTAT_RESERVED2", AccessMode::Reserved, Register::AcStat, 0xF800, 11);

/// Calculated angle value (15 bits).
pub const ANGVAL: BitField = BitField::new("ANGVAL", AccessMode::ReadUpdate, Register::Aval, 0x7FFF, 0);
/// Read status, angle value.
pub const RDAV: BitField = BitField::new("RDAV", AccessMode::Read, Register::Aval, 0x8000, 15);

/// Signed angle speed; bit 14 is the rotation direction.
pub const ANGSPD: BitField = BitField::new("ANGSPD", AccessMode::ReadUpdate, Register::Aspd, 0x7FFF, 0);
/// Read status, angle speed.
pub const RDAS: BitField = BitField::new("RDAS", AccessMode::Read, Register::Aspd, 0x8000, 15);

/// Revolution counter (signed 9 bits), counts up counter-clockwise.
pub const REVOL: BitField = BitField::new("REVOL", AccessMode::ReadUpdate, Register::Arev, 0x01FF, 0);
/// Internal frame counter.
pub const FCNT: BitField = BitField::new("FCNT", AccessMode::ReadWriteUpdate, Register::Arev, 0x7E00, 9);
/// Read status, revolution.
pub const RDREV: BitField = BitField::new("RDREV", AccessMode::Read, Register::Arev, 0x8000, 15);

/// Offset compensated temperature (signed 9 bits).
pub const TEMPR: BitField = BitField::new("TEMPR", AccessMode::ReadWriteUpdate, Register::Fsync, 0x01FF, 0);
/// Frame synchronization counter.
pub const FSYNC: BitField = BitField::new("FSYNC", AccessMode::ReadUpdate, Register::Fsync, 0xFE00, 9);

/// Incremental interface mode.
pub const IIFMOD: BitField = BitField::new("IIFMOD", AccessMode::ReadWrite, Register::Mod1, 0x0003, 0);
/// Hold the DSPU.
pub const DSPUHOLD: BitField = BitField::new("DSPUHOLD", AccessMode::ReadWrite, Register::Mod1, 0x0004, 2);
/// Reserved.
pub const MOD1_RESERVED1: BitField = BitField::new("MOD1_RESERVED1", AccessMode::Reserved, Register::Mod1, 0x0008, 3);
/// External clock select.
pub const CLKSEL: BitField = BitField::new("CLKSEL", AccessMode::ReadWrite, Register::Mod1, 0x0010, 4);
/// Reserved.
pub const MOD1_RESERVED2: BitField = BitField::new("MOD1_RESERVED2", AccessMode::Reserved, Register::Mod1, 0x3FE0, 5);
/// Filter update rate setting.
pub const FIRMD: BitField = BitField::new("FIRMD", AccessMode::ReadWrite, Register::Mod1, 0xC000, 14);

/// Test vector X.
pub const ADCTVX: BitField = BitField::new("ADCTVX", AccessMode::ReadWrite, Register::Sil, 0x0007, 0);
/// Test vector Y.
pub const ADCTVY: BitField = BitField::new("ADCTVY", AccessMode::ReadWrite, Register::Sil, 0x0038, 3);
/// Connect test voltages to the ADCs.
pub const ADCTVEN: BitField = BitField::new("ADCTVEN", AccessMode::ReadWrite, Register::Sil, 0x0040, 6);
/// Reserved.
pub const SIL_RESERVED1: BitField = BitField::new("SIL_RESERVED1", AccessMode::Reserved, Register::Sil, 0x0380, 7);
/// Reload defaults from laser fuses.
pub const FUSEREL: BitField = BitField::new("FUSEREL", AccessMode::ReadWrite, Register::Sil, 0x0400, 10);
/// Reserved.
pub const SIL_RESERVED2: BitField = BitField::new("SIL_RESERVED2", AccessMode::Reserved, Register::Sil, 0x3800, 11);
/// Invert X and Y signals.
pub const FILTINV: BitField = BitField::new("FILTINV", AccessMode::ReadWrite, Register::Sil, 0x4000, 14);
/// Route raw X to the Y filter input.
pub const FILTPAR: BitField = BitField::new("FILTPAR", AccessMode::ReadWrite, Register::Sil, 0x8000, 15);

/// Automatic offset and amplitude calibration.
pub const AUTOCAL: BitField = BitField::new("AUTOCAL", AccessMode::ReadWrite, Register::Mod2, 0x0003, 0);
/// Angle prediction from speed.
pub const PREDICT: BitField = BitField::new("PREDICT", AccessMode::ReadWrite, Register::Mod2, 0x0004, 2);
/// Invert angle, speed and revolution direction.
pub const ANGDIR: BitField = BitField::new("ANGDIR", AccessMode::ReadWrite, Register::Mod2, 0x0008, 3);
/// Angle output range factor.
pub const ANGRANGE: BitField = BitField::new("ANGRANGE", AccessMode::ReadWrite, Register::Mod2, 0x7FF0, 4);
/// Reserved.
pub const MOD2_RESERVED1: BitField = BitField::new("MOD2_RESERVED1", AccessMode::Reserved, Register::Mod2, 0x8000, 15);

/// Pad driver configuration.
pub const PADDRV: BitField = BitField::new("PADDRV", AccessMode::ReadWrite, Register::Mod3, 0x0003, 0);
/// SSC data pin output mode.
pub const SSCOD: BitField = BitField::new("SSCOD", AccessMode::ReadWrite, Register::Mod3, 0x0004, 2);
/// Input spike filter.
pub const SPIKEF: BitField = BitField::new("SPIKEF", AccessMode::ReadWrite, Register::Mod3, 0x0008, 3);
/// Zero angle position.
pub const ANG_BASE: BitField = BitField::new("ANG_BASE", AccessMode::ReadWrite, Register::Mod3, 0xFFF0, 4);

/// Reserved.
pub const OFFX_RESERVED1: BitField = BitField::new("OFFX_RESERVED1", AccessMode::Reserved, Register::OffX, 0x000F, 0);
/// X offset correction at 25 °C.
pub const XOFFSET: BitField = BitField::new("XOFFSET", AccessMode::ReadWrite, Register::OffX, 0xFFF0, 4);

/// Reserved.
pub const OFFY_RESERVED1: BitField = BitField::new("OFFY_RESERVED1", AccessMode::Reserved, Register::OffY, 0x000F, 0);
/// Y offset correction at 25 °C.
pub const YOFFSET: BitField = BitField::new("YOFFSET", AccessMode::ReadWrite, Register::OffY, 0xFFF0, 4);

/// Reserved.
pub const SYNCH_RESERVED1: BitField = BitField::new("SYNCH_RESERVED1", AccessMode::Reserved, Register::Synch, 0x000F, 0);
/// Amplitude synchronicity.
pub const SYNCH: BitField = BitField::new("SYNCH", AccessMode::ReadWrite, Register::Synch, 0xFFF0, 4);

/// Hysteresis.
pub const IFADHYST: BitField = BitField::new("IFADHYST", AccessMode::ReadWrite, Register::Ifab, 0x0003, 0);
/// IFA/IFB/IFC output mode.
pub const IFABOD: BitField = BitField::new("IFABOD", AccessMode::ReadWrite, Register::Ifab, 0x0004, 2);
/// Initial filter update rate.
pub const FIRUDR: BitField = BitField::new("FIRUDR", AccessMode::ReadWrite, Register::Ifab, 0x0008, 3);
/// X/Y orthogonality correction.
pub const ORTHO: BitField = BitField::new("ORTHO", AccessMode::ReadWrite, Register::Ifab, 0xFFF0, 4);

/// Interface mode on IFA/IFB/IFC.
pub const IFMD: BitField = BitField::new("IFMD", AccessMode::ReadWrite, Register::Mod4, 0x0003, 0);
/// Reserved.
pub const MOD4_RESERVED1: BitField = BitField::new("MOD4_RESERVED1", AccessMode::Reserved, Register::Mod4, 0x0004, 2);
/// Incremental interface resolution.
pub const IFABRES: BitField = BitField::new("IFABRES", AccessMode::ReadWrite, Register::Mod4, 0x0018, 3);
/// Hall switch mode.
pub const HSMPLP: BitField = BitField::new("HSMPLP", AccessMode::ReadWrite, Register::Mod4, 0x01E0, 5);
/// X offset temperature coefficient.
pub const TCOXT: BitField = BitField::new("TCOXT", AccessMode::ReadWrite, Register::Mod4, 0x7E00, 9);

/// CRC of parameters.
pub const CRCPAR: BitField = BitField::new("CRCPAR", AccessMode::ReadWrite, Register::TcoY, 0x00FF, 0);
/// Startup BIST.
pub const SBIST: BitField = BitField::new("SBIST", AccessMode::ReadWrite, Register::TcoY, 0x0100, 8);
/// Y offset temperature coefficient.
pub const TCOYT: BitField = BitField::new("TCOYT", AccessMode::ReadWrite, Register::TcoY, 0x7E00, 9);

/// X GMR ADC value.
pub const ADCX: BitField = BitField::new("ADCX", AccessMode::Read, Register::AdcX, 0xFFFF, 0);

/// Y GMR ADC value.
pub const ADCY: BitField = BitField::new("ADCY", AccessMode::Read, Register::AdcY, 0xFFFF, 0);

/// Angle vector magnitude.
pub const MAG: BitField = BitField::new("MAG", AccessMode::ReadUpdate, Register::DMag, 0x03FF, 0);
/// Reserved.
pub const DMAG_RESERVED1: BitField = BitField::new("DMAG_RESERVED1", AccessMode::Reserved, Register::DMag, 0xFC00, 10);

/// Raw temperature sensor value.
pub const TRAW: BitField = BitField::new("TRAW", AccessMode::ReadUpdate, Register::TRaw, 0x03FF, 0);
/// Reserved.
pub const TRAW_RESERVED1: BitField = BitField::new("TRAW_RESERVED1", AccessMode::Reserved, Register::TRaw, 0x7C00, 10);
/// Toggles on every new temperature value.
pub const TTGL: BitField = BitField::new("TTGL", AccessMode::ReadUpdate, Register::TRaw, 0x8000, 15);

/// Incremental interface counter.
pub const IIFCNT: BitField = BitField::new("IIFCNT", AccessMode::ReadUpdate, Register::IifCnt, 0x7FFF, 0);
/// Reserved.
pub const IIFCNT_RESERVED1: BitField = BitField::new("IIFCNT_RESERVED1", AccessMode::Reserved, Register::IifCnt, 0x8000, 15);

/// Temperature offset at 25 °C.
pub const T25O: BitField = BitField::new("T25O", AccessMode::Read, Register::T25o, 0x01FF, 0);
/// Reserved.
pub const T25O_RESERVED1: BitField = BitField::new("T25O_RESERVED1", AccessMode::Reserved, Register::T25o, 0xFE00, 9);

/// Number of entries in [`BIT_FIELDS`].
pub const BIT_FIELD_COUNT: usize = 88;

/// Every bit field of the register map, in register order.
pub static BIT_FIELDS: [BitField; BIT_FIELD_COUNT] = [
    SRST,
    SWD,
    SVR,
    SFUSE,
    SDSPU,
    SOV,
    SXYOL,
    SMAGOL,
    STAT_RESERVED,
    SADCT,
    SROM,
    NOGMRXY,
    NOGMRA,
    SNR,
    RDST,
    ASRST,
    ASWD,
    ASVR,
    ASFUSE,
    ASDSPU,
    ASOV,
    ASVECXY,
    ASVEGMAG,
    ACSTAT_RESERVED1,
    ASADCT,
    ASFRST,
    ACSTAT_RESERVED2,
    ANGVAL,
    RDAV,
    ANGSPD,
    RDAS,
    REVOL,
    FCNT,
    RDREV,
    TEMPR,
    FSYNC,
    IIFMOD,
    DSPUHOLD,
    MOD1_RESERVED1,
    CLKSEL,
    MOD1_RESERVED2,
    FIRMD,
    ADCTVX,
    ADCTVY,
    ADCTVEN,
    SIL_RESERVED1,
    FUSEREL,
    SIL_RESERVED2,
    FILTINV,
    FILTPAR,
    AUTOCAL,
    PREDICT,
    ANGDIR,
    ANGRANGE,
    MOD2_RESERVED1,
    PADDRV,
    SSCOD,
    SPIKEF,
    ANG_BASE,
    OFFX_RESERVED1,
    XOFFSET,
    OFFY_RESERVED1,
    YOFFSET,
    SYNCH_RESERVED1,
    SYNCH,
    IFADHYST,
    IFABOD,
    FIRUDR,
    ORTHO,
    IFMD,
    MOD4_RESERVED1,
    IFABRES,
    HSMPLP,
    TCOXT,
    CRCPAR,
    SBIST,
    TCOYT,
    ADCX,
    ADCY,
    MAG,
    DMAG_RESERVED1,
    TRAW,
    TRAW_RESERVED1,
    TTGL,
    IIFCNT,
    IIFCNT_RESERVED1,
    T25O,
    T25O_RESERVED1,
];

/// Look up a field by name.
pub fn find(name: &str) -> Option<&'static BitField> {
    BIT_FIELDS.iter().find(|f| f.name == name)
}
