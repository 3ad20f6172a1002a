//! # Device configuration (DEVCFG) registers
//!
//! Only the parts used for identification of the silicon are modelled with bit fields. The
//! PS-XADC interface follows at offset 0x100 and is exposed in [crate::xadc].
use arbitrary_int::u4;

pub const DEVCFG_BASE_ADDR: usize = 0xF800_7000;
pub const MCTRL_ADDR: usize = DEVCFG_BASE_ADDR + 0x80;

/// Silicon revision of the processing system encoded in the `ps_version` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PsVersion {
    V1_0,
    V2_0,
    V3_0,
    V3_1,
    Unknown(u8),
}

impl PsVersion {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x0 => Self::V1_0,
            0x1 => Self::V2_0,
            0x2 => Self::V3_0,
            0x3 => Self::V3_1,
            other => Self::Unknown(other),
        }
    }
}

impl core::fmt::Display for PsVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::V1_0 => write!(f, "1.0"),
            Self::V2_0 => write!(f, "2.0"),
            Self::V3_0 => write!(f, "3.0"),
            Self::V3_1 => write!(f, "3.1"),
            Self::Unknown(raw) => write!(f, "unknown ({raw:#x})"),
        }
    }
}

#[bitbybit::bitfield(u32, debug)]
pub struct Status {
    #[bit(5, r)]
    pl_reset_n: bool,
    #[bit(4, r)]
    pcfg_init: bool,
}

#[bitbybit::bitfield(u32, debug)]
pub struct MiscControl {
    #[bits(28..=31, r)]
    ps_version_raw: u4,
    /// PL power on reset signal state.
    #[bit(8, r)]
    por_b_signal: bool,
    /// Loop back the PCAP transmit data to the receive FIFO.
    #[bit(4, rw)]
    loopback: bool,
}

impl MiscControl {
    #[inline]
    pub fn ps_version(&self) -> PsVersion {
        PsVersion::from_raw(self.ps_version_raw().value())
    }
}

/// Device configuration register access.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct DevCfg {
    control: u32,
    lock: u32,
    config: u32,
    interrupt_status: u32,
    interrupt_mask: u32,
    #[mmio(PureRead)]
    status: Status,
    _reserved_0: [u32; 0x1A],
    misc_control: MiscControl,
}

static_assertions::const_assert_eq!(core::mem::size_of::<DevCfg>(), 0x84);

impl DevCfg {
    /// Create a new device configuration MMIO instance at address [DEVCFG_BASE_ADDR].
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    pub const unsafe fn new_mmio_fixed() -> MmioDevCfg<'static> {
        unsafe { Self::new_mmio_at(DEVCFG_BASE_ADDR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misc_control_offset() {
        assert_eq!(
            DEVCFG_BASE_ADDR + core::mem::offset_of!(DevCfg, misc_control),
            MCTRL_ADDR
        );
        assert_eq!(MCTRL_ADDR, 0xF800_7080);
    }

    #[test]
    fn ps_version_decoding() {
        let mctrl = MiscControl::new_with_raw_value(0x3000_0100);
        assert_eq!(mctrl.ps_version(), PsVersion::V3_1);
        assert!(mctrl.por_b_signal());
        assert_eq!(
            MiscControl::new_with_raw_value(0x9000_0000).ps_version(),
            PsVersion::Unknown(0x9)
        );
    }
}
