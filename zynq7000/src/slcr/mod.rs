//! System level control registers (SLCR)
//!
//! Writing any of these registers requires unlocking the SLCR first.
use arbitrary_int::{u4, u5, u7, u11};
pub use clocks::{ClockControl, MmioClockControl};
pub use reset::{MmioResetControl, ResetControl};

pub const SLCR_BASE_ADDR: usize = 0xF800_0000;
pub const CLOCK_CONTROL_OFFSET: usize = 0x100;
pub const RESET_BLOCK_OFFSET: usize = 0x200;
pub const PSS_IDCODE_ADDR: usize = SLCR_BASE_ADDR + 0x530;

pub mod clocks;
pub mod mio;
pub mod reset;

/// Manufacturer ID of Xilinx/AMD inside the JTAG identification code.
pub const XILINX_MANUFACTURER_ID: u16 = 0x49;

/// PSS_IDCODE register. Contains the JTAG identification code of the device.
#[bitbybit::bitfield(u32, debug)]
pub struct IdCode {
    #[bits(28..=31, r)]
    revision: u4,
    #[bits(21..=27, r)]
    family: u7,
    #[bits(17..=20, r)]
    subfamily: u4,
    #[bits(12..=16, r)]
    device_code: u5,
    #[bits(1..=11, r)]
    manufacturer_id: u11,
}

#[bitbybit::bitfield(u32, debug)]
pub struct RebootStatus {
    /// Persistent state which survives all resets except the power-on reset.
    #[bits(24..=31, rw)]
    reboot_state: u8,
    #[bit(22, rw)]
    power_on_reset: bool,
    #[bit(21, rw)]
    srst_b: bool,
    #[bit(20, rw)]
    debug_reset: bool,
    #[bit(19, rw)]
    slcr_soft_reset: bool,
    /// CPU1 private watchdog reset.
    #[bit(18, rw)]
    awdt1_reset: bool,
    /// CPU0 private watchdog reset.
    #[bit(17, rw)]
    awdt0_reset: bool,
    /// System watchdog reset.
    #[bit(16, rw)]
    swdt_reset: bool,
    #[bits(0..=15, rw)]
    bootrom_error_code: u16,
}

#[bitbybit::bitfield(u32, debug)]
pub struct BootModeRegister {
    #[bit(4, r)]
    pll_bypassed: bool,
    #[bits(0..=3, r)]
    boot_mode: u4,
}

#[bitbybit::bitenum(u4, exhaustive = false)]
#[derive(Debug, PartialEq, Eq)]
pub enum LevelShifterConfig {
    DisableAll = 0x00,
    EnablePsToPl = 0xA,
    EnableAll = 0xF,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct LevelShifterRegister {
    #[bits(0..=3, rw)]
    user_lvl_shftr_en: Option<LevelShifterConfig>,
}

/// System level control registers
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Slcr {
    /// Secure configuration lock.
    scl: u32,
    /// Write protection lock.
    #[mmio(Write)]
    lock: u32,
    /// Write protection unlock.
    #[mmio(Write)]
    unlock: u32,
    /// Write protection status.
    #[mmio(PureRead)]
    lock_status: u32,

    _reserved_0: [u32; 0x3C],

    #[mmio(Inner)]
    clk_ctrl: ClockControl,

    _reserved_1: [u32; 0x0E],

    #[mmio(Inner)]
    reset_ctrl: ResetControl,

    _reserved_2: [u32; 0x02],

    reboot_status: RebootStatus,
    #[mmio(PureRead)]
    boot_mode: BootModeRegister,

    _reserved_3: [u32; 0x28],

    apu_ctrl: u32,
    wdt_clk_sel: u32,

    _reserved_4: [u32; 0x8A],

    #[mmio(PureRead)]
    pss_idcode: IdCode,

    _reserved_5: [u32; 0x73],

    mio_pins: [mio::Config; mio::NUM_MIO_PINS],

    _reserved_6: [u32; 0x4A],

    lvl_shftr_en: LevelShifterRegister,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Slcr>(), 0x904);

impl Slcr {
    /// Create a new handle to this peripheral.
    ///
    /// Writing to this register requires unlocking the SLCR registers first.
    ///
    /// # Safety
    ///
    /// If you create multiple instances of this handle at the same time, you are responsible for
    /// ensuring that there are no read-modify-write races on any of the registers.
    pub const unsafe fn new_mmio_fixed() -> MmioSlcr<'static> {
        unsafe { Self::new_mmio_at(SLCR_BASE_ADDR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_offsets() {
        assert_eq!(core::mem::offset_of!(Slcr, clk_ctrl), CLOCK_CONTROL_OFFSET);
        assert_eq!(core::mem::offset_of!(Slcr, reset_ctrl), RESET_BLOCK_OFFSET);
        assert_eq!(core::mem::offset_of!(Slcr, reboot_status), 0x258);
        assert_eq!(
            SLCR_BASE_ADDR + core::mem::offset_of!(Slcr, pss_idcode),
            PSS_IDCODE_ADDR
        );
        assert_eq!(core::mem::offset_of!(Slcr, mio_pins), 0x700);
        assert_eq!(core::mem::offset_of!(Slcr, lvl_shftr_en), 0x900);
    }

    #[test]
    fn idcode_of_7z020() {
        let idcode = IdCode::new_with_raw_value(0x0372_7093);
        assert_eq!(idcode.manufacturer_id().value(), XILINX_MANUFACTURER_ID);
        assert_eq!(idcode.device_code().value(), 0x07);
        assert_eq!(idcode.family().value(), 0x1B);
        assert_eq!(idcode.subfamily().value(), 0x9);
        assert_eq!(idcode.revision().value(), 0x0);
    }

    #[test]
    fn reboot_status_watchdog_flag() {
        let status = RebootStatus::new_with_raw_value(1 << 17);
        assert!(status.awdt0_reset());
        assert!(!status.swdt_reset());
        assert!(!status.power_on_reset());
    }
}
