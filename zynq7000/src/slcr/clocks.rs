//! SLCR clock control registers.
//!
//! Only the PLLs, the CPU clock, the AMBA peripheral clock gates and the UART reference clock
//! are modelled.
use super::{CLOCK_CONTROL_OFFSET, SLCR_BASE_ADDR};
use arbitrary_int::{u6, u7};

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct PllControl {
    /// Feedback divisor. The PLL output is the PS clock multiplied with this value.
    #[bits(12..=18, rw)]
    fdiv: u7,
    #[bit(4, rw)]
    bypass_force: bool,
    #[bit(1, rw)]
    pwrdwn: bool,
    #[bit(0, rw)]
    reset: bool,
}

#[bitbybit::bitfield(u32, debug)]
pub struct PllStatus {
    #[bit(5, r)]
    io_pll_stable: bool,
    #[bit(4, r)]
    ddr_pll_stable: bool,
    #[bit(3, r)]
    arm_pll_stable: bool,
    #[bit(2, r)]
    io_pll_lock: bool,
    #[bit(1, r)]
    ddr_pll_lock: bool,
    #[bit(0, r)]
    arm_pll_lock: bool,
}

#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum SrcSelArm {
    ArmPll = 0b00,
    ArmPllAlt = 0b01,
    DdrPll = 0b10,
    IoPll = 0b11,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ArmClockControl {
    #[bit(28, rw)]
    cpu_peri_clk_act: bool,
    #[bit(27, rw)]
    cpu_1x_clk_act: bool,
    #[bit(26, rw)]
    cpu_2x_clk_act: bool,
    #[bit(25, rw)]
    cpu_3or2x_clk_act: bool,
    #[bit(24, rw)]
    cpu_6or4x_clk_act: bool,
    #[bits(8..=13, rw)]
    divisor: u6,
    #[bits(4..=5, rw)]
    srcsel: SrcSelArm,
}

/// AMBA peripheral clock gates. A peripheral can only be accessed with an active clock.
#[bitbybit::bitfield(u32, debug)]
pub struct AperClockControl {
    #[bit(22, rw)]
    gpio_1x_clk_act: bool,
    #[bit(21, rw)]
    uart_1_1x_clk_act: bool,
    #[bit(20, rw)]
    uart_0_1x_clk_act: bool,
}

#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum SrcSelIo {
    IoPll = 0b00,
    IoPllAlt = 0b01,
    ArmPll = 0b10,
    DdrPll = 0b11,
}

/// Reference clock control shared by two peripheral instances.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct DualPeriphClockControl {
    #[bits(8..=13, rw)]
    divisor: u6,
    #[bits(4..=5, rw)]
    srcsel: SrcSelIo,
    #[bit(1, rw)]
    clk_1_act: bool,
    #[bit(0, rw)]
    clk_0_act: bool,
}

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum ClockRatioSelect {
    /// 4:2:2:1 ratio of the CPU 6x4x, 3x2x, 2x and 1x clocks.
    FourToTwoToOne = 0b0,
    /// 6:3:2:1 ratio of the CPU 6x4x, 3x2x, 2x and 1x clocks.
    SixToTwoToOne = 0b1,
}

#[bitbybit::bitfield(u32, debug)]
pub struct ClockRatioSelectRegister {
    #[bit(0, rw)]
    sel: ClockRatioSelect,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct ClockControl {
    arm_pll: PllControl,
    ddr_pll: PllControl,
    io_pll: PllControl,
    #[mmio(PureRead)]
    pll_status: PllStatus,
    _reserved_0: [u32; 4],
    arm_clk_ctrl: ArmClockControl,
    _reserved_1: [u32; 2],
    aper_clk_ctrl: AperClockControl,
    _reserved_2: [u32; 9],
    uart_clk_ctrl: DualPeriphClockControl,
    _reserved_3: [u32; 27],
    clk_621_true: ClockRatioSelectRegister,
}

static_assertions::const_assert_eq!(core::mem::size_of::<ClockControl>(), 0xC8);

impl ClockControl {
    /// Create a new handle to this peripheral.
    ///
    /// Writing to this register requires unlocking the SLCR registers first.
    ///
    /// # Safety
    ///
    /// If you create multiple instances of this handle at the same time, you are responsible for
    /// ensuring that there are no read-modify-write races on any of the registers.
    pub const unsafe fn new_mmio_fixed() -> MmioClockControl<'static> {
        unsafe { Self::new_mmio_at(SLCR_BASE_ADDR + CLOCK_CONTROL_OFFSET) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_offsets() {
        assert_eq!(core::mem::offset_of!(ClockControl, arm_clk_ctrl), 0x20);
        assert_eq!(core::mem::offset_of!(ClockControl, aper_clk_ctrl), 0x2C);
        assert_eq!(core::mem::offset_of!(ClockControl, uart_clk_ctrl), 0x54);
        assert_eq!(core::mem::offset_of!(ClockControl, clk_621_true), 0xC4);
    }
}
