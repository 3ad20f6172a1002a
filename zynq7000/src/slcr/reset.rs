//! SLCR peripheral reset control registers.
use super::{RESET_BLOCK_OFFSET, SLCR_BASE_ADDR};

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct DualRefAndClockReset {
    /// Peripheral 1 reference clock domain reset.
    #[bit(3, rw)]
    periph1_ref_rst: bool,
    /// Peripheral 0 reference clock domain reset.
    #[bit(2, rw)]
    periph0_ref_rst: bool,
    /// Peripheral 1 AMBA clock domain reset.
    #[bit(1, rw)]
    periph1_cpu1x_rst: bool,
    /// Peripheral 0 AMBA clock domain reset.
    #[bit(0, rw)]
    periph0_cpu1x_rst: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct GpioClockReset {
    #[bit(0, rw)]
    gpio_cpu1x_rst: bool,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct ResetControl {
    /// PS software reset. Writing bit 0 resets the whole system.
    pss: u32,
    _reserved_0: [u32; 9],
    uart: DualRefAndClockReset,
    gpio: GpioClockReset,
    _reserved_1: [u32; 7],
    /// Selects whether a private watchdog resets the whole system or only its CPU.
    rs_awdt: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<ResetControl>(), 0x50);

impl ResetControl {
    /// Create a new handle to this peripheral.
    ///
    /// Writing to this register requires unlocking the SLCR registers first.
    ///
    /// # Safety
    ///
    /// If you create multiple instances of this handle at the same time, you are responsible for
    /// ensuring that there are no read-modify-write races on any of the registers.
    pub const unsafe fn new_mmio_fixed() -> MmioResetControl<'static> {
        unsafe { Self::new_mmio_at(SLCR_BASE_ADDR + RESET_BLOCK_OFFSET) }
    }
}
