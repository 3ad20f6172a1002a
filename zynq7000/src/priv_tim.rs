//! # CPU private timer registers
//!
//! Every Cortex-A9 core has its own 32 bit private timer clocked with half the CPU clock
//! (CPU_3x2x). The registers are banked per core.
pub use crate::mpcore::PRIV_TIM_BASE_ADDR;

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Control {
    #[bits(8..=15, rw)]
    prescaler: u8,
    #[bit(2, rw)]
    interrupt_enable: bool,
    /// Reload the counter from the load register when it reaches zero.
    #[bit(1, rw)]
    auto_reload: bool,
    #[bit(0, rw)]
    enable: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct InterruptStatus {
    /// Set when the counter reaches zero. Cleared by writing a one.
    #[bit(0, rw)]
    event_flag: bool,
}

/// CPU private timer register access.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct CpuPrivateTimer {
    /// Writing the load register also updates the counter register.
    load: u32,
    counter: u32,
    control: Control,
    interrupt_status: InterruptStatus,
}

static_assertions::const_assert_eq!(core::mem::size_of::<CpuPrivateTimer>(), 0x10);

impl CpuPrivateTimer {
    /// Create a new CPU private timer MMIO instance at the fixed base address.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    ///
    /// The registers are private to each CPU core, which might lead to unexpected results when
    /// this structure is shared in a SMP system.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioCpuPrivateTimer<'static> {
        unsafe { Self::new_mmio_at(PRIV_TIM_BASE_ADDR) }
    }
}
