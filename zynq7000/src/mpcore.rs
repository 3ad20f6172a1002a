//! Application processing unit private memory region (mpcore)
//!
//! Based on the APU register overview of the Zynq-7000 TRM. The snoop control unit, the
//! interrupt controller, the private timer and the private watchdog all live in this 8 kB
//! region.
use arbitrary_int::{u2, u4};
use static_assertions::const_assert_eq;

pub const MPCORE_BASE_ADDR: usize = 0xF8F0_0000;
pub const SCU_BASE_ADDR: usize = MPCORE_BASE_ADDR;
pub const GICC_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x100;
pub const PRIV_TIM_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x600;
pub const PRIV_WDT_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x620;
pub const GICD_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x1000;

#[bitbybit::bitfield(u32, debug)]
pub struct ScuConfig {
    /// Bit `n` set means CPU `n` takes part in coherency.
    #[bits(4..=7, r)]
    cpus_smp: u4,
    /// Number of CPUs minus one.
    #[bits(0..=1, r)]
    cpu_number: u2,
}

/// Snoop control unit. Only the identification part is modelled.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Scu {
    ctrl: u32,
    #[mmio(PureRead)]
    config: ScuConfig,
    #[mmio(PureRead)]
    cpu_power_status: u32,
    invalidate_all_regs_in_secure_state: u32,
}

const_assert_eq!(core::mem::size_of::<Scu>(), 0x10);

impl Scu {
    /// Create a new Snoop Control Unit interface at the fixed base address.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioScu<'static> {
        unsafe { Self::new_mmio_at(SCU_BASE_ADDR) }
    }
}
