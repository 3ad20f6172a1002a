//! # CPU private watchdog registers
//!
//! The private watchdog of each Cortex-A9 core can either run as a second private timer or as a
//! watchdog which asserts the reset request of the core when the counter reaches zero.
pub use crate::mpcore::PRIV_WDT_BASE_ADDR;

/// Magic words which have to be written in this order to the disable register to switch the
/// watchdog from watchdog mode back to timer mode.
pub const DISABLE_SEQUENCE: [u32; 2] = [0x1234_5678, 0x8765_4321];

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum WdtMode {
    Timer = 0b0,
    Watchdog = 0b1,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Control {
    #[bits(8..=15, rw)]
    prescaler: u8,
    /// Can only be cleared again with the disable sequence or a reset.
    #[bit(3, rw)]
    mode: WdtMode,
    #[bit(2, rw)]
    interrupt_enable: bool,
    /// Only used in timer mode.
    #[bit(1, rw)]
    auto_reload: bool,
    #[bit(0, rw)]
    enable: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct InterruptStatus {
    /// Set when the counter reaches zero in timer mode. Cleared by writing a one.
    #[bit(0, rw)]
    event_flag: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ResetStatus {
    /// Set when the counter reached zero in watchdog mode. Survives the watchdog reset and is
    /// cleared by writing a one.
    #[bit(0, rw)]
    reset_flag: bool,
}

/// CPU private watchdog register access.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct CpuPrivateWatchdog {
    /// Writing the load register also reloads the counter. Writing it restarts the watchdog.
    load: u32,
    /// Writes are ignored in watchdog mode.
    counter: u32,
    control: Control,
    interrupt_status: InterruptStatus,
    reset_status: ResetStatus,
    #[mmio(Write)]
    disable: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<CpuPrivateWatchdog>(), 0x18);

impl CpuPrivateWatchdog {
    /// Create a new CPU private watchdog MMIO instance at the fixed base address.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioCpuPrivateWatchdog<'static> {
        unsafe { Self::new_mmio_at(PRIV_WDT_BASE_ADDR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_decoding() {
        let ctrl = Control::new_with_raw_value(0x0000_FF0B);
        assert_eq!(ctrl.prescaler(), 0xFF);
        assert_eq!(ctrl.mode(), WdtMode::Watchdog);
        assert!(!ctrl.interrupt_enable());
        assert!(ctrl.auto_reload());
        assert!(ctrl.enable());
    }
}
