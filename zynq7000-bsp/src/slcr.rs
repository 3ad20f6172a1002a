//! # System Level Control Register (SLCR) access
//!
//! All SLCR registers are write protected. Every write helper in this module unlocks the block,
//! performs the write and locks it again.
use zynq7000::slcr::{MmioSlcr, RebootStatus};

pub const LOCK_KEY: u32 = 0x767B;
pub const UNLOCK_KEY: u32 = 0xDF0D;

pub struct Slcr(MmioSlcr<'static>);

impl Slcr {
    /// Run a closure with an unlocked SLCR block and lock it again afterwards.
    ///
    /// # Safety
    ///
    /// This method unsafely steals the SLCR MMIO block. It is the user's responsibility
    /// that the SLCR is not used concurrently in a way which leads to data races.
    pub unsafe fn with<R, F: FnOnce(&mut MmioSlcr<'static>) -> R>(f: F) -> R {
        let mut slcr = unsafe { zynq7000::slcr::Slcr::new_mmio_fixed() };
        slcr.write_unlock(UNLOCK_KEY);
        let result = f(&mut slcr);
        slcr.write_lock(LOCK_KEY);
        result
    }

    pub fn new(slcr: MmioSlcr<'static>) -> Self {
        Self(slcr)
    }

    /// # Safety
    ///
    /// This allows to create an arbitrary number of SLCR wrappers. It is the user's
    /// responsibility that these wrappers are not used concurrently in a way which leads to
    /// data races.
    pub unsafe fn steal() -> Self {
        Self::new(unsafe { zynq7000::slcr::Slcr::new_mmio_fixed() })
    }

    /// The MMIO block is not unlocked, but all registers can still be read.
    pub fn regs(&mut self) -> &mut MmioSlcr<'static> {
        &mut self.0
    }

    /// Unlock the block, call the closure and lock the block again.
    pub fn modify<F: FnMut(&mut MmioSlcr)>(&mut self, mut f: F) {
        self.0.write_unlock(UNLOCK_KEY);
        f(&mut self.0);
        self.0.write_lock(LOCK_KEY);
    }

    /// Reboot status of the last reset. The flags survive every reset except the power-on reset.
    pub fn reboot_status(&mut self) -> RebootStatus {
        self.0.read_reboot_status()
    }

    /// Clear the reset reason flags so the next boot only reports the next reset.
    pub fn clear_reboot_reasons(&mut self) {
        self.modify(|regs| {
            regs.modify_reboot_status(|mut val| {
                val.set_awdt0_reset(false);
                val.set_awdt1_reset(false);
                val.set_swdt_reset(false);
                val.set_slcr_soft_reset(false);
                val.set_debug_reset(false);
                val.set_srst_b(false);
                val.set_power_on_reset(false);
                val
            })
        });
    }
}
