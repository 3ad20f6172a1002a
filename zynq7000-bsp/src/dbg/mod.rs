//! # Register debug helpers
//!
//! These helpers deliberately bypass the drivers and access the hardware registers at their
//! fixed physical addresses. They are used to inspect the state of a peripheral independently
//! of what a driver believes the state is.
pub mod ps7;
pub mod ttc;
pub mod wdt;

/// Volatile read of a processing system register.
#[inline]
pub(crate) fn read_reg(addr: usize) -> u32 {
    // Safety: Only called with addresses of memory mapped registers of the processing system,
    // which are always mapped and aligned.
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Volatile write of a processing system register.
#[inline]
pub(crate) fn write_reg(addr: usize, value: u32) {
    // Safety: See [read_reg].
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}
