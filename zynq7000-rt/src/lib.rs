//! # Rust bare metal run-time support for the AMD Zynq 7000 SoCs
//!
//! This includes basic low-level startup code similar to the bare-metal boot routines
//! [provided by Xilinx](https://github.com/Xilinx/embeddedsw/tree/master/lib/bsp/standalone/src/arm/cortexa9/gcc).
//! Some differences:
//!
//! - The MMU table is built as a constant in Rust code instead of being generated.
//! - The exception vectors and the linker script are provided by [cortex_a_rt], which is
//!   re-exported.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#[cfg(test)]
extern crate std;

#[cfg(all(feature = "rt", target_arch = "arm"))]
pub use cortex_a_rt::*;

pub mod boot;
pub mod mmu;
#[cfg(feature = "rt")]
mod mmu_table;
#[cfg(all(feature = "rt", target_arch = "arm"))]
pub mod rt;

/// Retrieves a mutable wrapper around the MMU L1 page table used by the start-up code.
#[cfg(all(feature = "rt", target_arch = "arm"))]
pub fn mmu_l1_table_mut() -> mmu::L1TableWrapper<'static> {
    let mmu_table = mmu_table::MMU_L1_PAGE_TABLE.0.get();
    // Safety: We retrieve a reference to the MMU page table singleton.
    mmu::L1TableWrapper::new(unsafe { &mut *mmu_table })
}
