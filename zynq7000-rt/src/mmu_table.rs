//! Flat 1:1 translation table used by the start-up code.
use crate::mmu::{L1Table, build_flat_l1_table};

#[unsafe(no_mangle)]
#[unsafe(link_section = ".data")]
pub static MMU_L1_PAGE_TABLE: L1Table = L1Table::new(build_flat_l1_table());
