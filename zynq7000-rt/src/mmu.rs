//! The overview of translation table memory attributes is described below.
//!
//!|                       | Memory Range            | Definition in Translation Table   |
//!|-----------------------|-------------------------|-----------------------------------|
//!| DDR                   | 0x00000000 - 0x3FFFFFFF | Normal write-back Cacheable       |
//!| PL                    | 0x40000000 - 0xBFFFFFFF | Strongly Ordered                  |
//!| Reserved              | 0xC0000000 - 0xDFFFFFFF | Unassigned                        |
//!| Memory mapped devices | 0xE0000000 - 0xE02FFFFF | Device Memory                     |
//!| Reserved              | 0xE0300000 - 0xE0FFFFFF | Unassigned                        |
//!| NAND, NOR             | 0xE1000000 - 0xE3FFFFFF | Device memory                     |
//!| SRAM                  | 0xE4000000 - 0xE5FFFFFF | Normal write-back Cacheable       |
//!| Reserved              | 0xE6000000 - 0xF7FFFFFF | Unassigned                        |
//!| AMBA APB Peripherals  | 0xF8000000 - 0xF8FFFFFF | Device Memory                     |
//!| Reserved              | 0xF9000000 - 0xFBFFFFFF | Unassigned                        |
//!| Linear QSPI - XIP     | 0xFC000000 - 0xFDFFFFFF | Normal write-through cacheable    |
//!| Reserved              | 0xFE000000 - 0xFFEFFFFF | Unassigned                        |
//!| OCM                   | 0xFFF00000 - 0xFFFFFFFF | Normal inner write-back cacheable |
//!
//! For region 0x00000000 - 0x3FFFFFFF, a system where DDR is less than 1 GB,
//! region after DDR and before PL is marked as undefined/reserved in translation
//! table. In 0xF8000000 - 0xF8FFFFFF, 0xF8000C00 - 0xF8000FFF, 0xF8010000 -
//! 0xF88FFFFF and 0xF8F03000 to 0xF8FFFFFF are reserved  but due to granual size
//! of 1 MB, it is not possible to define separate regions for them. For region
//! 0xFFF00000 - 0xFFFFFFFF, 0xFFF00000 to 0xFFFB0000 is reserved but due to 1MB
//! granual size, it is not possible to define separate region for it.
use core::cell::UnsafeCell;

use cortex_ar::mmu::{L1Section, SectionAttributes};

pub const MAX_DDR_SIZE: usize = 0x4000_0000;
pub const ONE_MB_U32: u32 = 0x10_0000;
pub const NUM_L1_PAGE_TABLE_ENTRIES: usize = 4096;
pub const ONE_MB: usize = 0x10_0000;

pub mod offsets {
    pub const OFFSET_DDR: usize = 0;
    pub const OFFSET_DDR_ALL_ACCESSIBLE: usize = 0x10_0000;

    pub const OFFSET_FPGA_SLAVE_0: usize = 0x4000_0000;
    pub const OFFSET_FPGA_SLAVE_1_START: usize = 0x8000_0000;
    pub const OFFSET_FPGA_SLAVE_1_END: usize = 0xC000_0000;

    pub const OFFSET_IO_PERIPHERALS_START: usize = 0xE000_0000;
    pub const OFFSET_IO_PERIPHERALS_END: usize = 0xE030_0000;

    pub const OFFSET_NAND_MEMORY: usize = 0xE100_0000;
    pub const OFFSET_NOR_MEMORY: usize = 0xE200_0000;
    pub const OFFSET_SRAM_MEMORY: usize = 0xE400_0000;
    pub const OFFSET_SMC_MEMORIES_END: usize = 0xE600_0000;

    /// 0xf8000c00 to 0xf8000fff, 0xf8010000 to 0xf88fffff and
    /// 0xf8f03000 to 0xf8ffffff are reserved  but due to granual size of
    /// 1MB, it is not possible to define separate regions for them.
    pub const OFFSET_AMBA_APB_START: usize = 0xF800_0000;
    pub const OFFSET_AMBA_APB_END: usize = 0xF900_0000;

    pub const OFFSET_QSPI_XIP_START: usize = 0xFC00_0000;
    pub const OFFSET_QSPI_XIP_END: usize = 0xFE00_0000;

    /// 0xfff00000 to 0xfffb0000 is reserved but due to granual size of
    /// 1MB, it is not possible to define separate region for it
    pub const OFFSET_OCM_MAPPED_HIGH_START: usize = 0xFFF0_0000;
    pub const OFFSET_OCM_MAPPED_HIGH_END: u64 = 0x1_0000_0000;
}
pub mod segments {
    pub use super::offsets::*;
    use super::{MAX_DDR_SIZE, ONE_MB};

    /// First 1 MB of DDR has special treatment, access is dependant on SCU/OCM state.
    /// Refer to Zynq TRM UG585 p.106 for more details.
    pub const DDR_FULL_ACCESSIBLE: usize = (MAX_DDR_SIZE - ONE_MB) / ONE_MB;
    pub const FPGA_SLAVE: usize = (OFFSET_FPGA_SLAVE_1_START - OFFSET_FPGA_SLAVE_0) / ONE_MB;
    pub const UNASSIGNED_0: usize =
        (OFFSET_IO_PERIPHERALS_START - OFFSET_FPGA_SLAVE_1_END) / ONE_MB;
    pub const IO_PERIPHS: usize =
        (OFFSET_IO_PERIPHERALS_END - OFFSET_IO_PERIPHERALS_START) / ONE_MB;
    pub const UNASSIGNED_1: usize = (OFFSET_NAND_MEMORY - OFFSET_IO_PERIPHERALS_END) / ONE_MB;
    pub const NAND: usize = (OFFSET_NOR_MEMORY - OFFSET_NAND_MEMORY) / ONE_MB;
    pub const NOR: usize = (OFFSET_SRAM_MEMORY - OFFSET_NOR_MEMORY) / ONE_MB;
    pub const SRAM: usize = (OFFSET_SMC_MEMORIES_END - OFFSET_SRAM_MEMORY) / ONE_MB;
    pub const SEGMENTS_UNASSIGNED_2: usize =
        (OFFSET_AMBA_APB_START - OFFSET_SMC_MEMORIES_END) / ONE_MB;
    pub const AMBA_APB: usize = (OFFSET_AMBA_APB_END - OFFSET_AMBA_APB_START) / ONE_MB;
    pub const UNASSIGNED_3: usize = (OFFSET_QSPI_XIP_START - OFFSET_AMBA_APB_END) / ONE_MB;
    pub const QSPI_XIP: usize = (OFFSET_QSPI_XIP_END - OFFSET_QSPI_XIP_START) / ONE_MB;
    pub const UNASSIGNED_4: usize = (OFFSET_OCM_MAPPED_HIGH_START - OFFSET_QSPI_XIP_END) / ONE_MB;
    pub const OCM_MAPPED_HIGH: usize = ((OFFSET_OCM_MAPPED_HIGH_END
        - OFFSET_OCM_MAPPED_HIGH_START as u64)
        / ONE_MB as u64) as usize;
}

pub use offsets::*;

pub mod section_attrs {
    use arbitrary_int::u4;
    use cortex_ar::mmu::{
        AccessPermissions, CacheableMemoryAttribute, MemoryRegionAttributes, SectionAttributes,
    };

    pub const DEFAULT_DOMAIN: u4 = u4::new(0b0000);
    // DDR is in different domain, but all domains are set as manager domains during run-time
    // initialization.
    pub const DDR_DOMAIN: u4 = u4::new(0b1111);

    pub const DDR: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: true,
        access: AccessPermissions::FullAccess,
        // Manager domain
        domain: DDR_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::CacheableMemory {
            inner: CacheableMemoryAttribute::WriteBackWriteAlloc,
            outer: CacheableMemoryAttribute::WriteBackWriteAlloc,
        }
        .as_raw(),
    };
    pub const FPGA_SLAVES: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: false,
        access: AccessPermissions::FullAccess,
        domain: DEFAULT_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::StronglyOrdered.as_raw(),
    };
    pub const SHAREABLE_DEVICE: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: false,
        access: AccessPermissions::FullAccess,
        domain: DEFAULT_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::ShareableDevice.as_raw(),
    };
    pub const SRAM: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: false,
        access: AccessPermissions::FullAccess,
        domain: DEFAULT_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::OuterAndInnerWriteBackNoWriteAlloc.as_raw(),
    };
    pub const QSPI_XIP: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: false,
        access: AccessPermissions::FullAccess,
        domain: DEFAULT_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::OuterAndInnerWriteThroughNoWriteAlloc.as_raw(),
    };
    pub const OCM_MAPPED_HIGH: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: false,
        access: AccessPermissions::FullAccess,
        domain: DEFAULT_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::CacheableMemory {
            inner: CacheableMemoryAttribute::WriteThroughNoWriteAlloc,
            outer: CacheableMemoryAttribute::NonCacheable,
        }
        .as_raw(),
    };
    pub const UNASSIGNED_RESERVED: SectionAttributes = SectionAttributes {
        non_global: false,
        p_bit: false,
        shareable: false,
        access: AccessPermissions::PermissionFault,
        domain: DEFAULT_DOMAIN,
        execute_never: false,
        memory_attrs: MemoryRegionAttributes::StronglyOrdered.as_raw(),
    };
}

/// Attributes of the 1 MB section starting at the given address.
pub const fn section_attrs_for_addr(addr: u32) -> SectionAttributes {
    let addr = addr as usize;
    if addr < OFFSET_FPGA_SLAVE_0 {
        section_attrs::DDR
    } else if addr < OFFSET_FPGA_SLAVE_1_END {
        section_attrs::FPGA_SLAVES
    } else if addr < OFFSET_IO_PERIPHERALS_START {
        section_attrs::UNASSIGNED_RESERVED
    } else if addr < OFFSET_IO_PERIPHERALS_END {
        section_attrs::SHAREABLE_DEVICE
    } else if addr < OFFSET_NAND_MEMORY {
        section_attrs::UNASSIGNED_RESERVED
    } else if addr < OFFSET_SRAM_MEMORY {
        section_attrs::SHAREABLE_DEVICE
    } else if addr < OFFSET_SMC_MEMORIES_END {
        section_attrs::SRAM
    } else if addr < OFFSET_AMBA_APB_START {
        section_attrs::UNASSIGNED_RESERVED
    } else if addr < OFFSET_AMBA_APB_END {
        section_attrs::SHAREABLE_DEVICE
    } else if addr < OFFSET_QSPI_XIP_START {
        section_attrs::UNASSIGNED_RESERVED
    } else if addr < OFFSET_QSPI_XIP_END {
        section_attrs::QSPI_XIP
    } else if addr < OFFSET_OCM_MAPPED_HIGH_START {
        section_attrs::UNASSIGNED_RESERVED
    } else {
        section_attrs::OCM_MAPPED_HIGH
    }
}

/// Flat 1:1 mapping of the whole 4 GB address space with 1 MB sections.
pub const fn build_flat_l1_table() -> [L1Section; NUM_L1_PAGE_TABLE_ENTRIES] {
    let mut table = [L1Section::new_with_raw_value(0); NUM_L1_PAGE_TABLE_ENTRIES];
    let mut idx = 0;
    while idx < NUM_L1_PAGE_TABLE_ENTRIES {
        let addr = idx as u32 * ONE_MB_U32;
        table[idx] = L1Section::new(addr, section_attrs_for_addr(addr));
        idx += 1;
    }
    table
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("address is not aligned to 1MB boundary")]
pub struct AddrNotAlignedToOneMb;

#[repr(C, align(16384))]
pub struct L1TableRaw(pub [L1Section; NUM_L1_PAGE_TABLE_ENTRIES]);

impl L1TableRaw {
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const u32 {
        self.0.as_ptr() as *const _
    }

    /// Index of the section entry for the given 1 MB aligned address.
    pub const fn section_index(addr: u32) -> Result<usize, AddrNotAlignedToOneMb> {
        if addr & 0x000F_FFFF != 0 {
            return Err(AddrNotAlignedToOneMb);
        }
        Ok((addr / ONE_MB_U32) as usize)
    }

    /// Change the attributes of one section and flush the affected caches and TLBs.
    #[cfg(target_arch = "arm")]
    pub fn update(
        &mut self,
        addr: u32,
        section_attrs: SectionAttributes,
    ) -> Result<(), AddrNotAlignedToOneMb> {
        let index = Self::section_index(addr)?;
        self.0[index].set_section_attrs(section_attrs);

        // 32 kB 4-way associative L1 data cache with 32 byte lines: A == 2, N == 5, S == 8
        cortex_ar::cache::clean_and_invalidate_l1_data_cache::<2, 5, 8>();
        cortex_ar::register::TlbIAll::write();
        cortex_ar::register::BpIAll::write();
        cortex_ar::asm::dsb();
        cortex_ar::asm::isb();
        Ok(())
    }
}

/// Static L1 table which can be placed in the data section and still be updated at run-time.
#[repr(transparent)]
pub struct L1Table(pub UnsafeCell<L1TableRaw>);

unsafe impl Sync for L1Table {}

impl L1Table {
    #[inline]
    pub const fn new(l1_table: [L1Section; NUM_L1_PAGE_TABLE_ENTRIES]) -> L1Table {
        L1Table(UnsafeCell::new(L1TableRaw(l1_table)))
    }
}

pub struct L1TableWrapper<'a>(pub &'a mut L1TableRaw);

impl<'a> L1TableWrapper<'a> {
    pub fn new(l1_table: &'a mut L1TableRaw) -> L1TableWrapper<'a> {
        L1TableWrapper(l1_table)
    }

    #[cfg(target_arch = "arm")]
    pub fn update(
        &mut self,
        addr: u32,
        section_attrs: SectionAttributes,
    ) -> Result<(), AddrNotAlignedToOneMb> {
        self.0.update(addr, section_attrs)
    }
}

/// Load the MMU translation table base address into the MMU.
///
/// # Safety
///
/// Writes the translation table base register directly. It has to be called once in the boot
/// code while the MMU is still disabled.
#[unsafe(no_mangle)]
#[cfg(all(feature = "rt", target_arch = "arm"))]
unsafe extern "C" fn load_mmu_table() {
    let table_base = crate::mmu_table::MMU_L1_PAGE_TABLE.0.get() as u32;

    unsafe {
        core::arch::asm!(
            "orr {0}, {0}, #0x5B",     // Outer-cacheable, WB
            "mcr p15, 0, {0}, c2, c0, 0", // Load table pointer
            inout(reg) table_base => _,
            options(nostack, preserves_flags)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_ar::mmu::AccessPermissions;

    #[test]
    fn segment_counts_cover_address_space() {
        let total = 1
            + segments::DDR_FULL_ACCESSIBLE
            + 2 * segments::FPGA_SLAVE
            + segments::UNASSIGNED_0
            + segments::IO_PERIPHS
            + segments::UNASSIGNED_1
            + segments::NAND
            + segments::NOR
            + segments::SRAM
            + segments::SEGMENTS_UNASSIGNED_2
            + segments::AMBA_APB
            + segments::UNASSIGNED_3
            + segments::QSPI_XIP
            + segments::UNASSIGNED_4
            + segments::OCM_MAPPED_HIGH;
        assert_eq!(total, NUM_L1_PAGE_TABLE_ENTRIES);
    }

    #[test]
    fn attributes_of_used_regions() {
        assert_eq!(section_attrs_for_addr(0x0010_0000).domain, section_attrs::DDR_DOMAIN);
        // AXI peripheral in the PL
        assert_eq!(
            section_attrs_for_addr(0x43C0_0000).access,
            AccessPermissions::FullAccess
        );
        assert_eq!(
            section_attrs_for_addr(0xC000_0000).access,
            AccessPermissions::PermissionFault
        );
        // GPIO and UART
        assert_eq!(
            section_attrs_for_addr(0xE000_0000).access,
            AccessPermissions::FullAccess
        );
        // SLCR, TTC and the private CPU region
        assert_eq!(
            section_attrs_for_addr(0xF8F0_0000).access,
            AccessPermissions::FullAccess
        );
        assert_eq!(
            section_attrs_for_addr(0xFFF0_0000).access,
            AccessPermissions::FullAccess
        );
    }

    #[test]
    fn section_index_requires_alignment() {
        assert_eq!(L1TableRaw::section_index(0xF800_0000), Ok(0xF80));
        assert_eq!(
            L1TableRaw::section_index(0xF800_1000),
            Err(AddrNotAlignedToOneMb)
        );
    }
}
