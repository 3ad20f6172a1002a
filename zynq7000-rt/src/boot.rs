//! Registers and values used by the start-up code before `boot_core` runs.
use cortex_ar::register::{Cpsr, cpsr::ProcessorMode};
use zynq7000::{
    mpcore::{MPCORE_BASE_ADDR, SCU_BASE_ADDR},
    slcr::SLCR_BASE_ADDR,
};

pub const SCU_CONTROL: usize = SCU_BASE_ADDR;
pub const SCU_INVALIDATE_ALL: usize = SCU_BASE_ADDR + 0x0C;

/// PL310 L2 cache controller.
pub const L2C_BASE_ADDR: usize = MPCORE_BASE_ADDR + 0x2000;
pub const L2C_CONTROL: usize = L2C_BASE_ADDR + 0x100;
pub const L2C_AUX_CONTROL: usize = L2C_BASE_ADDR + 0x104;
pub const L2C_TAG_RAM_LATENCY: usize = L2C_BASE_ADDR + 0x108;
pub const L2C_DATA_RAM_LATENCY: usize = L2C_BASE_ADDR + 0x10C;
pub const L2C_RAW_INT_STATUS: usize = L2C_BASE_ADDR + 0x21C;
pub const L2C_INT_CLEAR: usize = L2C_BASE_ADDR + 0x220;
pub const L2C_INVALIDATE_BY_WAY: usize = L2C_BASE_ADDR + 0x77C;

pub const SLCR_LOCK: usize = SLCR_BASE_ADDR + 0x04;
pub const SLCR_UNLOCK: usize = SLCR_BASE_ADDR + 0x08;
pub const SLCR_A9_CPU_RST_CTRL: usize = SLCR_BASE_ADDR + 0x244;
pub const SLCR_L2C_RAM: usize = SLCR_BASE_ADDR + 0xA1C;
pub const EFUSE_STATUS: usize = 0xF800_D010;

pub const SLCR_LOCK_KEY: u32 = 0x767B;
pub const SLCR_UNLOCK_KEY: u32 = 0xDF0D;

/// Set in the eFuse status register on single core devices.
pub const EFUSE_CPU1_DISABLED: u32 = 1 << 7;
/// Reset and clock stop bits of CPU 1 in the A9 CPU reset control register.
pub const CPU1_HALT: u32 = (1 << 5) | (1 << 1);

/// Prefetching, parity, event bus and 64 kB way size.
pub const L2C_AUX_CONTROL_VALUE: u32 = 0x7236_0000;
pub const L2C_TAG_RAM_LATENCY_VALUE: u32 = 0x0111;
pub const L2C_DATA_RAM_LATENCY_VALUE: u32 = 0x0121;
/// Required L2C RAM timing, see the Zynq TRM SLCR chapter.
pub const L2C_RAM_CONFIG: u32 = 0x0002_0202;
pub const L2C_ALL_WAYS: u32 = 0xFFFF;

/// SCTLR with the MMU, the data cache and the instruction cache enabled.
pub const SCTLR_MMU_AND_CACHES: u32 = (1 << 12) | (1 << 2) | 1;

/// CPSR value for the given mode with IRQs and FIQs masked.
pub const fn masked_mode(mode: ProcessorMode) -> u32 {
    Cpsr::new_with_raw_value(0)
        .with_mode(mode)
        .with_i(true)
        .with_f(true)
        .raw_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_mode_values() {
        assert_eq!(masked_mode(ProcessorMode::Irq), 0xD2);
        assert_eq!(masked_mode(ProcessorMode::Fiq), 0xD1);
        assert_eq!(masked_mode(ProcessorMode::Sys), 0xDF);
    }

    #[test]
    fn register_addresses() {
        assert_eq!(L2C_CONTROL, 0xF8F0_2100);
        assert_eq!(L2C_INVALIDATE_BY_WAY, 0xF8F0_277C);
        assert_eq!(SCU_INVALIDATE_ALL, 0xF8F0_000C);
        assert_eq!(SLCR_A9_CPU_RST_CTRL, 0xF800_0244);
        assert_eq!(SLCR_L2C_RAM, 0xF800_0A1C);
    }

    #[test]
    fn control_values() {
        assert_eq!(SCTLR_MMU_AND_CACHES, 0x1005);
        assert_eq!(CPU1_HALT, 0x22);
    }
}
