//! # Generic interrupt controller (GIC) registers
//!
//! The Cortex-A9 MPCore embeds an ARM PL390 compatible controller with 96 interrupt lines:
//! 16 software generated interrupts (SGI), 16 private peripheral interrupts (PPI) and 64 shared
//! peripheral interrupts (SPI).
pub use crate::mpcore::{GICC_BASE_ADDR, GICD_BASE_ADDR};
use arbitrary_int::{u3, u4, u5, u10, u12};
use static_assertions::const_assert_eq;

/// Implementer code of ARM inside the identification registers.
pub const ARM_IMPLEMENTER_ID: u16 = 0x43B;

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct DistributorControl {
    #[bit(1, rw)]
    enable_non_secure: bool,
    #[bit(0, rw)]
    enable_secure: bool,
}

/// Interrupt controller type register. Only returns fixed values.
#[bitbybit::bitfield(u32, debug)]
pub struct ControllerType {
    #[bits(11..=15, r)]
    lspi: u5,
    #[bit(10, r)]
    security_extension: bool,
    /// Number of CPU interfaces minus one.
    #[bits(5..=7, r)]
    cpu_number: u3,
    /// Number of interrupt lines is `32 * (it_lines_number + 1)`.
    #[bits(0..=4, r)]
    it_lines_number: u5,
}

impl ControllerType {
    pub const NUM_OF_CPUS: usize = 2;
    pub const NUM_OF_INTERRUPTS: usize = 96;

    #[inline]
    pub fn num_cpus(&self) -> usize {
        self.cpu_number().value() as usize + 1
    }

    #[inline]
    pub fn num_interrupts(&self) -> usize {
        32 * (self.it_lines_number().value() as usize + 1)
    }
}

/// Layout shared by the distributor and CPU interface identification registers.
#[bitbybit::bitfield(u32, debug)]
pub struct Identification {
    #[bits(24..=31, r)]
    product_id: u8,
    #[bits(16..=19, r)]
    variant: u4,
    #[bits(12..=15, r)]
    revision: u4,
    #[bits(0..=11, r)]
    implementer: u12,
}

/// GIC Distributor registers.
#[derive(derive_mmio::Mmio)]
#[repr(C, align(8))]
pub struct GicDistributor {
    /// Distributor Control Register
    pub dcr: DistributorControl,
    /// Interrupt Controller Type Register
    #[mmio(PureRead)]
    pub ictr: ControllerType,
    /// Distributor Implementer Identification Register
    #[mmio(PureRead)]
    pub iidr: Identification,
    _reserved_0: [u32; 0x1D],
    /// Interrupt security registers
    pub isr: [u32; 3],
    _reserved_1: [u32; 0x1D],
    /// Interrupt Set-Enable Registers
    pub iser: [u32; 3],
    _reserved_2: [u32; 0x1D],
    /// Interrupt Clear-Enable Registers
    pub icer: [u32; 3],
    _reserved_3: [u32; 0x1D],
    /// Interrupt Set-Pending Registers
    pub ispr: [u32; 3],
    _reserved_4: [u32; 0x1D],
    /// Interrupt Clear-Pending Registers
    pub icpr: [u32; 3],
    _reserved_5: [u32; 0x1D],
    /// Active Bit Registers
    pub abr: [u32; 3],
    _reserved_6: [u32; 0x3D],
    /// Interrupt Priority Registers, one byte per interrupt.
    pub ipr: [u32; 0x18],
    _reserved_7: [u32; 0xE8],
    /// Interrupt processor target registers for SGIs and PPIs. Read-only.
    pub iptr_private: [u32; 0x8],
    /// Interrupt processor target registers for SPIs, one byte per interrupt.
    pub iptr_spi: [u32; 0x10],
    _reserved_8: [u32; 0xE8],
    /// Interrupt configuration registers, two bits per interrupt. Index 0 covers SGIs,
    /// index 1 PPIs and indices 2 to 5 the SPIs.
    pub icfr: [u32; 6],
    _reserved_9: [u32; 0x3A],
    pub ppi_status: u32,
    pub spi_status: [u32; 2],
    _reserved_10: [u32; 0x7D],
    /// Software Generated Interrupt Register.
    pub sgir: u32,
    _reserved_11: [u32; 0x33],
    pub pidr: [u32; 8],
    pub cidr: [u32; 4],
}

const_assert_eq!(core::mem::size_of::<GicDistributor>(), 0x1000);

impl GicDistributor {
    /// Create a new distributor MMIO instance at the fixed address of the processing system.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioGicDistributor<'static> {
        unsafe { Self::new_mmio_at(GICD_BASE_ADDR) }
    }
}

/// CPU interface control register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct InterfaceControl {
    #[bit(4, rw)]
    sbpr: bool,
    #[bit(3, rw)]
    fiq_en: bool,
    #[bit(2, rw)]
    ack_ctrl: bool,
    #[bit(1, rw)]
    enable_non_secure: bool,
    #[bit(0, rw)]
    enable_secure: bool,
}

#[bitbybit::bitfield(u32, debug)]
pub struct PriorityRegister {
    #[bits(0..=7, rw)]
    priority: u8,
}

/// Layout of the acknowledge, end of interrupt and highest pending registers.
#[bitbybit::bitfield(u32, debug)]
pub struct InterruptSignal {
    /// Source CPU of an SGI.
    #[bits(10..=12, rw)]
    cpu_id: u3,
    #[bits(0..=9, rw)]
    ack_int_id: u10,
}

/// GIC CPU interface registers.
#[derive(derive_mmio::Mmio)]
#[repr(C, align(8))]
pub struct GicCpuInterface {
    /// CPU Interface Control Register (ICR).
    pub icr: InterfaceControl,
    /// Interrupt Priority Mask Register.
    pub pmr: PriorityRegister,
    /// Binary Point Register.
    pub bpr: u32,
    /// Interrupt Acknowledge Register.
    pub iar: InterruptSignal,
    /// End of Interrupt Register.
    pub eoir: InterruptSignal,
    /// Running Priority Register.
    pub rpr: PriorityRegister,
    /// Highest Pending Interrupt Register.
    pub hpir: InterruptSignal,
    /// Aliased Binary Point Register
    pub abpr: u32,
    _reserved_0: [u32; 0x37],
    /// CPU Interface Identification Register.
    #[mmio(PureRead)]
    pub iidr: Identification,
}

const_assert_eq!(core::mem::size_of::<GicCpuInterface>(), 0x100);

impl GicCpuInterface {
    /// Create a new CPU interface MMIO instance at the fixed address of the processing system.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    #[inline]
    pub const unsafe fn new_mmio_fixed() -> MmioGicCpuInterface<'static> {
        unsafe { Self::new_mmio_at(GICC_BASE_ADDR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distributor_type_register_decoding() {
        // Reset value of ICDICTR on the Zynq 7000.
        let ictr = ControllerType::new_with_raw_value(0x0000_FC22);
        assert_eq!(ictr.num_cpus(), ControllerType::NUM_OF_CPUS);
        assert_eq!(ictr.num_interrupts(), ControllerType::NUM_OF_INTERRUPTS);
        assert_eq!(ictr.lspi().value(), 0x1F);
    }

    #[test]
    fn identification_decoding() {
        let iidr = Identification::new_with_raw_value(0x0102_043B);
        assert_eq!(iidr.implementer().value(), ARM_IMPLEMENTER_ID);
        assert_eq!(iidr.product_id(), 0x01);
        assert_eq!(iidr.variant().value(), 0x2);
        assert_eq!(iidr.revision().value(), 0x0);
    }
}
