//! # Generic Interrupt Controller (GIC) module
//!
//! The [GicConfigurator] sets up and enables the controller, the [GicInterruptHelper] is used
//! inside the IRQ exception handler to acknowledge and end interrupts, and the [dispatch] module
//! routes acknowledged interrupts to registered handlers.
use arbitrary_int::Number;

use cortex_ar::interrupt;
use zynq7000::gic::{
    ARM_IMPLEMENTER_ID, ControllerType, DistributorControl, GicCpuInterface, GicDistributor,
    InterfaceControl, InterruptSignal, MmioGicCpuInterface, MmioGicDistributor, PriorityRegister,
};

pub mod dispatch;

pub const SPURIOUS_INTERRUPT_ID: u32 = 1023;
pub const NUM_INTERRUPTS: usize = ControllerType::NUM_OF_INTERRUPTS;

/// These fixed values must be programmed according to the Zynq7000 TRM p.236.
/// Configures #32 to #47.
pub const ICFR_2_FIXED_VALUE: u32 = 0b01010101010111010101010001011111;
/// This configures `PL[2:0]` to high-level sensitivity. Configures #48 to #63.
pub const ICFR_3_FIXED_VALUE: u32 = 0b01010101010101011101010101010101;
/// This configures `PL[7:3]` to high-level sensitivity. Configures #64 to #79.
pub const ICFR_4_FIXED_VALUE: u32 = 0b01110101010101010101010101010101;
/// This configures `PL[15:8]` to high-level sensitivity. Configures #80 to #95.
pub const ICFR_5_FIXED_VALUE: u32 = 0b00000011010101010101010101010101;

/// Helper value to target all interrupts which can be targetted to CPU 0
pub const TARGETS_ALL_CPU_0_IPTR_VAL: u32 = 0x01010101;

pub const ACTIVATE_ALL_SGIS_MASK_ISER: u32 = 0x0000_FFFF;
pub const ACTIVATE_ALL_PPIS_MASK_ISER: u32 = 0xF800_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiSensitivity {
    Level = 0b01,
    Edge = 0b11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCpu {
    None = 0b00,
    Cpu0 = 0b01,
    Cpu1 = 0b10,
    Both = 0b11,
}

/// Private Peripheral Interrupt (PPI) which are private to the CPU.
#[derive(Debug, Eq, PartialEq, Clone, Copy, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum PpiInterrupt {
    GlobalTimer = 27,
    // Interrupt signal from the PL. CPU0: `IRQF2P[18]` and CPU1: `IRQF2P[19]`
    NFiq = 28,
    CpuPrivateTimer = 29,
    /// AWDT0 and AWDT1 for each CPU.
    Awdt = 30,
    // Interrupt signal from the PL. CPU0: `IRQF2P[16]` and CPU1: `IRQF2P[17]`
    NIrq = 31,
}

/// Shared Peripheral Interrupt IDs.
#[derive(Debug, Eq, PartialEq, Clone, Copy, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum SpiInterrupt {
    Cpu0 = 32,
    Cpu1 = 33,
    L2Cache = 34,
    Ocm = 35,
    _Reserved0 = 36,
    Pmu0 = 37,
    Pmu1 = 38,
    Xadc = 39,
    DevC = 40,
    Swdt = 41,
    Ttc00 = 42,
    Ttc01 = 43,
    Ttc02 = 44,
    DmacAbort = 45,
    Dmac0 = 46,
    Dmac1 = 47,
    Dmac2 = 48,
    Dmac3 = 49,
    Smc = 50,
    Qspi = 51,
    Gpio = 52,
    Usb0 = 53,
    Eth0 = 54,
    Eth0Wakeup = 55,
    Sdio0 = 56,
    I2c0 = 57,
    Spi0 = 58,
    Uart0 = 59,
    Can0 = 60,
    Pl0 = 61,
    Pl1 = 62,
    Pl2 = 63,
    Pl3 = 64,
    Pl4 = 65,
    Pl5 = 66,
    Pl6 = 67,
    Pl7 = 68,
    Ttc10 = 69,
    Ttc11 = 70,
    Ttc12 = 71,
    Dmac4 = 72,
    Dmac5 = 73,
    Dmac6 = 74,
    Dmac7 = 75,
    Usb1 = 76,
    Eth1 = 77,
    Eth1Wakeup = 78,
    Sdio1 = 79,
    I2c1 = 80,
    Spi1 = 81,
    Uart1 = 82,
    Can1 = 83,
    Pl8 = 84,
    Pl9 = 85,
    Pl10 = 86,
    Pl11 = 87,
    Pl12 = 88,
    Pl13 = 89,
    Pl14 = 90,
    Pl15 = 91,
    ScuParity = 92,
}

impl SpiInterrupt {
    /// Interrupt of the given TTC counter. Returns [None] for invalid IDs.
    pub const fn ttc(ttc: usize, counter: usize) -> Option<Self> {
        Some(match (ttc, counter) {
            (0, 0) => SpiInterrupt::Ttc00,
            (0, 1) => SpiInterrupt::Ttc01,
            (0, 2) => SpiInterrupt::Ttc02,
            (1, 0) => SpiInterrupt::Ttc10,
            (1, 1) => SpiInterrupt::Ttc11,
            (1, 2) => SpiInterrupt::Ttc12,
            _ => return None,
        })
    }
}

/// Interrupt ID wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Sgi(usize),
    Ppi(PpiInterrupt),
    Spi(SpiInterrupt),
    /// Detects an invalid interrupt ID.
    Invalid(usize),
    /// Spurious interrupt (ID# 1023).
    Spurious,
}

impl Interrupt {
    /// Decode a raw interrupt ID.
    pub fn from_id(int_id: u32) -> Self {
        match int_id {
            0..=15 => Interrupt::Sgi(int_id as usize),
            27..=31 => PpiInterrupt::try_from(int_id as u8)
                .map(Interrupt::Ppi)
                .unwrap_or(Interrupt::Invalid(int_id as usize)),
            32..=92 => SpiInterrupt::try_from(int_id as u8)
                .map(Interrupt::Spi)
                .unwrap_or(Interrupt::Invalid(int_id as usize)),
            SPURIOUS_INTERRUPT_ID => Interrupt::Spurious,
            _ => Interrupt::Invalid(int_id as usize),
        }
    }

    /// Raw interrupt ID, [None] for spurious interrupts.
    pub fn id(&self) -> Option<usize> {
        match self {
            Interrupt::Sgi(id) | Interrupt::Invalid(id) => Some(*id),
            Interrupt::Ppi(ppi) => Some(*ppi as usize),
            Interrupt::Spi(spi) => Some(*spi as usize),
            Interrupt::Spurious => None,
        }
    }
}

impl From<PpiInterrupt> for Interrupt {
    fn from(value: PpiInterrupt) -> Self {
        Interrupt::Ppi(value)
    }
}

impl From<SpiInterrupt> for Interrupt {
    fn from(value: SpiInterrupt) -> Self {
        Interrupt::Spi(value)
    }
}

#[derive(Debug)]
pub struct InterruptInfo {
    raw_reg: InterruptSignal,
    interrupt: Interrupt,
    cpu_id: u8,
}

impl InterruptInfo {
    pub fn raw_reg(&self) -> InterruptSignal {
        self.raw_reg
    }

    pub fn cpu_id(&self) -> u8 {
        self.cpu_id
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid PL interrupt ID {0}")]
pub struct InvalidPlInterruptId(pub usize);

/// Invalid Software Generated Interrupt (SGI) ID.
#[derive(Debug, thiserror::Error)]
#[error("Invalid SGI interrupt ID {0}")]
pub struct InvalidSgiInterruptId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GicSelfTestError {
    #[error("unexpected implementer {0:#x} in the distributor identification")]
    DistributorImplementer(u16),
    #[error("unexpected implementer {0:#x} in the CPU interface identification")]
    CpuInterfaceImplementer(u16),
    #[error("distributor reports {0} CPU interfaces")]
    CpuCount(usize),
    #[error("distributor reports {0} interrupt lines")]
    InterruptCount(usize),
}

/// Higher-level GIC controller for the Zynq70000 SoC.
///
/// 1. Create the controller using [Self::new_with_init]. This configures the fixed
///    sensitivities and sets the priority mask to 0xff.
/// 2. Configure interrupt targets with [Self::set_spi_interrupt_cpu_target] or
///    [Self::set_all_spi_interrupt_targets_cpu0], and the sensitivities of the PL interrupts
///    with [Self::set_pl_interrupt_sensitivity].
/// 3. Enable the required interrupts, for example with [Self::enable_spi_interrupt] or
///    [Self::enable_all_interrupts].
/// 4. Start the GIC with [Self::enable].
/// 5. Unmask the IRQ exception of the core with [Self::enable_interrupts].
pub struct GicConfigurator {
    pub gicc: MmioGicCpuInterface<'static>,
    pub gicd: MmioGicDistributor<'static>,
}

impl GicConfigurator {
    /// Create a new GIC controller instance and call [Self::initialize].
    #[inline]
    pub fn new_with_init(
        gicc: MmioGicCpuInterface<'static>,
        gicd: MmioGicDistributor<'static>,
    ) -> Self {
        let mut gic = GicConfigurator { gicc, gicd };
        gic.initialize();
        gic
    }

    /// Create a new GIC controller instance without performing any initialization routines.
    ///
    /// # Safety
    ///
    /// This circumvents ownership checks. It is mainly intended to be used inside the interrupt
    /// handler.
    #[inline]
    pub unsafe fn steal() -> Self {
        GicConfigurator {
            gicc: unsafe { GicCpuInterface::new_mmio_fixed() },
            gicd: unsafe { GicDistributor::new_mmio_fixed() },
        }
    }

    /// Program the fixed SPI sensitivities and unmask all priorities.
    ///
    /// All interrupts from the programmable logic are configured as high level sensitive.
    #[inline]
    pub fn initialize(&mut self) {
        // Unwrap okay, indices are valid.
        self.gicd.write_icfr(2, ICFR_2_FIXED_VALUE).unwrap();
        self.gicd.write_icfr(3, ICFR_3_FIXED_VALUE).unwrap();
        self.gicd.write_icfr(4, ICFR_4_FIXED_VALUE).unwrap();
        self.gicd.write_icfr(5, ICFR_5_FIXED_VALUE).unwrap();
        self.set_priority_mask(0xff);
    }

    /// Only interrupts with a higher priority (numerically lower) than the mask are forwarded
    /// to the CPU. 0x0 masks all interrupts, 0xff unmasks all of them.
    pub fn set_priority_mask(&mut self, mask: u8) {
        self.gicc
            .write_pmr(PriorityRegister::new_with_raw_value(mask as u32));
    }

    /// Set the sensitivity of one of the 16 programmable logic interrupts.
    #[inline]
    pub fn set_pl_interrupt_sensitivity(
        &mut self,
        pl_int_id: usize,
        sensitivity: SpiSensitivity,
    ) -> Result<(), InvalidPlInterruptId> {
        let (icfr_idx, pos) = match pl_int_id {
            0..=2 => (3, 26 + pl_int_id * 2),
            3..=7 => (4, pl_int_id * 2),
            8..=15 => (5, 8 + pl_int_id * 2),
            _ => return Err(InvalidPlInterruptId(pl_int_id)),
        };
        let mask = 0b11 << pos;
        // Unwrap okay, index is valid.
        self.gicd
            .modify_icfr(icfr_idx, |v| (v & !mask) | ((sensitivity as u32) << pos))
            .unwrap();
        Ok(())
    }

    /// Set the CPU target for a SPI interrupt.
    #[inline]
    pub fn set_spi_interrupt_cpu_target(&mut self, spi_int: SpiInterrupt, target: TargetCpu) {
        let spi_offset_to_0 = spi_int as usize - 32;
        let shift = (spi_offset_to_0 % 4) * 8;
        // Unwrap okay, calculated index is always valid.
        self.gicd
            .modify_iptr_spi(spi_offset_to_0 / 4, |v| {
                (v & !(0xFF << shift)) | ((target as u32) << shift)
            })
            .unwrap();
    }

    /// Target all SPI interrupts to CPU0.
    #[inline]
    pub fn set_all_spi_interrupt_targets_cpu0(&mut self) {
        for i in 0..0x10 {
            // Unwrap okay, index is valid.
            self.gicd
                .write_iptr_spi(i, TARGETS_ALL_CPU_0_IPTR_VAL)
                .unwrap();
        }
    }

    #[inline]
    pub fn enable_sgi_interrupt(&mut self, int_id: usize) -> Result<(), InvalidSgiInterruptId> {
        if int_id >= 16 {
            return Err(InvalidSgiInterruptId(int_id));
        }
        // Unwrap okay, index is valid.
        self.gicd.write_iser(0, 1 << int_id).unwrap();
        Ok(())
    }

    #[inline]
    pub fn enable_all_sgi_interrupts(&mut self) {
        // Unwrap okay, index is valid.
        self.gicd.write_iser(0, ACTIVATE_ALL_SGIS_MASK_ISER).unwrap();
    }

    #[inline]
    pub fn enable_ppi_interrupt(&mut self, ppi_int: PpiInterrupt) {
        // Unwrap okay, index is valid.
        self.gicd.write_iser(0, 1 << (ppi_int as u32)).unwrap();
    }

    #[inline]
    pub fn disable_ppi_interrupt(&mut self, ppi_int: PpiInterrupt) {
        // Unwrap okay, index is valid.
        self.gicd.write_icer(0, 1 << (ppi_int as u32)).unwrap();
    }

    #[inline]
    pub fn enable_all_ppi_interrupts(&mut self) {
        // Unwrap okay, index is valid.
        self.gicd.write_iser(0, ACTIVATE_ALL_PPIS_MASK_ISER).unwrap();
    }

    /// The set-enable registers ignore zero bits, so only the given interrupt is affected.
    #[inline]
    pub fn enable_spi_interrupt(&mut self, spi_int: SpiInterrupt) {
        let (idx, bit) = spi_reg_index_and_bit(spi_int);
        // Unwrap okay, valid index.
        self.gicd.write_iser(idx, 1 << bit).unwrap();
    }

    #[inline]
    pub fn disable_spi_interrupt(&mut self, spi_int: SpiInterrupt) {
        let (idx, bit) = spi_reg_index_and_bit(spi_int);
        // Unwrap okay, valid index.
        self.gicd.write_icer(idx, 1 << bit).unwrap();
    }

    #[inline]
    pub fn clear_pending_spi_interrupt(&mut self, spi_int: SpiInterrupt) {
        let (idx, bit) = spi_reg_index_and_bit(spi_int);
        // Unwrap okay, valid index.
        self.gicd.write_icpr(idx, 1 << bit).unwrap();
    }

    #[inline]
    pub fn enable_all_spi_interrupts(&mut self) {
        // Unwrap okay, valid indices.
        self.gicd.write_iser(1, 0xFFFF_FFFF).unwrap();
        self.gicd.write_iser(2, 0xFFFF_FFFF).unwrap();
    }

    /// Enables all SGI, PPI and SPI interrupts.
    pub fn enable_all_interrupts(&mut self) {
        self.enable_all_sgi_interrupts();
        self.enable_all_ppi_interrupts();
        self.enable_all_spi_interrupts();
    }

    /// Enable secure and non-secure interrupt forwarding of the distributor and the CPU
    /// interface.
    ///
    /// This will not enable the interrupt exception for the Cortex-A core. You also have
    /// to call [Self::enable_interrupts] for interrupts to work.
    pub fn enable(&mut self) {
        self.update_ctrl_regs(
            InterfaceControl::builder()
                .with_sbpr(false)
                .with_fiq_en(false)
                .with_ack_ctrl(false)
                .with_enable_non_secure(true)
                .with_enable_secure(true)
                .build(),
            DistributorControl::builder()
                .with_enable_non_secure(true)
                .with_enable_secure(true)
                .build(),
        );
    }

    /// Unmask the IRQ exception of the Cortex-A core.
    ///
    /// # Safety
    ///
    /// Do not call this in a critical section.
    pub unsafe fn enable_interrupts(&self) {
        unsafe {
            interrupt::enable();
        }
    }

    /// Mask the IRQ exception of the Cortex-A core.
    pub fn disable_interrupts(&self) {
        interrupt::disable();
    }

    pub fn update_ctrl_regs(&mut self, icr: InterfaceControl, dcr: DistributorControl) {
        self.gicc.write_icr(icr);
        self.gicd.write_dcr(dcr);
    }

    /// Verify the identification registers of the distributor and the CPU interface as well as
    /// the reported CPU and interrupt line count.
    pub fn self_test(&self) -> Result<(), GicSelfTestError> {
        check_identification(
            self.gicd.read_iidr().implementer().value(),
            self.gicc.read_iidr().implementer().value(),
            self.gicd.read_ictr(),
        )
    }
}

fn spi_reg_index_and_bit(spi_int: SpiInterrupt) -> (usize, u32) {
    let raw = spi_int as u32;
    ((raw / 32) as usize, raw % 32)
}

fn check_identification(
    dist_implementer: u16,
    cpu_if_implementer: u16,
    ictr: ControllerType,
) -> Result<(), GicSelfTestError> {
    if dist_implementer != ARM_IMPLEMENTER_ID {
        return Err(GicSelfTestError::DistributorImplementer(dist_implementer));
    }
    if cpu_if_implementer != ARM_IMPLEMENTER_ID {
        return Err(GicSelfTestError::CpuInterfaceImplementer(
            cpu_if_implementer,
        ));
    }
    if ictr.num_cpus() != ControllerType::NUM_OF_CPUS {
        return Err(GicSelfTestError::CpuCount(ictr.num_cpus()));
    }
    if ictr.num_interrupts() != ControllerType::NUM_OF_INTERRUPTS {
        return Err(GicSelfTestError::InterruptCount(ictr.num_interrupts()));
    }
    Ok(())
}

/// Helper structure which should only be used inside the interrupt handler once the GIC has
/// been configured with the [GicConfigurator].
pub struct GicInterruptHelper(MmioGicCpuInterface<'static>);

impl GicInterruptHelper {
    /// Create the interrupt helper with the fixed GICC MMIO instance.
    pub const fn new() -> Self {
        GicInterruptHelper(unsafe { GicCpuInterface::new_mmio_fixed() })
    }

    /// Acknowledges an interrupt by reading the IAR register.
    ///
    /// This should be called at the start of an interrupt handler.
    pub fn acknowledge_interrupt(&mut self) -> InterruptInfo {
        let iar = self.0.read_iar();
        InterruptInfo {
            interrupt: Interrupt::from_id(iar.ack_int_id().as_u32()),
            cpu_id: iar.cpu_id().value(),
            raw_reg: iar,
        }
    }

    /// Signals the end of an interrupt by writing the EOIR register of the GICC.
    ///
    /// This should be called at the end of an interrupt handler.
    pub fn end_of_interrupt(&mut self, irq_info: InterruptInfo) {
        self.0.write_eoir(irq_info.raw_reg())
    }

    /// Acknowledge the current interrupt, run the handler registered in the [dispatch] table
    /// and end the interrupt. Returns the interrupt and whether a handler ran.
    pub fn handle_with_dispatch(&mut self) -> (Interrupt, bool) {
        let irq_info = self.acknowledge_interrupt();
        let interrupt = irq_info.interrupt();
        let handled = match interrupt {
            Interrupt::Spurious => return (interrupt, false),
            _ => interrupt.id().is_some_and(dispatch::dispatch),
        };
        self.end_of_interrupt(irq_info);
        (interrupt, handled)
    }
}

impl Default for GicInterruptHelper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_id_decoding() {
        assert_eq!(Interrupt::from_id(3), Interrupt::Sgi(3));
        assert_eq!(
            Interrupt::from_id(29),
            Interrupt::Ppi(PpiInterrupt::CpuPrivateTimer)
        );
        assert_eq!(Interrupt::from_id(52), Interrupt::Spi(SpiInterrupt::Gpio));
        assert_eq!(Interrupt::from_id(20), Interrupt::Invalid(20));
        assert_eq!(Interrupt::from_id(93), Interrupt::Invalid(93));
        assert_eq!(Interrupt::from_id(1023), Interrupt::Spurious);
        assert_eq!(Interrupt::Spi(SpiInterrupt::Ttc00).id(), Some(42));
        assert_eq!(Interrupt::Spurious.id(), None);
    }

    #[test]
    fn ttc_interrupt_ids() {
        assert_eq!(SpiInterrupt::ttc(0, 0), Some(SpiInterrupt::Ttc00));
        assert_eq!(SpiInterrupt::ttc(1, 2), Some(SpiInterrupt::Ttc12));
        assert_eq!(SpiInterrupt::ttc(2, 0), None);
        assert_eq!(SpiInterrupt::ttc(0, 3), None);
    }

    #[test]
    fn spi_register_layout() {
        assert_eq!(spi_reg_index_and_bit(SpiInterrupt::Cpu0), (1, 0));
        assert_eq!(spi_reg_index_and_bit(SpiInterrupt::Gpio), (1, 20));
        assert_eq!(spi_reg_index_and_bit(SpiInterrupt::Pl3), (2, 0));
        assert_eq!(spi_reg_index_and_bit(SpiInterrupt::ScuParity), (2, 28));
    }

    #[test]
    fn identification_check() {
        let ictr = ControllerType::new_with_raw_value(0x0000_FC22);
        assert_eq!(check_identification(0x43B, 0x43B, ictr), Ok(()));
        assert_eq!(
            check_identification(0x123, 0x43B, ictr),
            Err(GicSelfTestError::DistributorImplementer(0x123))
        );
        assert_eq!(
            check_identification(0x43B, 0, ictr),
            Err(GicSelfTestError::CpuInterfaceImplementer(0))
        );
        let single_cpu = ControllerType::new_with_raw_value(0x0000_FC02);
        assert_eq!(
            check_identification(0x43B, 0x43B, single_cpu),
            Err(GicSelfTestError::CpuCount(1))
        );
    }
}
