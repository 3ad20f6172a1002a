//! # PS-XADC interface registers
//!
//! The processing system talks to the XADC hard block through a command FIFO and a read data
//! FIFO. Each 32 bit command addresses one register of the dynamic reconfiguration port (DRP).
//! Every command shifted into the command FIFO shifts one word into the data FIFO.
use arbitrary_int::{u4, u5, u7, u10};

pub const XADC_BASE_ADDR: usize = 0xF800_7100;

/// Registers of the XADC DRP address space.
pub mod drp {
    pub const TEMPERATURE: u16 = 0x00;
    pub const VCCINT: u16 = 0x01;
    pub const VCCAUX: u16 = 0x02;
    pub const VP_VN: u16 = 0x03;
    pub const VREFP: u16 = 0x04;
    pub const VREFN: u16 = 0x05;
    pub const VCCBRAM: u16 = 0x06;
    pub const VCCPINT: u16 = 0x0D;
    pub const VCCPAUX: u16 = 0x0E;
    pub const VCCO_DDR: u16 = 0x0F;
    pub const FLAG: u16 = 0x3F;
    pub const TEMPERATURE_UPPER_ALARM: u16 = 0x50;
    pub const CONFIG_0: u16 = 0x40;
    pub const CONFIG_1: u16 = 0x41;
    pub const CONFIG_2: u16 = 0x42;
}

#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum TckRate {
    Div2 = 0b00,
    Div4 = 0b01,
    Div8 = 0b10,
    Div16 = 0b11,
}

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum Edge {
    Negative = 0b0,
    Positive = 0b1,
}

/// XADCIF_CFG register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct InterfaceConfig {
    /// Enables the PS-XADC interface. The PL JTAG/DRP interface is used otherwise.
    #[bit(31, rw)]
    enable: bool,
    /// Command FIFO level which triggers the command FIFO threshold interrupt.
    #[bits(20..=23, rw)]
    cmd_fifo_threshold: u4,
    /// Data FIFO level which triggers the data FIFO threshold interrupt.
    #[bits(16..=19, rw)]
    data_fifo_threshold: u4,
    /// Edge used to write to the XADC.
    #[bit(13, rw)]
    write_edge: Edge,
    /// Edge used to sample data from the XADC.
    #[bit(12, rw)]
    read_edge: Edge,
    #[bits(8..=9, rw)]
    tck_rate: TckRate,
    /// Idle gap between successive commands in TCK cycles. Must be at least 10.
    #[bits(0..=4, rw)]
    igap: u5,
}

/// Layout of the interrupt status and interrupt mask registers.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Interrupt {
    #[bit(9, rw)]
    cmd_fifo_lth: bool,
    #[bit(8, rw)]
    data_fifo_gth: bool,
    #[bit(7, rw)]
    over_temperature: bool,
    /// Alarm outputs of the XADC.
    #[bits(0..=6, rw)]
    alarm: u7,
}

/// MSTS register.
#[bitbybit::bitfield(u32, debug)]
pub struct MiscStatus {
    #[bits(16..=19, r)]
    cmd_fifo_level: u4,
    #[bits(12..=15, r)]
    data_fifo_level: u4,
    #[bit(11, r)]
    cmd_fifo_full: bool,
    #[bit(10, r)]
    cmd_fifo_empty: bool,
    #[bit(9, r)]
    data_fifo_full: bool,
    #[bit(8, r)]
    data_fifo_empty: bool,
    #[bit(7, r)]
    over_temperature: bool,
    #[bits(0..=6, r)]
    alarm: u7,
}

/// MCTL register.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct MiscControl {
    /// Resets the communication channel between PS and XADC. Has to be cleared again.
    #[bit(4, rw)]
    reset: bool,
}

#[bitbybit::bitenum(u4, exhaustive = false)]
#[derive(Debug, PartialEq, Eq)]
pub enum DrpCommand {
    Nop = 0b0000,
    Read = 0b0001,
    Write = 0b0010,
}

/// Command FIFO word.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct CommandWord {
    #[bits(26..=29, rw)]
    command: Option<DrpCommand>,
    #[bits(16..=25, rw)]
    address: u10,
    #[bits(0..=15, rw)]
    data: u16,
}

impl CommandWord {
    pub const NOP: Self = Self::new_with_raw_value(0);

    pub fn read(addr: u16) -> Self {
        Self::builder()
            .with_command(DrpCommand::Read)
            .with_address(u10::new(addr & 0x3FF))
            .with_data(0)
            .build()
    }

    pub fn write(addr: u16, data: u16) -> Self {
        Self::builder()
            .with_command(DrpCommand::Write)
            .with_address(u10::new(addr & 0x3FF))
            .with_data(data)
            .build()
    }
}

/// PS-XADC interface register access.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct XAdc {
    config: InterfaceConfig,
    /// Write one to clear.
    interrupt_status: Interrupt,
    /// A set bit masks the interrupt.
    interrupt_mask: Interrupt,
    #[mmio(PureRead)]
    misc_status: MiscStatus,
    #[mmio(Write)]
    command_fifo: CommandWord,
    #[mmio(Read)]
    data_fifo: u32,
    misc_control: MiscControl,
}

static_assertions::const_assert_eq!(core::mem::size_of::<XAdc>(), 0x1C);

impl XAdc {
    /// Create a new XADC interface MMIO instance at address [XADC_BASE_ADDR].
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    pub const unsafe fn new_mmio_fixed() -> MmioXAdc<'static> {
        unsafe { XAdc::new_mmio_at(XADC_BASE_ADDR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_word_encoding() {
        assert_eq!(CommandWord::read(drp::VCCINT).raw_value(), 0x0401_0000);
        assert_eq!(
            CommandWord::write(drp::CONFIG_1, 0x2000).raw_value(),
            0x0841_2000
        );
        assert_eq!(CommandWord::NOP.raw_value(), 0);
    }

    #[test]
    fn interface_config_fields() {
        let cfg = InterfaceConfig::new_with_raw_value(0x8000_1114);
        assert!(cfg.enable());
        assert_eq!(cfg.cmd_fifo_threshold().value(), 0);
        assert_eq!(cfg.write_edge(), Edge::Negative);
        assert_eq!(cfg.read_edge(), Edge::Positive);
        assert_eq!(cfg.tck_rate(), TckRate::Div4);
        assert_eq!(cfg.igap().value(), 0x14);
    }

    #[test]
    fn misc_status_fields() {
        let msts = MiscStatus::new_with_raw_value(0x0001_0500);
        assert_eq!(msts.cmd_fifo_level().value(), 1);
        assert_eq!(msts.data_fifo_level().value(), 0);
        assert!(msts.cmd_fifo_empty());
        assert!(msts.data_fifo_empty());
        assert!(!msts.cmd_fifo_full());
    }
}
