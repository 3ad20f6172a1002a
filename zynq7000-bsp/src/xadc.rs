//! # PS-XADC interface driver
//!
//! The XADC registers are reached through the dynamic reconfiguration port (DRP). Every DRP
//! command written to the command FIFO shifts one word into the read data FIFO, so register
//! reads are followed by a NOP command which shifts the requested data out.
use core::fmt;

use arbitrary_int::{Number, u4, u5};
use zynq7000::xadc::{
    CommandWord, Edge, InterfaceConfig, Interrupt, MiscControl, MiscStatus, MmioXAdc, TckRate,
    XADC_BASE_ADDR, drp,
};

/// Number of status register polls before a FIFO operation is considered as failed.
const MAX_FIFO_POLLS: u32 = 100_000;

/// Minimum idle gap between commands in TCK cycles.
pub const MIN_IGAP: u8 = 10;
pub const DEFAULT_IGAP: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum XAdcError {
    #[error("timeout waiting for the data FIFO")]
    DataFifoTimeout,
    #[error("DRP register {addr:#04x} read back {received:#06x}, expected {expected:#06x}")]
    ReadBack {
        addr: u16,
        expected: u16,
        received: u16,
    },
}

/// Convert a 16 bit left-aligned temperature sensor code to degrees Celsius.
pub fn raw_to_temperature(raw: u16) -> f32 {
    (raw as f32 * 503.975) / 65536.0 - 273.15
}

/// Convert a 16 bit left-aligned supply sensor code to Volts.
pub fn raw_to_voltage(raw: u16) -> f32 {
    (raw as f32 * 3.0) / 65536.0
}

pub struct XAdc {
    regs: MmioXAdc<'static>,
}

impl XAdc {
    /// Create the driver and initialize the PS-XADC interface with [Self::init].
    pub fn new(regs: MmioXAdc<'static>) -> Self {
        let mut xadc = Self { regs };
        xadc.init();
        xadc
    }

    #[inline]
    pub fn regs(&mut self) -> &mut MmioXAdc<'static> {
        &mut self.regs
    }

    /// Reset the PS-XADC channel and enable the interface.
    ///
    /// The FIFO thresholds are set to their maximum, data is written on the negative and read
    /// on the positive edge, TCK runs at a quarter of the PCAP clock and the idle gap is
    /// [DEFAULT_IGAP] cycles.
    pub fn init(&mut self) {
        self.reset();
        self.regs.write_config(
            InterfaceConfig::builder()
                .with_enable(true)
                .with_cmd_fifo_threshold(u4::new(0xF))
                .with_data_fifo_threshold(u4::new(0xF))
                .with_write_edge(Edge::Negative)
                .with_read_edge(Edge::Positive)
                .with_tck_rate(TckRate::Div4)
                .with_igap(u5::new(DEFAULT_IGAP))
                .build(),
        );
    }

    /// Reset the communication channel between the PS and the XADC. This also flushes both
    /// FIFOs.
    pub fn reset(&mut self) {
        self.regs
            .write_misc_control(MiscControl::builder().with_reset(true).build());
        self.regs
            .write_misc_control(MiscControl::builder().with_reset(false).build());
    }

    #[inline]
    pub fn write_command(&mut self, cmd: CommandWord) {
        self.regs.write_command_fifo(cmd);
    }

    /// Pop one word from the read data FIFO.
    #[inline]
    pub fn read_data(&mut self) -> u32 {
        self.regs.read_data_fifo()
    }

    fn wait_for_data(&mut self, level: u8) -> Result<(), XAdcError> {
        for _ in 0..MAX_FIFO_POLLS {
            if self.regs.read_misc_status().data_fifo_level().value() >= level {
                return Ok(());
            }
        }
        Err(XAdcError::DataFifoTimeout)
    }

    /// Read a DRP register.
    pub fn read_register(&mut self, addr: u16) -> Result<u16, XAdcError> {
        self.write_command(CommandWord::read(addr));
        self.write_command(CommandWord::NOP);
        self.wait_for_data(2)?;
        // The first word is shifted out by the read command itself and is discarded.
        self.read_data();
        Ok((self.read_data() & 0xFFFF) as u16)
    }

    /// Write a DRP register.
    pub fn write_register(&mut self, addr: u16, value: u16) -> Result<(), XAdcError> {
        self.write_command(CommandWord::write(addr, value));
        self.wait_for_data(1)?;
        self.read_data();
        Ok(())
    }

    #[inline]
    pub fn interface_config(&mut self) -> InterfaceConfig {
        self.regs.read_config()
    }

    #[inline]
    pub fn interrupt_status(&mut self) -> Interrupt {
        self.regs.read_interrupt_status()
    }

    #[inline]
    pub fn interrupt_mask(&mut self) -> Interrupt {
        self.regs.read_interrupt_mask()
    }

    #[inline]
    pub fn misc_status(&self) -> MiscStatus {
        self.regs.read_misc_status()
    }

    #[inline]
    pub fn misc_control(&mut self) -> MiscControl {
        self.regs.read_misc_control()
    }

    /// Read all on-die sensors.
    pub fn sensor_readings(&mut self) -> Result<SensorReadings, XAdcError> {
        Ok(SensorReadings {
            temperature: self.read_register(drp::TEMPERATURE)?,
            vccint: self.read_register(drp::VCCINT)?,
            vccaux: self.read_register(drp::VCCAUX)?,
            vccbram: self.read_register(drp::VCCBRAM)?,
            vccpint: self.read_register(drp::VCCPINT)?,
            vccpaux: self.read_register(drp::VCCPAUX)?,
            vccddr: self.read_register(drp::VCCO_DDR)?,
        })
    }

    /// Resets the interface and checks that the XADC answers by writing and reading back the
    /// upper temperature alarm threshold. The previous threshold is restored.
    pub fn self_test(&mut self) -> Result<(), XAdcError> {
        const TEST_VALUE: u16 = 0xA5A0;
        self.init();
        let saved = self.read_register(drp::TEMPERATURE_UPPER_ALARM)?;
        self.write_register(drp::TEMPERATURE_UPPER_ALARM, TEST_VALUE)?;
        let received = self.read_register(drp::TEMPERATURE_UPPER_ALARM)?;
        self.write_register(drp::TEMPERATURE_UPPER_ALARM, saved)?;
        if received != TEST_VALUE {
            return Err(XAdcError::ReadBack {
                addr: drp::TEMPERATURE_UPPER_ALARM,
                expected: TEST_VALUE,
                received,
            });
        }
        Ok(())
    }
}

/// Raw codes of the on-die sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReadings {
    pub temperature: u16,
    pub vccint: u16,
    pub vccaux: u16,
    pub vccbram: u16,
    pub vccpint: u16,
    pub vccpaux: u16,
    pub vccddr: u16,
}

impl fmt::Display for SensorReadings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<20}{:>10.2} C",
            "Temperature",
            raw_to_temperature(self.temperature)
        )?;
        for (label, raw) in [
            ("VCCINT", self.vccint),
            ("VCCAUX", self.vccaux),
            ("VCCBRAM", self.vccbram),
            ("VCCPINT", self.vccpint),
            ("VCCPAUX", self.vccpaux),
            ("VCCDDR", self.vccddr),
        ] {
            writeln!(f, "{:<20}{:>10.3} V", label, raw_to_voltage(raw))?;
        }
        Ok(())
    }
}

fn summary_header(f: &mut fmt::Formatter<'_>, title: &str, offset: usize) -> fmt::Result {
    writeln!(f, "{} ({:#010X})", title, XADC_BASE_ADDR + offset)?;
    writeln!(f, "-----------------------")
}

fn summary_line(f: &mut fmt::Formatter<'_>, label: &str, value: u32) -> fmt::Result {
    writeln!(f, "{:<20} {:>10x}", label, value)
}

/// Decoded `XADCIF_CFG` register.
pub struct InterfaceConfigSummary(pub InterfaceConfig);

impl fmt::Display for InterfaceConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cfg = self.0;
        summary_header(f, "XADCIF_CFG", 0x00)?;
        summary_line(f, "ENABLE", cfg.enable() as u32)?;
        summary_line(f, "CFIFOTH (4b)", cfg.cmd_fifo_threshold().as_u32())?;
        summary_line(f, "DFIFOTH (4b)", cfg.data_fifo_threshold().as_u32())?;
        summary_line(f, "WEDGE", cfg.write_edge() as u32)?;
        summary_line(f, "REDGE", cfg.read_edge() as u32)?;
        summary_line(f, "TCKRATE (2b)", cfg.tck_rate() as u32)?;
        summary_line(f, "IGAP (5b)", cfg.igap().as_u32())
    }
}

/// Decoded `XADCIF_INT_STS` or `XADCIF_INT_MASK` register.
pub struct InterruptSummary {
    pub reg: Interrupt,
    pub is_mask: bool,
}

impl fmt::Display for InterruptSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mask {
            summary_header(f, "XADCIF_INT_MASK", 0x08)?;
        } else {
            summary_header(f, "XADCIF_INT_STS", 0x04)?;
        }
        summary_line(f, "CFIFO_LTH", self.reg.cmd_fifo_lth() as u32)?;
        summary_line(f, "DFIFO_GTH", self.reg.data_fifo_gth() as u32)?;
        summary_line(f, "OT", self.reg.over_temperature() as u32)?;
        summary_line(f, "ALM (7b)", self.reg.alarm().as_u32())
    }
}

/// Decoded `XADCIF_MSTS` register.
pub struct MiscStatusSummary(pub MiscStatus);

impl fmt::Display for MiscStatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msts = self.0;
        summary_header(f, "XADCIF_MSTS", 0x0C)?;
        summary_line(f, "CFIFO_LVL (4b)", msts.cmd_fifo_level().as_u32())?;
        summary_line(f, "DFIFO_LVL (4b)", msts.data_fifo_level().as_u32())?;
        summary_line(f, "CFIFOF", msts.cmd_fifo_full() as u32)?;
        summary_line(f, "CFIFOE", msts.cmd_fifo_empty() as u32)?;
        summary_line(f, "DFIFOF", msts.data_fifo_full() as u32)?;
        summary_line(f, "DFIFOE", msts.data_fifo_empty() as u32)?;
        summary_line(f, "OT", msts.over_temperature() as u32)?;
        summary_line(f, "ALM (7b)", msts.alarm().as_u32())
    }
}

/// Fill levels of the command and read data FIFOs. The FIFO ports themselves are not read
/// because reading the data FIFO pops a word.
pub struct FifoSummary(pub MiscStatus);

impl fmt::Display for FifoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        summary_header(f, "XADCIF_CMDFIFO", 0x10)?;
        summary_line(f, "Level", self.0.cmd_fifo_level().as_u32())?;
        summary_header(f, "XADCIF_RDFIFO", 0x14)?;
        summary_line(f, "Level", self.0.data_fifo_level().as_u32())
    }
}

/// Decoded `XADCIF_MCTL` register.
pub struct MiscControlSummary(pub MiscControl);

impl fmt::Display for MiscControlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        summary_header(f, "XADCIF_MCTL", 0x18)?;
        summary_line(f, "RESET", self.0.reset() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::fmt::Write;

    #[test]
    fn temperature_conversion() {
        assert_abs_diff_eq!(raw_to_temperature(0), -273.15, epsilon = 0.001);
        assert_abs_diff_eq!(raw_to_temperature(0x9E00), 37.897, epsilon = 0.01);
        assert_abs_diff_eq!(raw_to_temperature(0xFFFF), 230.817, epsilon = 0.01);
    }

    #[test]
    fn voltage_conversion() {
        assert_abs_diff_eq!(raw_to_voltage(0), 0.0);
        // 1.0 V nominal VCCINT.
        assert_abs_diff_eq!(raw_to_voltage(0x5555), 1.0, epsilon = 0.001);
        assert_abs_diff_eq!(raw_to_voltage(0x8000), 1.5, epsilon = 0.0001);
    }

    #[test]
    fn interface_config_summary() {
        let cfg = InterfaceConfig::builder()
            .with_enable(true)
            .with_cmd_fifo_threshold(u4::new(0xF))
            .with_data_fifo_threshold(u4::new(0x3))
            .with_write_edge(Edge::Negative)
            .with_read_edge(Edge::Positive)
            .with_tck_rate(TckRate::Div4)
            .with_igap(u5::new(20))
            .build();
        let mut out = heapless::String::<512>::new();
        write!(out, "{}", InterfaceConfigSummary(cfg)).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("XADCIF_CFG (0xF8007100)"));
        assert_eq!(lines.next(), Some("-----------------------"));
        assert_eq!(lines.next(), Some("ENABLE                        1"));
        assert_eq!(lines.next(), Some("CFIFOTH (4b)                  f"));
        assert_eq!(lines.next(), Some("DFIFOTH (4b)                  3"));
        assert_eq!(lines.next(), Some("WEDGE                         0"));
        assert_eq!(lines.next(), Some("REDGE                         1"));
        assert_eq!(lines.next(), Some("TCKRATE (2b)                  1"));
        assert_eq!(lines.next(), Some("IGAP (5b)                    14"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn sensor_readings_display() {
        let readings = SensorReadings {
            temperature: 0x9E00,
            vccint: 0x5555,
            vccaux: 0xCCCC,
            vccbram: 0x5555,
            vccpint: 0x5555,
            vccpaux: 0xCCCC,
            vccddr: 0x8000,
        };
        let mut out = heapless::String::<512>::new();
        write!(out, "{readings}").unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Temperature              37.90 C"));
        assert_eq!(lines.next(), Some("VCCINT                   1.000 V"));
        assert_eq!(lines.next(), Some("VCCAUX                   2.400 V"));
        assert_eq!(lines.nth(3), Some("VCCDDR                   1.500 V"));
    }
}
