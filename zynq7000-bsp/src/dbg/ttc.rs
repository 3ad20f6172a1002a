//! TTC register access addressed by `(ttc_id, counter_id)`.
//!
//! Every register of a TTC block is repeated for the three counters with a stride of four
//! bytes. All helpers validate both identifiers before touching the hardware.
use core::fmt;

use arbitrary_int::u4;
use fugit::HertzU32 as Hertz;
use zynq7000::ttc::{NUM_COUNTERS, base_addr, offsets};

use super::{read_reg, write_reg};
use crate::ttc::{CounterOptions, MatchIndex};

/// Counter control value which disables the counter and the waveform output.
pub const CNT_CTRL_RESET_VALUE: u32 = 0x21;

/// Printed prescaler value if prescaling is disabled.
pub const PRESCALER_DISABLED: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TtcDbgError {
    #[error("invalid TTC ID {0}")]
    InvalidTtcId(u32),
    #[error("invalid counter ID {0}")]
    InvalidCounterId(u32),
}

/// Physical address of a counter register.
pub fn register_addr(ttc_id: u32, counter_id: u32, offset: usize) -> Result<usize, TtcDbgError> {
    let base = base_addr(ttc_id as usize).ok_or(TtcDbgError::InvalidTtcId(ttc_id))?;
    if counter_id as usize >= NUM_COUNTERS {
        return Err(TtcDbgError::InvalidCounterId(counter_id));
    }
    Ok(base + offset + offsets::COUNTER_STRIDE * counter_id as usize)
}

fn read(ttc_id: u32, counter_id: u32, offset: usize) -> Result<u32, TtcDbgError> {
    Ok(read_reg(register_addr(ttc_id, counter_id, offset)?))
}

fn write(ttc_id: u32, counter_id: u32, offset: usize, value: u32) -> Result<(), TtcDbgError> {
    write_reg(register_addr(ttc_id, counter_id, offset)?, value);
    Ok(())
}

/// Clock control register, bits 0 to 6.
pub fn clk_ctrl(ttc_id: u32, counter_id: u32) -> Result<u32, TtcDbgError> {
    Ok(read(ttc_id, counter_id, offsets::CLK_CTRL)? & 0x7F)
}

/// Counter control register, bits 0 to 6.
pub fn cnt_ctrl(ttc_id: u32, counter_id: u32) -> Result<u32, TtcDbgError> {
    Ok(read(ttc_id, counter_id, offsets::CNT_CTRL)? & 0x7F)
}

pub fn cnt_value(ttc_id: u32, counter_id: u32) -> Result<u32, TtcDbgError> {
    Ok(read(ttc_id, counter_id, offsets::CNT_VAL)? & 0xFFFF)
}

pub fn interval(ttc_id: u32, counter_id: u32) -> Result<u32, TtcDbgError> {
    Ok(read(ttc_id, counter_id, offsets::INTERVAL)? & 0xFFFF)
}

pub fn ier(ttc_id: u32, counter_id: u32) -> Result<u32, TtcDbgError> {
    Ok(read(ttc_id, counter_id, offsets::IER)? & 0x3F)
}

/// Reading the interrupt status register clears it.
pub fn isr(ttc_id: u32, counter_id: u32) -> Result<u32, TtcDbgError> {
    Ok(read(ttc_id, counter_id, offsets::ISR)? & 0x3F)
}

pub fn match_value(ttc_id: u32, counter_id: u32, index: MatchIndex) -> Result<u32, TtcDbgError> {
    let offset = match index {
        MatchIndex::Match0 => offsets::MATCH_0,
        MatchIndex::Match1 => offsets::MATCH_1,
        MatchIndex::Match2 => offsets::MATCH_2,
    };
    Ok(read(ttc_id, counter_id, offset)? & 0xFFFF)
}

pub fn set_clk_ctrl(ttc_id: u32, counter_id: u32, value: u32) -> Result<(), TtcDbgError> {
    write(ttc_id, counter_id, offsets::CLK_CTRL, value & 0x7F)
}

pub fn set_cnt_ctrl(ttc_id: u32, counter_id: u32, value: u32) -> Result<(), TtcDbgError> {
    write(ttc_id, counter_id, offsets::CNT_CTRL, value & 0x7F)
}

pub fn set_interval(ttc_id: u32, counter_id: u32, value: u16) -> Result<(), TtcDbgError> {
    write(ttc_id, counter_id, offsets::INTERVAL, value as u32)
}

/// Stop the counter and reset its clock configuration. The disable bit has to be set before
/// the clock control register is changed.
pub fn reset(ttc_id: u32, counter_id: u32) -> Result<(), TtcDbgError> {
    set_cnt_ctrl(ttc_id, counter_id, CNT_CTRL_RESET_VALUE)?;
    set_clk_ctrl(ttc_id, counter_id, 0)
}

/// Decoded interrupt enable register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IerStatus(pub u32);

impl IerStatus {
    pub fn lines(&self) -> [(&'static str, bool); 6] {
        let bit = |n: u32| (self.0 >> n) & 1 == 1;
        [
            ("Event overflow:", bit(5)),
            ("Counter overflow:", bit(4)),
            ("Match 3:", bit(3)),
            ("Match 2:", bit(2)),
            ("Match 1:", bit(1)),
            ("Interval:", bit(0)),
        ]
    }
}

fn enabled_str(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

impl fmt::Display for IerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, enabled) in self.lines() {
            writeln!(f, "{:<30}{}", label, enabled_str(enabled))?;
        }
        Ok(())
    }
}

/// Log the decoded interrupt enable register of a counter.
pub fn print_ier_status(ttc_id: u32, counter_id: u32) -> Result<(), TtcDbgError> {
    for (label, enabled) in IerStatus(ier(ttc_id, counter_id)?).lines() {
        log::info!("{:<30}{}", label, enabled_str(enabled));
    }
    Ok(())
}

/// Snapshot of the control and count registers of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSummary {
    pub clk_ctrl: u32,
    pub cnt_ctrl: u32,
    pub count: u32,
    pub interval: u32,
}

impl CounterSummary {
    pub fn read(ttc_id: u32, counter_id: u32) -> Result<Self, TtcDbgError> {
        Ok(Self {
            clk_ctrl: clk_ctrl(ttc_id, counter_id)?,
            cnt_ctrl: cnt_ctrl(ttc_id, counter_id)?,
            count: cnt_value(ttc_id, counter_id)?,
            interval: interval(ttc_id, counter_id)?,
        })
    }

    /// Decoded bit fields of the clock control and counter control registers.
    pub fn fields(&self) -> [(&'static str, u32); 11] {
        let clk = self.clk_ctrl;
        let cnt = self.cnt_ctrl;
        [
            ("External clock edge:", (clk & 0x40) >> 6),
            ("Clock source:", (clk & 0x20) >> 5),
            ("Prescale value:", (clk & 0x1E) >> 1),
            ("Prescale enable:", clk & 0x01),
            ("Waveform polarity:", (cnt & 0x40) >> 6),
            ("Waveform enable (active low):", (cnt & 0x20) >> 5),
            ("Counter reset:", (cnt & 0x10) >> 4),
            ("Match mode:", (cnt & 0x08) >> 3),
            ("Decrement:", (cnt & 0x04) >> 2),
            ("Interval mode:", (cnt & 0x02) >> 1),
            ("Disable counter:", cnt & 0x01),
        ]
    }
}

impl fmt::Display for CounterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.fields() {
            writeln!(f, "{:<30}{}", label, value)?;
        }
        writeln!(f, "{:<30}0x{:08x}", "Current count:", self.count)?;
        writeln!(f, "{:<30}0x{:08x}", "Interval count:", self.interval)
    }
}

/// Log the decoded clock and counter control registers followed by the current and the
/// interval count.
pub fn print_summary(ttc_id: u32, counter_id: u32) -> Result<(), TtcDbgError> {
    let summary = CounterSummary::read(ttc_id, counter_id)?;
    for (label, value) in summary.fields() {
        log::info!("{:<30}{}", label, value);
    }
    log::info!("{:<30}0x{:08x}", "Current count:", summary.count);
    log::info!("{:<30}0x{:08x}", "Interval count:", summary.interval);
    Ok(())
}

pub fn print_input_freq(freq: Hertz) {
    log::info!("{:<20}{}", "Input clock", freq.raw());
}

pub fn print_options(options: CounterOptions) {
    log::info!("{:<20}0x{:08x}", "Options", options.raw_value());
}

/// Prints [PRESCALER_DISABLED] as the prescaler if prescaling is disabled.
pub fn print_interval(interval: u16, prescaler: Option<u4>) {
    log::info!("{:<20}0x{:04x}", "Interval", interval);
    log::info!(
        "{:<20}0x{:02x}",
        "Prescaler",
        prescaler.map_or(PRESCALER_DISABLED, |p| p.value())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn counter_addresses() {
        assert_eq!(register_addr(0, 0, offsets::CLK_CTRL), Ok(0xF800_1000));
        assert_eq!(register_addr(0, 2, offsets::CNT_CTRL), Ok(0xF800_1014));
        assert_eq!(register_addr(1, 1, offsets::INTERVAL), Ok(0xF800_2028));
        assert_eq!(register_addr(1, 2, offsets::EVENT_CNT), Ok(0xF800_2080));
    }

    #[test]
    fn invalid_ids() {
        assert_eq!(
            register_addr(2, 0, offsets::CLK_CTRL),
            Err(TtcDbgError::InvalidTtcId(2))
        );
        assert_eq!(
            register_addr(0, 3, offsets::CLK_CTRL),
            Err(TtcDbgError::InvalidCounterId(3))
        );
        // Invalid IDs are rejected before any register access.
        assert_eq!(clk_ctrl(5, 0), Err(TtcDbgError::InvalidTtcId(5)));
        assert_eq!(set_interval(0, 7, 10), Err(TtcDbgError::InvalidCounterId(7)));
        assert_eq!(reset(3, 0), Err(TtcDbgError::InvalidTtcId(3)));
    }

    #[test]
    fn ier_status_display() {
        let mut out = heapless::String::<256>::new();
        write!(out, "{}", IerStatus(0x11)).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("Event overflow:               disabled")
        );
        assert_eq!(
            lines.next(),
            Some("Counter overflow:             enabled")
        );
        assert_eq!(lines.nth(3), Some("Interval:                     enabled"));
    }

    #[test]
    fn summary_decoding() {
        let summary = CounterSummary {
            clk_ctrl: 0x15,
            cnt_ctrl: 0x23,
            count: 0x1234,
            interval: 0xD903,
        };
        let fields = summary.fields();
        assert_eq!(fields[2], ("Prescale value:", 10));
        assert_eq!(fields[3], ("Prescale enable:", 1));
        assert_eq!(fields[5], ("Waveform enable (active low):", 1));
        assert_eq!(fields[9], ("Interval mode:", 1));
        assert_eq!(fields[10], ("Disable counter:", 1));

        let mut out = heapless::String::<1024>::new();
        write!(out, "{summary}").unwrap();
        assert!(out.contains("Current count:                0x00001234\n"));
        assert!(out.ends_with("Interval count:               0x0000d903\n"));
    }
}
