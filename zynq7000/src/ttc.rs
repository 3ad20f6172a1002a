//! Triple timer counter (TTC) register module.
//!
//! Each of the two TTC blocks contains three independent 16 bit counters. Every register is
//! repeated three times with a stride of 4 bytes, one word per counter.
use arbitrary_int::u4;

pub const TTC_0_BASE_ADDR: usize = 0xF800_1000;
pub const TTC_1_BASE_ADDR: usize = 0xF800_2000;

pub const NUM_TTCS: usize = 2;
pub const NUM_COUNTERS: usize = 3;

/// Byte offsets of the counter 0 registers. Counter `n` is at `offset + 4 * n`.
pub mod offsets {
    pub const CLK_CTRL: usize = 0x00;
    pub const CNT_CTRL: usize = 0x0C;
    pub const CNT_VAL: usize = 0x18;
    pub const INTERVAL: usize = 0x24;
    pub const MATCH_0: usize = 0x30;
    pub const MATCH_1: usize = 0x3C;
    pub const MATCH_2: usize = 0x48;
    pub const ISR: usize = 0x54;
    pub const IER: usize = 0x60;
    pub const EVENT_CTRL: usize = 0x6C;
    pub const EVENT_CNT: usize = 0x78;
    pub const COUNTER_STRIDE: usize = 0x4;
}

#[derive(Debug, Default, PartialEq, Eq)]
#[bitbybit::bitenum(u1, exhaustive = true)]
pub enum ClockSource {
    /// PS internal bus clock (CPU 1x).
    #[default]
    Pclk = 0b0,
    External = 0b1,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct ClockControl {
    /// Count on the negative edge of the external clock. Only used with the external source.
    #[bit(6, rw)]
    ext_clk_edge: bool,
    #[bit(5, rw)]
    clk_src: ClockSource,
    /// The clock is divided by `2^(prescaler + 1)`.
    #[bits(1..=4, rw)]
    prescaler: u4,
    #[bit(0, rw)]
    prescale_enable: bool,
}

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Overflow = 0b0,
    Interval = 0b1,
}

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, Default, PartialEq, Eq)]
pub enum WavePolarity {
    /// Output goes from high to low on a match 0 event and returns high on overflow or interval.
    #[default]
    HighToLowOnMatch1 = 0b0,
    /// Output goes from low to high on a match 0 event and returns low on overflow or interval.
    LowToHighOnMatch1 = 0b1,
}

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum WaveEnable {
    Enable = 0b0,
    Disable = 0b1,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct CounterControl {
    #[bit(6, rw)]
    wave_polarity: WavePolarity,
    /// Output waveform enable, active low. Reset value 1.
    #[bit(5, rw)]
    wave_enable_n: WaveEnable,
    /// Resets the counter and restarts counting. Cleared automatically.
    #[bit(4, rw)]
    reset: bool,
    /// Generate match interrupts when the count matches one of the match registers.
    #[bit(3, rw)]
    match_enable: bool,
    #[bit(2, rw)]
    decrementing: bool,
    #[bit(1, rw)]
    mode: Mode,
    #[bit(0, rw)]
    disable: bool,
}

impl CounterControl {
    /// Value written to stop a counter and return it to a known state.
    pub const STOPPED: Self = Self::new_with_raw_value(0x21);
}

#[bitbybit::bitfield(u32, debug)]
pub struct Counter {
    #[bits(0..=15, r)]
    count: u16,
}

#[bitbybit::bitfield(u32, debug)]
pub struct RwValue {
    #[bits(0..=15, rw)]
    value: u16,
}

/// Reading the status register clears all bits.
#[bitbybit::bitfield(u32, debug)]
pub struct InterruptStatus {
    /// Event timer overflow.
    #[bit(5, r)]
    event: bool,
    #[bit(4, r)]
    counter_overflow: bool,
    #[bit(3, r)]
    match_2: bool,
    #[bit(2, r)]
    match_1: bool,
    #[bit(1, r)]
    match_0: bool,
    #[bit(0, r)]
    interval: bool,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
#[derive(PartialEq, Eq)]
pub struct InterruptControl {
    /// Event timer overflow.
    #[bit(5, rw)]
    event: bool,
    #[bit(4, rw)]
    counter_overflow: bool,
    #[bit(3, rw)]
    match_2: bool,
    #[bit(2, rw)]
    match_1: bool,
    #[bit(1, rw)]
    match_0: bool,
    #[bit(0, rw)]
    interval: bool,
}

impl InterruptControl {
    pub const NONE: Self = Self::new_with_raw_value(0x00);
    pub const INTERVAL: Self = Self::new_with_raw_value(0x01);
    pub const MATCH_0: Self = Self::new_with_raw_value(0x02);
    pub const COUNTER_OVERFLOW: Self = Self::new_with_raw_value(0x10);
    pub const ALL: Self = Self::new_with_raw_value(0x3F);
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct EventControl {
    /// Keep counting on event timer overflow instead of disabling the event timer.
    #[bit(2, rw)]
    continuous_mode: bool,
    /// Count PCLK cycles during the low level of the external clock instead of the high level.
    #[bit(1, rw)]
    count_low_level_of_ext_clk: bool,
    #[bit(0, rw)]
    enable: bool,
}

#[bitbybit::bitfield(u32, debug)]
pub struct EventCount {
    #[bits(0..=15, r)]
    count: u16,
}

/// Triple timer counter register block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Ttc {
    #[mmio(PureRead, Write, Modify)]
    clk_ctrl: [ClockControl; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    cnt_ctrl: [CounterControl; NUM_COUNTERS],
    #[mmio(PureRead)]
    current_counter: [Counter; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    interval_value: [RwValue; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    match_value_0: [RwValue; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    match_value_1: [RwValue; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    match_value_2: [RwValue; NUM_COUNTERS],
    /// Reading clears the status bits.
    #[mmio(Read)]
    isr: [InterruptStatus; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    ier: [InterruptControl; NUM_COUNTERS],
    #[mmio(PureRead, Write, Modify)]
    event_ctrl: [EventControl; NUM_COUNTERS],
    #[mmio(PureRead)]
    event_count: [EventCount; NUM_COUNTERS],
}

static_assertions::const_assert_eq!(core::mem::size_of::<Ttc>(), 0x84);

/// Base address of the given TTC block.
pub const fn base_addr(ttc: usize) -> Option<usize> {
    match ttc {
        0 => Some(TTC_0_BASE_ADDR),
        1 => Some(TTC_1_BASE_ADDR),
        _ => None,
    }
}

impl Ttc {
    /// Create a new TTC MMIO instance for TTC0 at address [TTC_0_BASE_ADDR].
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    pub const unsafe fn new_mmio_fixed_0() -> MmioTtc<'static> {
        unsafe { Self::new_mmio_at(TTC_0_BASE_ADDR) }
    }

    /// Create a new TTC MMIO instance for TTC1 at address [TTC_1_BASE_ADDR].
    ///
    /// # Safety
    ///
    /// See [Self::new_mmio_fixed_0].
    pub const unsafe fn new_mmio_fixed_1() -> MmioTtc<'static> {
        unsafe { Self::new_mmio_at(TTC_1_BASE_ADDR) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_offsets_match_block_layout() {
        assert_eq!(core::mem::offset_of!(Ttc, clk_ctrl), offsets::CLK_CTRL);
        assert_eq!(core::mem::offset_of!(Ttc, cnt_ctrl), offsets::CNT_CTRL);
        assert_eq!(core::mem::offset_of!(Ttc, current_counter), offsets::CNT_VAL);
        assert_eq!(core::mem::offset_of!(Ttc, interval_value), offsets::INTERVAL);
        assert_eq!(core::mem::offset_of!(Ttc, match_value_0), offsets::MATCH_0);
        assert_eq!(core::mem::offset_of!(Ttc, match_value_1), offsets::MATCH_1);
        assert_eq!(core::mem::offset_of!(Ttc, match_value_2), offsets::MATCH_2);
        assert_eq!(core::mem::offset_of!(Ttc, isr), offsets::ISR);
        assert_eq!(core::mem::offset_of!(Ttc, ier), offsets::IER);
        assert_eq!(core::mem::offset_of!(Ttc, event_ctrl), offsets::EVENT_CTRL);
        assert_eq!(core::mem::offset_of!(Ttc, event_count), offsets::EVENT_CNT);
    }

    #[test]
    fn stopped_counter_control() {
        let ctrl = CounterControl::STOPPED;
        assert!(ctrl.disable());
        assert_eq!(ctrl.wave_enable_n(), WaveEnable::Disable);
        assert_eq!(ctrl.mode(), Mode::Overflow);
        assert!(!ctrl.reset());
    }

    #[test]
    fn interrupt_control_masks() {
        let interval = InterruptControl::builder()
            .with_event(false)
            .with_counter_overflow(false)
            .with_match_2(false)
            .with_match_1(false)
            .with_match_0(false)
            .with_interval(true)
            .build();
        assert_eq!(InterruptControl::INTERVAL, interval);
        assert!(InterruptControl::MATCH_0.match_0());
        assert!(InterruptControl::COUNTER_OVERFLOW.counter_overflow());
        assert!(!InterruptControl::COUNTER_OVERFLOW.interval());
        assert_eq!(InterruptControl::NONE.raw_value(), 0);
        assert_eq!(InterruptControl::ALL.raw_value(), 0x3F);
    }

    #[test]
    fn clock_control_prescaler_field() {
        let clk = ClockControl::builder()
            .with_ext_clk_edge(false)
            .with_clk_src(ClockSource::Pclk)
            .with_prescaler(u4::new(10))
            .with_prescale_enable(true)
            .build();
        assert_eq!(clk.raw_value(), 0x15);
        assert_eq!((clk.raw_value() & 0x1E) >> 1, 10);
    }
}
