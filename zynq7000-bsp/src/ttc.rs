//! # Triple-timer counter (TTC) high-level driver
//!
//! Each TTC consists of three independent 16 bit counters. This module exposes them as
//! [TtcChannel]s and provides an [IntervalTimer] and a [Pwm] abstraction on top of a channel.
use core::convert::Infallible;

use arbitrary_int::{Number, u3, u4};
use fugit::HertzU32 as Hertz;
use zynq7000::ttc::{
    ClockControl, ClockSource, CounterControl, InterruptControl, InterruptStatus, MmioTtc, Mode,
    RwValue, TTC_0_BASE_ADDR, TTC_1_BASE_ADDR, WaveEnable, WavePolarity,
};

#[cfg(not(feature = "7z010-7z007s-clg225"))]
use crate::gpio::mio::{Mio16, Mio18, Mio40, Mio42};
use crate::{
    VerifyError,
    clocks::ArmClocks,
    gpio::{
        IoPeriphPin,
        mio::{Mio28, Mio30, MioPinMarker, MuxConfig, Pin},
    },
};

/// Each TTC consists of three independent timers/counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TtcId {
    Ttc0 = 0,
    Ttc1 = 1,
}

impl TtcId {
    pub fn from_regs(regs: &MmioTtc<'static>) -> Option<Self> {
        match unsafe { regs.ptr() } as usize {
            TTC_0_BASE_ADDR => Some(TtcId::Ttc0),
            TTC_1_BASE_ADDR => Some(TtcId::Ttc1),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelId {
    Ch0 = 0,
    Ch1 = 1,
    Ch2 = 2,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchIndex {
    Match0,
    Match1,
    Match2,
}

pub const TTC_MUX_CONF: MuxConfig = MuxConfig::new_with_l3(u3::new(0b110));

/// MIO pin which can output the waveform of the first counter of a TTC.
pub trait WaveOutPin: MioPinMarker {
    const ID: TtcId;
}

impl WaveOutPin for Pin<Mio30> {
    const ID: TtcId = TtcId::Ttc0;
}
#[cfg(not(feature = "7z010-7z007s-clg225"))]
impl WaveOutPin for Pin<Mio18> {
    const ID: TtcId = TtcId::Ttc0;
}
#[cfg(not(feature = "7z010-7z007s-clg225"))]
impl WaveOutPin for Pin<Mio42> {
    const ID: TtcId = TtcId::Ttc0;
}

impl WaveOutPin for Pin<Mio28> {
    const ID: TtcId = TtcId::Ttc1;
}
#[cfg(not(feature = "7z010-7z007s-clg225"))]
impl WaveOutPin for Pin<Mio16> {
    const ID: TtcId = TtcId::Ttc1;
}
#[cfg(not(feature = "7z010-7z007s-clg225"))]
impl WaveOutPin for Pin<Mio40> {
    const ID: TtcId = TtcId::Ttc1;
}

#[derive(Debug, thiserror::Error)]
#[error("frequency is zero")]
pub struct FrequencyIsZeroError;

#[derive(Debug, thiserror::Error)]
#[error("wave output pin belongs to {pin:?}, the channel to {channel:?}")]
pub struct TtcMismatchError {
    pub pin: TtcId,
    pub channel: TtcId,
}

#[derive(Debug, thiserror::Error)]
pub enum TtcConstructionError {
    #[error("frequency is zero")]
    FrequencyIsZero(#[from] FrequencyIsZeroError),
    #[error("TTC mismatch: {0}")]
    TtcMismatch(#[from] TtcMismatchError),
    #[error("register verification: {0}")]
    Verify(#[from] VerifyError),
}

/// Counter control settings except the disable and reset bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterOptions {
    pub mode: Mode,
    pub decrementing: bool,
    pub match_enable: bool,
    pub wave_enable: bool,
    pub wave_polarity: WavePolarity,
}

impl CounterOptions {
    /// Interval mode, counting up, no match events and no waveform output.
    pub const INTERVAL: Self = Self {
        mode: Mode::Interval,
        decrementing: false,
        match_enable: false,
        wave_enable: false,
        wave_polarity: WavePolarity::HighToLowOnMatch1,
    };

    /// Counter control register value with the disable and reset bits cleared.
    pub fn raw_value(&self) -> u32 {
        self.to_reg(false, false).raw_value()
    }

    fn from_reg(reg: CounterControl) -> Self {
        Self {
            mode: reg.mode(),
            decrementing: reg.decrementing(),
            match_enable: reg.match_enable(),
            wave_enable: reg.wave_enable_n() == WaveEnable::Enable,
            wave_polarity: reg.wave_polarity(),
        }
    }

    fn to_reg(self, disable: bool, reset: bool) -> CounterControl {
        CounterControl::builder()
            .with_wave_polarity(self.wave_polarity)
            .with_wave_enable_n(if self.wave_enable {
                WaveEnable::Enable
            } else {
                WaveEnable::Disable
            })
            .with_reset(reset)
            .with_match_enable(self.match_enable)
            .with_decrementing(self.decrementing)
            .with_mode(self.mode)
            .with_disable(disable)
            .build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockOptions {
    pub source: ClockSource,
    /// Count on the negative edge of the external clock.
    pub ext_negative_edge: bool,
    /// The input clock is divided by `2^(prescaler + 1)`. [None] disables prescaling.
    pub prescaler: Option<u4>,
}

impl ClockOptions {
    pub const fn new_pclk(prescaler: Option<u4>) -> Self {
        Self {
            source: ClockSource::Pclk,
            ext_negative_edge: false,
            prescaler,
        }
    }

    fn to_reg(self) -> ClockControl {
        ClockControl::builder()
            .with_ext_clk_edge(self.ext_negative_edge)
            .with_clk_src(self.source)
            .with_prescaler(self.prescaler.unwrap_or(u4::new(0)))
            .with_prescale_enable(self.prescaler.is_some())
            .build()
    }
}

/// Calculate the interval value and the prescaler register value for a given counter
/// frequency.
///
/// The counter runs with `ref_clk / 2^(prescaler + 1)`. The smallest prescaler which lets the
/// interval fit into 16 bits is selected. [None] is returned for the prescaler if the undivided
/// reference clock can be used. The interval saturates if even the largest prescaler is not
/// sufficient.
pub fn calculate_interval_and_prescaler(
    ref_clk: Hertz,
    freq: Hertz,
) -> Result<(u16, Option<u4>), FrequencyIsZeroError> {
    if freq.raw() == 0 {
        return Err(FrequencyIsZeroError);
    }
    let ref_clk = ref_clk.raw() as u64;
    let freq = freq.raw() as u64;
    let ticks = ref_clk / freq;
    if ticks <= u16::MAX as u64 {
        return Ok((ticks as u16, None));
    }
    for prescaler in 0..=u4::MAX.value() {
        let ticks = ref_clk / (freq << (prescaler + 1));
        if ticks <= u16::MAX as u64 {
            return Ok((ticks as u16, Some(u4::new(prescaler))));
        }
    }
    Ok((u16::MAX, Some(u4::MAX)))
}

/// Frequency of the interval events for the given configuration.
pub fn interval_frequency(ref_clk: Hertz, interval: u16, prescaler: Option<u4>) -> f32 {
    if interval == 0 {
        return 0.0;
    }
    let divider = match prescaler {
        Some(val) => (1u32 << (val.as_u32() + 1)) as f32,
        None => 1.0,
    };
    ref_clk.raw() as f32 / divider / interval as f32
}

/// Interrupt enable register value after additionally enabling `interrupts`.
#[inline]
pub const fn with_enabled(
    ier: InterruptControl,
    interrupts: InterruptControl,
) -> InterruptControl {
    InterruptControl::new_with_raw_value(ier.raw_value() | interrupts.raw_value())
}

/// Interrupt enable register value after disabling `interrupts`.
#[inline]
pub const fn with_disabled(
    ier: InterruptControl,
    interrupts: InterruptControl,
) -> InterruptControl {
    InterruptControl::new_with_raw_value(ier.raw_value() & !interrupts.raw_value())
}

pub struct Ttc {
    pub ch0: TtcChannel,
    pub ch1: TtcChannel,
    pub ch2: TtcChannel,
}

impl Ttc {
    /// Create a new TTC instance. Returns [None] if the passed peripheral block does not have a
    /// valid PS TTC address.
    pub fn new(regs: MmioTtc<'static>) -> Option<Self> {
        let ttc = TtcId::from_regs(&regs)?;
        let channel = |id| TtcChannel {
            regs: unsafe { regs.clone() },
            ttc,
            id,
        };
        Some(Self {
            ch0: channel(ChannelId::Ch0),
            ch1: channel(ChannelId::Ch1),
            ch2: channel(ChannelId::Ch2),
        })
    }

    /// Writes a test value to the counter control register of every channel, reads it back and
    /// restores the previous value.
    pub fn self_test(&mut self) -> Result<(), VerifyError> {
        self.ch0.self_test()?;
        self.ch1.self_test()?;
        self.ch2.self_test()
    }
}

pub struct TtcChannel {
    regs: MmioTtc<'static>,
    ttc: TtcId,
    id: ChannelId,
}

// Safety: A channel driver only accesses the registers of its own counter.
unsafe impl Send for TtcChannel {}

impl TtcChannel {
    pub fn regs_mut(&mut self) -> &mut MmioTtc<'static> {
        &mut self.regs
    }

    #[inline]
    pub fn id(&self) -> ChannelId {
        self.id
    }

    #[inline]
    pub fn ttc_id(&self) -> TtcId {
        self.ttc
    }

    /// Register array index of the channel. Always valid, so the array accessor results can
    /// be unwrapped.
    #[inline]
    fn idx(&self) -> usize {
        self.id as usize
    }

    #[inline]
    pub fn start(&mut self) {
        let idx = self.idx();
        // Unwrap okay, the channel index is always valid.
        self.regs
            .modify_cnt_ctrl(idx, |mut val| {
                val.set_disable(false);
                val
            })
            .unwrap();
    }

    #[inline]
    pub fn stop(&mut self) {
        let idx = self.idx();
        self.regs
            .modify_cnt_ctrl(idx, |mut val| {
                val.set_disable(true);
                val
            })
            .unwrap();
    }

    #[inline]
    pub fn is_started(&mut self) -> bool {
        !self.regs.read_cnt_ctrl(self.idx()).unwrap().disable()
    }

    /// Configure the counter. The running state is kept.
    pub fn set_options(&mut self, options: CounterOptions) {
        let idx = self.idx();
        let disabled = self.regs.read_cnt_ctrl(idx).unwrap().disable();
        self.regs
            .write_cnt_ctrl(idx, options.to_reg(disabled, false))
            .unwrap();
    }

    pub fn options(&mut self) -> CounterOptions {
        CounterOptions::from_reg(self.regs.read_cnt_ctrl(self.idx()).unwrap())
    }

    pub fn set_clock(&mut self, clock: ClockOptions) {
        self.regs.write_clk_ctrl(self.idx(), clock.to_reg()).unwrap();
    }

    pub fn clock(&mut self) -> ClockControl {
        self.regs.read_clk_ctrl(self.idx()).unwrap()
    }

    pub fn set_prescaler(&mut self, prescaler: Option<u4>) {
        let idx = self.idx();
        self.regs
            .modify_clk_ctrl(idx, |mut val| {
                val.set_prescaler(prescaler.unwrap_or(u4::new(0)));
                val.set_prescale_enable(prescaler.is_some());
                val
            })
            .unwrap();
    }

    pub fn prescaler(&mut self) -> Option<u4> {
        let clk = self.clock();
        clk.prescale_enable().then(|| clk.prescaler())
    }

    #[inline]
    pub fn set_interval(&mut self, interval: u16) {
        self.regs
            .write_interval_value(self.idx(), RwValue::new_with_raw_value(interval as u32))
            .unwrap();
    }

    #[inline]
    pub fn interval(&mut self) -> u16 {
        self.regs.read_interval_value(self.idx()).unwrap().value()
    }

    pub fn set_match_value(&mut self, index: MatchIndex, value: u16) {
        let idx = self.idx();
        let value = RwValue::new_with_raw_value(value as u32);
        match index {
            MatchIndex::Match0 => self.regs.write_match_value_0(idx, value),
            MatchIndex::Match1 => self.regs.write_match_value_1(idx, value),
            MatchIndex::Match2 => self.regs.write_match_value_2(idx, value),
        }
        .unwrap();
    }

    /// Enables the given interrupts in addition to the already enabled ones.
    pub fn enable_interrupts(&mut self, interrupts: InterruptControl) {
        let idx = self.idx();
        self.regs
            .modify_ier(idx, |val| with_enabled(val, interrupts))
            .unwrap();
    }

    pub fn disable_interrupts(&mut self, interrupts: InterruptControl) {
        let idx = self.idx();
        self.regs
            .modify_ier(idx, |val| with_disabled(val, interrupts))
            .unwrap();
    }

    pub fn enabled_interrupts(&mut self) -> InterruptControl {
        self.regs.read_ier(self.idx()).unwrap()
    }

    /// Reading the interrupt status register clears it.
    #[inline]
    pub fn interrupt_status(&mut self) -> InterruptStatus {
        self.regs.read_isr(self.idx()).unwrap()
    }

    #[inline]
    pub fn counter(&self) -> u16 {
        self.regs.read_current_counter(self.idx()).unwrap().count()
    }

    /// Restart counting from the start value. The bit is cleared by hardware.
    #[inline]
    pub fn reset_counter(&mut self) {
        let idx = self.idx();
        self.regs
            .modify_cnt_ctrl(idx, |mut val| {
                val.set_reset(true);
                val
            })
            .unwrap();
    }

    fn self_test(&mut self) -> Result<(), VerifyError> {
        let idx = self.idx();
        let saved = self.regs.read_cnt_ctrl(idx).unwrap();
        let mut test_value = CounterControl::STOPPED;
        test_value.set_decrementing(true);
        test_value.set_mode(Mode::Interval);
        self.regs.write_cnt_ctrl(idx, test_value).unwrap();
        let received = self.regs.read_cnt_ctrl(idx).unwrap();
        let mut restore = saved;
        restore.set_reset(false);
        self.regs.write_cnt_ctrl(idx, restore).unwrap();
        if received.raw_value() & 0x7F != test_value.raw_value() {
            return Err(VerifyError {
                register: "TTC counter control",
                expected: test_value.raw_value(),
                received: received.raw_value(),
            });
        }
        Ok(())
    }
}

/// Channel configured as an interval timer which generates an interval event when the counter
/// reaches the interval value.
pub struct IntervalTimer {
    channel: TtcChannel,
    ref_clk: Hertz,
}

impl IntervalTimer {
    /// Interrupts enabled by [Self::enable_interrupt].
    pub const INTERRUPTS: InterruptControl = InterruptControl::INTERVAL;

    /// Create an interval timer with the CPU 1x clock as the clock source. The counter is
    /// stopped after construction.
    pub fn new_with_cpu_clk(
        channel: TtcChannel,
        arm_clocks: &ArmClocks,
        freq: Hertz,
    ) -> Result<Self, TtcConstructionError> {
        let (interval, prescaler) =
            calculate_interval_and_prescaler(arm_clocks.cpu_1x_clk(), freq)?;
        Ok(Self::new_with_raw(
            channel,
            arm_clocks.cpu_1x_clk(),
            interval,
            prescaler,
        )?)
    }

    /// Create an interval timer from raw interval and prescaler values. The written interval
    /// and clock control registers are read back and verified.
    pub fn new_with_raw(
        mut channel: TtcChannel,
        ref_clk: Hertz,
        interval: u16,
        prescaler: Option<u4>,
    ) -> Result<Self, VerifyError> {
        let idx = channel.idx();
        channel.regs.write_cnt_ctrl(idx, CounterControl::STOPPED).unwrap();
        let clock = ClockOptions::new_pclk(prescaler);
        channel.set_clock(clock);
        channel.set_interval(interval);
        let received = channel.interval();
        if received != interval {
            return Err(VerifyError {
                register: "TTC interval",
                expected: interval as u32,
                received: received as u32,
            });
        }
        let received = channel.clock();
        if received.raw_value() & 0x7F != clock.to_reg().raw_value() {
            return Err(VerifyError {
                register: "TTC clock control",
                expected: clock.to_reg().raw_value(),
                received: received.raw_value(),
            });
        }
        channel.set_options(CounterOptions::INTERVAL);
        Ok(Self { channel, ref_clk })
    }

    /// Frequency of the interval events with the current configuration.
    pub fn frequency(&mut self) -> f32 {
        let interval = self.channel.interval();
        let prescaler = self.channel.prescaler();
        interval_frequency(self.ref_clk, interval, prescaler)
    }

    #[inline]
    pub fn enable_interrupt(&mut self) {
        self.channel.enable_interrupts(Self::INTERRUPTS);
    }

    #[inline]
    pub fn disable_interrupt(&mut self) {
        self.channel.disable_interrupts(Self::INTERRUPTS);
    }

    #[inline]
    pub fn start(&mut self) {
        self.channel.reset_counter();
        self.channel.start();
    }

    #[inline]
    pub fn stop(&mut self) {
        self.channel.stop();
    }

    /// Read and clear the interrupt status. Returns whether an interval event occurred.
    #[inline]
    pub fn clear_interrupt(&mut self) -> bool {
        self.channel.interrupt_status().interval()
    }

    #[inline]
    pub fn channel_mut(&mut self) -> &mut TtcChannel {
        &mut self.channel
    }

    pub fn release(self) -> TtcChannel {
        self.channel
    }
}

pub struct Pwm {
    channel: TtcChannel,
    ref_clk: Hertz,
}

impl Pwm {
    /// Interrupts enabled by [Self::enable_cycle_interrupt].
    pub const CYCLE_INTERRUPTS: InterruptControl = InterruptControl::INTERVAL;

    /// Create a new PWM instance which uses the CPU 1x clock as the clock source and also uses
    /// a MIO output pin for the waveform output.
    pub fn new_with_cpu_clk_and_mio_waveout<P: WaveOutPin>(
        channel: TtcChannel,
        arm_clocks: &ArmClocks,
        freq: Hertz,
        wave_out: P,
    ) -> Result<Self, TtcConstructionError> {
        if P::ID != channel.ttc_id() {
            return Err(TtcMismatchError {
                pin: P::ID,
                channel: channel.ttc_id(),
            }
            .into());
        }
        IoPeriphPin::new(wave_out, TTC_MUX_CONF, None);
        Ok(Self::new_with_cpu_clk(channel, arm_clocks, freq)?)
    }

    /// Create a new PWM instance which uses the CPU 1x clock as the clock source.
    pub fn new_with_cpu_clk(
        channel: TtcChannel,
        arm_clocks: &ArmClocks,
        freq: Hertz,
    ) -> Result<Self, FrequencyIsZeroError> {
        Self::new_generic(channel, arm_clocks.cpu_1x_clk(), freq)
    }

    /// Create a new PWM instance based on a reference clock source.
    pub fn new_generic(
        channel: TtcChannel,
        ref_clk: Hertz,
        freq: Hertz,
    ) -> Result<Self, FrequencyIsZeroError> {
        let (interval, prescaler) = calculate_interval_and_prescaler(ref_clk, freq)?;
        let mut pwm = Self { channel, ref_clk };
        pwm.set_up_and_configure_pwm(prescaler, interval);
        Ok(pwm)
    }

    /// Set a new frequency for the PWM cycle.
    ///
    /// This resets the duty cycle to 0%.
    pub fn set_frequency(&mut self, freq: Hertz) -> Result<(), FrequencyIsZeroError> {
        let (interval, prescaler) = calculate_interval_and_prescaler(self.ref_clk, freq)?;
        self.set_up_and_configure_pwm(prescaler, interval);
        Ok(())
    }

    #[inline]
    pub fn ttc_channel_mut(&mut self) -> &mut TtcChannel {
        &mut self.channel
    }

    /// Enable the interval interrupt, which fires once per PWM cycle when the counter wraps
    /// at the interval value. The overflow interrupt never fires in interval mode.
    #[inline]
    pub fn enable_cycle_interrupt(&mut self) {
        self.channel.enable_interrupts(Self::CYCLE_INTERRUPTS);
    }

    #[inline]
    pub fn disable_cycle_interrupt(&mut self) {
        self.channel.disable_interrupts(Self::CYCLE_INTERRUPTS);
    }

    #[inline]
    pub fn max_duty_cycle(&mut self) -> u16 {
        self.channel.interval()
    }

    pub fn set_duty_cycle(&mut self, duty: u16) {
        self.channel.stop();
        self.channel.set_match_value(MatchIndex::Match0, duty);
        self.channel.reset_counter();
        self.channel.start();
    }

    fn set_up_and_configure_pwm(&mut self, prescaler: Option<u4>, interval: u16) {
        let idx = self.channel.idx();
        self.channel
            .regs
            .write_cnt_ctrl(idx, CounterControl::STOPPED)
            .unwrap();
        self.channel.set_clock(ClockOptions::new_pclk(prescaler));
        self.channel.set_interval(interval);
        // Corresponds to duty cycle 0.
        self.channel.set_match_value(MatchIndex::Match0, 0);
        self.channel
            .regs
            .write_cnt_ctrl(
                idx,
                CounterOptions {
                    mode: Mode::Interval,
                    decrementing: false,
                    match_enable: true,
                    wave_enable: true,
                    wave_polarity: WavePolarity::LowToHighOnMatch1,
                }
                .to_reg(false, true),
            )
            .unwrap();
    }
}

impl embedded_hal::pwm::ErrorType for Pwm {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for Pwm {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        // Unwrap okay, the channel index is always valid.
        self.channel
            .regs
            .read_interval_value(self.channel.idx())
            .unwrap()
            .value()
    }

    #[inline]
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.set_duty_cycle(duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CPU_1X: Hertz = Hertz::from_raw(111_111_110);

    #[test]
    fn no_prescaler_required() {
        assert_eq!(
            calculate_interval_and_prescaler(CPU_1X, Hertz::from_raw(100_000)).unwrap(),
            (1111, None)
        );
    }

    #[test]
    fn smallest_prescaler_selected() {
        assert_eq!(
            calculate_interval_and_prescaler(CPU_1X, Hertz::from_raw(1000)).unwrap(),
            (55555, Some(u4::new(0)))
        );
        assert_eq!(
            calculate_interval_and_prescaler(CPU_1X, Hertz::from_raw(10)).unwrap(),
            (43402, Some(u4::new(7)))
        );
    }

    #[test]
    fn interval_saturates() {
        assert_eq!(
            calculate_interval_and_prescaler(Hertz::from_raw(u32::MAX), Hertz::from_raw(1))
                .unwrap(),
            (u16::MAX, Some(u4::MAX))
        );
    }

    #[test]
    fn zero_frequency() {
        assert!(calculate_interval_and_prescaler(CPU_1X, Hertz::from_raw(0)).is_err());
    }

    #[test]
    fn resulting_frequency() {
        let (interval, prescaler) =
            calculate_interval_and_prescaler(CPU_1X, Hertz::from_raw(10)).unwrap();
        assert_relative_eq!(
            interval_frequency(CPU_1X, interval, prescaler),
            10.0,
            max_relative = 0.001
        );
        assert_eq!(interval_frequency(CPU_1X, 0, None), 0.0);
    }

    #[test]
    fn counter_options_register_mapping() {
        let reg = CounterOptions::INTERVAL.to_reg(true, false);
        assert_eq!(reg.raw_value(), 0x23);
        assert_eq!(CounterOptions::from_reg(reg), CounterOptions::INTERVAL);
    }

    #[test]
    fn clock_options_register_mapping() {
        assert_eq!(ClockOptions::new_pclk(None).to_reg().raw_value(), 0);
        assert_eq!(
            ClockOptions::new_pclk(Some(u4::new(7))).to_reg().raw_value(),
            0x0F
        );
    }

    #[test]
    fn interval_timer_interrupt_mask() {
        assert_eq!(IntervalTimer::INTERRUPTS.raw_value(), 0x01);
        let ier = with_enabled(InterruptControl::NONE, IntervalTimer::INTERRUPTS);
        assert_eq!(ier.raw_value(), 0x01);
        assert_eq!(with_disabled(ier, IntervalTimer::INTERRUPTS).raw_value(), 0x00);
    }

    #[test]
    fn pwm_cycle_interrupt_mask() {
        assert_eq!(Pwm::CYCLE_INTERRUPTS.raw_value(), 0x01);
        assert!(!Pwm::CYCLE_INTERRUPTS.counter_overflow());
        // Enabling keeps other sources, disabling only clears the cycle source.
        let ier = with_enabled(InterruptControl::MATCH_0, Pwm::CYCLE_INTERRUPTS);
        assert_eq!(ier.raw_value(), 0x03);
        assert_eq!(with_disabled(ier, Pwm::CYCLE_INTERRUPTS).raw_value(), 0x02);
        assert_eq!(
            with_disabled(InterruptControl::ALL, InterruptControl::COUNTER_OVERFLOW).raw_value(),
            0x2F
        );
    }
}
