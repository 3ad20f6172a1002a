//! GPIO support module for the Zynq7000 SoC.
//!
//! This module contains the MIO and EMIO pin singletons, pin abstractions implementing the
//! [embedded_hal::digital] traits, the pin interrupt configuration and a per-bank interrupt
//! view used to report and clear pending interrupts.
pub mod emio;
pub mod ll;
pub mod mio;

use core::convert::Infallible;
use ll::PinOffset;
use mio::{MioPinMarker, MuxConfig};

use crate::gpio::ll::LowLevelGpio;
use crate::{VerifyError, enable_amba_periph_clk, slcr::Slcr};
pub use embedded_hal::digital::PinState;
use zynq7000::{
    gpio::{BANK_WIDTHS, GPIO_BASE_ADDR, Gpio, MmioGpio, NUM_BANKS, NUM_PINS},
    slcr::reset::GpioClockReset,
};

#[derive(Debug, thiserror::Error)]
#[error("MIO pins 7 and 8 can only be output pins")]
pub struct PinIsOutputOnly;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid GPIO bank {0}")]
pub struct InvalidBank(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptType {
    Level,
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptPolarity {
    ActiveLowOrFallingEdge,
    ActiveHighOrRisingEdge,
}

/// GPIO pin singleton for both MIO and EMIO pins.
pub struct GpioPins {
    pub mio: mio::Pins,
    pub emio: emio::Pins,
    pub interrupts: GpioInterrupts,
}

impl GpioPins {
    pub fn new(gpio: MmioGpio<'static>) -> Self {
        enable_amba_periph_clk(crate::PeriphSelect::Gpio);
        // Safety: The pin singletons and the interrupt view only touch disjoint bits.
        Self {
            mio: mio::Pins::new(unsafe { gpio.clone() }),
            interrupts: GpioInterrupts(unsafe { gpio.clone() }),
            emio: emio::Pins::new(gpio),
        }
    }
}

/// Reset the GPIO peripheral using the SLCR reset register for GPIO.
#[inline]
pub fn reset() {
    unsafe {
        Slcr::with(|regs| {
            regs.reset_ctrl()
                .write_gpio(GpioClockReset::builder().with_gpio_cpu1x_rst(true).build());
            cortex_ar::asm::nop();
            regs.reset_ctrl()
                .write_gpio(GpioClockReset::builder().with_gpio_cpu1x_rst(false).build());
        });
    }
}

/// Mask of the implemented pins of a bank. Returns [None] for an invalid bank.
pub const fn bank_pin_mask(bank: usize) -> Option<u32> {
    if bank >= NUM_BANKS {
        return None;
    }
    let width = BANK_WIDTHS[bank];
    if width == 32 {
        Some(u32::MAX)
    } else {
        Some((1 << width) - 1)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinMode {
    OutputPushPull,
    InputFloating,
    InputPullUp,
    /// MIO-only peripheral pin configuration
    MioIoPeriph(MuxConfig),
}

macro_rules! pin_interrupt_api {
    ($ll:tt) => {
        pub fn set_interrupt_type(&mut self, int_type: InterruptType) {
            self.$ll.set_interrupt_type(int_type);
        }

        pub fn set_interrupt_polarity(&mut self, polarity: InterruptPolarity) {
            self.$ll.set_interrupt_polarity(polarity);
        }

        pub fn set_interrupt_any_edge(&mut self, any_edge: bool) {
            self.$ll.set_interrupt_any_edge(any_edge);
        }

        #[inline]
        pub fn enable_interrupt(&mut self) {
            self.$ll.enable_interrupt();
        }

        #[inline]
        pub fn disable_interrupt(&mut self) {
            self.$ll.disable_interrupt();
        }

        #[inline]
        pub fn clear_interrupt(&mut self) {
            self.$ll.clear_interrupt();
        }

        #[inline]
        pub fn is_interrupt_pending(&mut self) -> bool {
            self.$ll.is_interrupt_pending()
        }

        #[inline]
        pub fn is_interrupt_enabled(&mut self) -> bool {
            self.$ll.is_interrupt_enabled()
        }
    };
}

/// Flex pin abstraction which can be re-configured at run-time.
///
/// Flex pins are floating input pins after construction except for MIO7 and MIO8, which are
/// push-pull output pins with initial low-level.
pub struct Flex {
    ll: LowLevelGpio,
    mode: PinMode,
}

impl Flex {
    pub fn new_for_mio<I: mio::PinId>(_pin: mio::Pin<I>) -> Self {
        let mut ll = LowLevelGpio::new(PinOffset::Mio(I::OFFSET));
        let mode = if ll.configure_as_input_floating().is_err() {
            ll.configure_as_output_push_pull(PinState::Low);
            PinMode::OutputPushPull
        } else {
            PinMode::InputFloating
        };
        Self { ll, mode }
    }

    pub fn new_for_emio(pin: emio::EmioPin) -> Self {
        let mut ll = LowLevelGpio::new(PinOffset::Emio(pin.offset()));
        // EMIO pins are never output only.
        let _ = ll.configure_as_input_floating();
        Self {
            ll,
            mode: PinMode::InputFloating,
        }
    }

    pub fn mode(&self) -> PinMode {
        self.mode
    }

    pub fn offset(&self) -> PinOffset {
        self.ll.offset()
    }

    pub fn configure_as_input_floating(&mut self) -> Result<(), PinIsOutputOnly> {
        self.ll.configure_as_input_floating()?;
        self.mode = PinMode::InputFloating;
        Ok(())
    }

    pub fn configure_as_input_with_pull_up(&mut self) -> Result<(), PinIsOutputOnly> {
        self.ll.configure_as_input_with_pull_up()?;
        self.mode = PinMode::InputPullUp;
        Ok(())
    }

    pub fn configure_as_output_push_pull(&mut self, level: PinState) {
        self.ll.configure_as_output_push_pull(level);
        self.mode = PinMode::OutputPushPull;
    }

    /// If the pin is configured as an input pin, this function does nothing.
    pub fn set_high(&mut self) {
        if self.mode == PinMode::OutputPushPull {
            self.ll.set_high();
        }
    }

    /// If the pin is configured as an input pin, this function does nothing.
    pub fn set_low(&mut self) {
        if self.mode == PinMode::OutputPushPull {
            self.ll.set_low();
        }
    }

    /// Reads the input state of the pin, regardless of configured mode.
    #[inline]
    pub fn is_high(&self) -> bool {
        self.ll.is_high()
    }

    /// Reads the input state of the pin, regardless of configured mode.
    #[inline]
    pub fn is_low(&self) -> bool {
        self.ll.is_low()
    }

    pin_interrupt_api!(ll);
}

impl embedded_hal::digital::ErrorType for Flex {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for Flex {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ll.is_high())
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ll.is_low())
    }
}

impl embedded_hal::digital::OutputPin for Flex {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Flex::set_low(self);
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        Flex::set_high(self);
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for Flex {
    /// The result is undefined if the pin is not configured as an output.
    #[inline]
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ll.is_set_high())
    }

    #[inline]
    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.ll.is_set_low())
    }
}

/// Push-Pull output pin.
pub struct Output(LowLevelGpio);

impl Output {
    pub fn new_for_mio<I: mio::PinId>(_pin: mio::Pin<I>, init_level: PinState) -> Self {
        let mut low_level = LowLevelGpio::new(PinOffset::Mio(I::OFFSET));
        low_level.configure_as_output_push_pull(init_level);
        Self(low_level)
    }

    pub fn new_for_emio(pin: emio::EmioPin, init_level: PinState) -> Self {
        let mut low_level = LowLevelGpio::new(PinOffset::Emio(pin.offset()));
        low_level.configure_as_output_push_pull(init_level);
        Self(low_level)
    }

    pub fn offset(&self) -> PinOffset {
        self.0.offset()
    }

    #[inline]
    pub fn set_low(&mut self) {
        self.0.set_low();
    }

    #[inline]
    pub fn set_high(&mut self) {
        self.0.set_high();
    }

    #[inline]
    pub fn toggle(&mut self) {
        self.0.toggle();
    }
}

impl embedded_hal::digital::ErrorType for Output {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for Output {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for Output {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_set_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_set_low())
    }
}

/// Input pin.
pub struct Input(LowLevelGpio);

impl Input {
    pub fn new_for_mio<I: mio::PinId>(_pin: mio::Pin<I>) -> Result<Self, PinIsOutputOnly> {
        let mut low_level = LowLevelGpio::new(PinOffset::Mio(I::OFFSET));
        low_level.configure_as_input_floating()?;
        Ok(Self(low_level))
    }

    pub fn new_for_mio_with_pull_up<I: mio::PinId>(
        _pin: mio::Pin<I>,
    ) -> Result<Self, PinIsOutputOnly> {
        let mut low_level = LowLevelGpio::new(PinOffset::Mio(I::OFFSET));
        low_level.configure_as_input_with_pull_up()?;
        Ok(Self(low_level))
    }

    pub fn new_for_emio(pin: emio::EmioPin) -> Result<Self, PinIsOutputOnly> {
        let mut low_level = LowLevelGpio::new(PinOffset::Emio(pin.offset()));
        low_level.configure_as_input_floating()?;
        Ok(Self(low_level))
    }

    pub fn offset(&self) -> PinOffset {
        self.0.offset()
    }

    pub fn is_high(&self) -> bool {
        self.0.is_high()
    }

    pub fn is_low(&self) -> bool {
        self.0.is_low()
    }

    pin_interrupt_api!(0);
}

impl embedded_hal::digital::ErrorType for Input {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for Input {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

/// IO peripheral pin.
pub struct IoPeriphPin {
    pin: LowLevelGpio,
    mux_conf: MuxConfig,
}

impl IoPeriphPin {
    /// Only the multiplexer and the pullup configuration of the pin are changed.
    pub fn new(pin: impl MioPinMarker, mux_conf: MuxConfig, pullup: Option<bool>) -> Self {
        let mut low_level = LowLevelGpio::new(PinOffset::Mio(pin.offset()));
        low_level.configure_as_io_periph_pin(mux_conf, pullup);
        Self {
            pin: low_level,
            mux_conf,
        }
    }

    #[inline]
    pub fn mode(&self) -> PinMode {
        PinMode::MioIoPeriph(self.mux_conf)
    }

    #[inline]
    pub fn offset(&self) -> PinOffset {
        self.pin.offset()
    }
}

/// Bank-wide view on the GPIO interrupt registers.
pub struct GpioInterrupts(MmioGpio<'static>);

impl GpioInterrupts {
    /// # Safety
    ///
    /// The interrupt registers are shared with all pin drivers. Enabling or disabling whole banks
    /// interferes with their configuration.
    pub unsafe fn steal() -> Self {
        Self(unsafe { Gpio::new_mmio_fixed() })
    }

    fn pin_mask(bank: usize) -> Result<u32, InvalidBank> {
        bank_pin_mask(bank).ok_or(InvalidBank(bank))
    }

    /// Pins of the bank with an unmasked interrupt.
    pub fn enabled_mask(&mut self, bank: usize) -> Result<u32, InvalidBank> {
        let pin_mask = Self::pin_mask(bank)?;
        Ok(!self.0.bank(bank).read_int_mask() & pin_mask)
    }

    /// Pins of the bank with a pending interrupt.
    pub fn pending_mask(&mut self, bank: usize) -> Result<u32, InvalidBank> {
        let pin_mask = Self::pin_mask(bank)?;
        Ok(self.0.bank(bank).read_int_sts() & pin_mask)
    }

    pub fn disable_all(&mut self, bank: usize) -> Result<(), InvalidBank> {
        let pin_mask = Self::pin_mask(bank)?;
        self.0.bank(bank).write_int_dis(pin_mask);
        Ok(())
    }

    pub fn clear_all(&mut self, bank: usize) -> Result<(), InvalidBank> {
        let pin_mask = Self::pin_mask(bank)?;
        self.0.bank(bank).write_int_sts(pin_mask);
        Ok(())
    }

    /// Checks that the register block answers by disabling all interrupts and reading the mask
    /// registers back. All pending interrupts are cleared afterwards.
    ///
    /// All pin interrupts are disabled after this call.
    pub fn self_test(&mut self) -> Result<(), VerifyError> {
        for (bank, pin_mask) in
            (0..NUM_BANKS).filter_map(|bank| bank_pin_mask(bank).map(|mask| (bank, mask)))
        {
            self.0.bank(bank).write_int_dis(pin_mask);
            let int_mask = self.0.bank(bank).read_int_mask() & pin_mask;
            if int_mask != pin_mask {
                return Err(VerifyError {
                    register: "GPIO INT_MASK",
                    expected: pin_mask,
                    received: int_mask,
                });
            }
            self.0.bank(bank).write_int_sts(pin_mask);
        }
        Ok(())
    }

    /// Summary of the GPIO controller configuration.
    pub fn summary(&self) -> GpioSummary {
        GpioSummary {
            device_id: 0,
            base_addr: GPIO_BASE_ADDR,
            is_ready: true,
            max_pins: NUM_PINS,
            max_banks: NUM_BANKS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioSummary {
    pub device_id: u32,
    pub base_addr: usize,
    pub is_ready: bool,
    pub max_pins: usize,
    pub max_banks: usize,
}

impl core::fmt::Display for GpioSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:<20}{}", "Device ID:", self.device_id)?;
        writeln!(f, "{:<20}{:#010x}", "Base address:", self.base_addr)?;
        writeln!(f, "{:<20}{}", "Is ready:", if self.is_ready { "yes" } else { "no" })?;
        writeln!(f, "{:<20}{}", "Max pins:", self.max_pins)?;
        write!(f, "{:<20}{}", "Max banks:", self.max_banks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn bank_masks() {
        assert_eq!(bank_pin_mask(0), Some(0xFFFF_FFFF));
        assert_eq!(bank_pin_mask(1), Some(0x003F_FFFF));
        assert_eq!(bank_pin_mask(3), Some(0xFFFF_FFFF));
    }

    #[test]
    fn invalid_bank_has_no_mask() {
        assert_eq!(bank_pin_mask(NUM_BANKS), None);
        assert_eq!(bank_pin_mask(usize::MAX), None);
        assert!(matches!(GpioInterrupts::pin_mask(4), Err(InvalidBank(4))));
        assert_eq!(GpioInterrupts::pin_mask(2).ok(), Some(0xFFFF_FFFF));
    }

    #[test]
    fn summary_format() {
        let summary = GpioSummary {
            device_id: 0,
            base_addr: GPIO_BASE_ADDR,
            is_ready: true,
            max_pins: NUM_PINS,
            max_banks: NUM_BANKS,
        };
        let mut out = heapless::String::<256>::new();
        write!(out, "{summary}").unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Device ID:          0"));
        assert_eq!(lines.next(), Some("Base address:       0xe000a000"));
        assert_eq!(lines.next(), Some("Is ready:           yes"));
        assert_eq!(lines.next(), Some("Max pins:           118"));
        assert_eq!(lines.next(), Some("Max banks:          4"));
    }
}
