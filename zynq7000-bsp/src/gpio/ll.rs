//! Low-level GPIO access module.
//!
//! All pins are addressed through their bank and the bit position inside that bank, so MIO and
//! EMIO pins share the same register accessors.
use embedded_hal::digital::PinState;
use zynq7000::gpio::{Gpio, MaskedOutput, MmioGpio};
pub use zynq7000::slcr::mio::NUM_MIO_PINS;

use crate::slcr::Slcr;

use super::{InterruptPolarity, InterruptType, PinIsOutputOnly, mio::MuxConfig};

pub const NUM_EMIO_PINS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOffset {
    Mio(usize),
    Emio(usize),
}

impl PinOffset {
    /// Returns [None] if offset is larger than 53.
    pub const fn new_for_mio(offset: usize) -> Option<Self> {
        if offset >= NUM_MIO_PINS {
            return None;
        }
        Some(PinOffset::Mio(offset))
    }

    /// Returns [None] if offset is larger than 63.
    pub const fn new_for_emio(offset: usize) -> Option<Self> {
        if offset >= NUM_EMIO_PINS {
            return None;
        }
        Some(PinOffset::Emio(offset))
    }

    pub const fn is_mio(&self) -> bool {
        matches!(self, PinOffset::Mio(_))
    }

    pub const fn offset(&self) -> usize {
        match self {
            PinOffset::Mio(offset) | PinOffset::Emio(offset) => *offset,
        }
    }

    /// GPIO bank of the pin. MIO pins use banks 0 and 1, EMIO pins banks 2 and 3.
    pub const fn bank(&self) -> usize {
        match self {
            PinOffset::Mio(offset) => *offset / 32,
            PinOffset::Emio(offset) => 2 + *offset / 32,
        }
    }

    /// Bit position of the pin inside its bank registers.
    pub const fn bit(&self) -> usize {
        self.offset() % 32
    }

    #[inline]
    pub const fn mask(&self) -> u32 {
        1 << self.bit()
    }

    /// Index of the masked output register, two halfword registers per bank.
    pub const fn masked_out_index(&self) -> usize {
        self.bank() * 2 + self.bit() / 16
    }
}

pub struct LowLevelGpio {
    offset: PinOffset,
    regs: MmioGpio<'static>,
}

// Safety: A pin driver only accesses the bits of its own pin.
unsafe impl Send for LowLevelGpio {}

impl LowLevelGpio {
    pub fn new(offset: PinOffset) -> Self {
        Self {
            offset,
            // Safety: Every low-level pin only touches the bits of its own pin.
            regs: unsafe { Gpio::new_mmio_fixed() },
        }
    }

    pub fn offset(&self) -> PinOffset {
        self.offset
    }

    /// Convert the pin into an output pin.
    pub fn configure_as_output_push_pull(&mut self, init_level: PinState) {
        if self.offset.is_mio() {
            // Tri-state bit must be 0 for the output driver to work.
            self.reconfigure_slcr_mio_cfg(false, None, Some(MuxConfig::new_for_gpio()));
        }
        let mask = self.offset.mask();
        let mut bank = self.regs.bank(self.offset.bank());
        bank.modify_dirm(|v| v | mask);
        bank.modify_out_en(|v| v | mask);
        self.write_state(init_level);
    }

    /// Convert the pin into a floating input pin.
    pub fn configure_as_input_floating(&mut self) -> Result<(), PinIsOutputOnly> {
        self.configure_as_input(false)
    }

    /// Convert the pin into an input pin with a pull up.
    pub fn configure_as_input_with_pull_up(&mut self) -> Result<(), PinIsOutputOnly> {
        self.configure_as_input(true)
    }

    fn configure_as_input(&mut self, pullup: bool) -> Result<(), PinIsOutputOnly> {
        if self.offset.is_mio() {
            let offset_raw = self.offset.offset();
            if offset_raw == 7 || offset_raw == 8 {
                return Err(PinIsOutputOnly);
            }
            self.reconfigure_slcr_mio_cfg(true, Some(pullup), Some(MuxConfig::new_for_gpio()));
        }
        let mask = self.offset.mask();
        let mut bank = self.regs.bank(self.offset.bank());
        bank.modify_dirm(|v| v & !mask);
        bank.modify_out_en(|v| v & !mask);
        Ok(())
    }

    /// Route the pin to an IO peripheral.
    pub fn configure_as_io_periph_pin(&mut self, mux_conf: MuxConfig, pullup: Option<bool>) {
        self.reconfigure_slcr_mio_cfg(false, pullup, Some(mux_conf));
    }

    #[inline]
    pub fn is_high(&self) -> bool {
        // Unwrap okay, bank index is always valid.
        let input = self.regs.read_input(self.offset.bank()).unwrap();
        input & self.offset.mask() != 0
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        !self.is_high()
    }

    #[inline]
    pub fn is_set_high(&mut self) -> bool {
        // Unwrap okay, bank index is always valid.
        let out = self.regs.read_out(self.offset.bank()).unwrap();
        out & self.offset.mask() != 0
    }

    #[inline]
    pub fn is_set_low(&mut self) -> bool {
        !self.is_set_high()
    }

    #[inline]
    pub fn set_low(&mut self) {
        self.write_state(PinState::Low)
    }

    #[inline]
    pub fn set_high(&mut self) {
        self.write_state(PinState::High)
    }

    #[inline]
    pub fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    #[inline]
    fn write_state(&mut self, level: PinState) {
        let bit_in_halfword = self.offset.bit() % 16;
        // Unwrap okay, index is always valid.
        self.regs
            .write_masked_out(
                self.offset.masked_out_index(),
                MaskedOutput::builder()
                    .with_mask(!(1 << bit_in_halfword))
                    .with_output((level as u16) << bit_in_halfword)
                    .build(),
            )
            .unwrap();
    }

    pub fn set_interrupt_type(&mut self, int_type: InterruptType) {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).modify_int_type(|v| match int_type {
            InterruptType::Edge => v | mask,
            InterruptType::Level => v & !mask,
        });
    }

    pub fn set_interrupt_polarity(&mut self, polarity: InterruptPolarity) {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).modify_int_pol(|v| match polarity {
            InterruptPolarity::ActiveHighOrRisingEdge => v | mask,
            InterruptPolarity::ActiveLowOrFallingEdge => v & !mask,
        });
    }

    /// Trigger on both edges. Only relevant for edge sensitive pins.
    pub fn set_interrupt_any_edge(&mut self, any_edge: bool) {
        let mask = self.offset.mask();
        self.regs
            .bank(self.offset.bank())
            .modify_int_any(|v| if any_edge { v | mask } else { v & !mask });
    }

    #[inline]
    pub fn enable_interrupt(&mut self) {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).write_int_en(mask);
    }

    #[inline]
    pub fn disable_interrupt(&mut self) {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).write_int_dis(mask);
    }

    #[inline]
    pub fn clear_interrupt(&mut self) {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).write_int_sts(mask);
    }

    #[inline]
    pub fn is_interrupt_pending(&mut self) -> bool {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).read_int_sts() & mask != 0
    }

    #[inline]
    pub fn is_interrupt_enabled(&mut self) -> bool {
        let mask = self.offset.mask();
        self.regs.bank(self.offset.bank()).read_int_mask() & mask == 0
    }

    fn reconfigure_slcr_mio_cfg(
        &mut self,
        tristate: bool,
        pullup: Option<bool>,
        mux_conf: Option<MuxConfig>,
    ) {
        let raw_offset = self.offset.offset();
        // Safety: We only modify the MIO config of the pin.
        let mut slcr_wrapper = unsafe { Slcr::steal() };
        // Read first, writing requires unlocking the SLCR. This avoids a re-configuration if the
        // boot image already configured the pin.
        // Unwrap okay, MIO offsets are always valid.
        let mio_cfg = slcr_wrapper.regs().read_mio_pins(raw_offset).unwrap();
        let pullup_differs = pullup.is_some_and(|pullup| mio_cfg.pullup() != pullup);
        let mux_differs = mux_conf.is_some_and(|conf| MuxConfig::from(mio_cfg) != conf);
        if !pullup_differs && !mux_differs && tristate == mio_cfg.tri_enable() {
            return;
        }
        slcr_wrapper.modify(|mut_slcr| {
            mut_slcr
                .modify_mio_pins(raw_offset, |mut val| {
                    if let Some(pullup) = pullup {
                        val.set_pullup(pullup);
                    }
                    if let Some(mux_conf) = mux_conf {
                        val.set_l0_sel(mux_conf.l0_sel());
                        val.set_l1_sel(mux_conf.l1_sel());
                        val.set_l2_sel(mux_conf.l2_sel());
                        val.set_l3_sel(mux_conf.l3_sel());
                    }
                    val.set_tri_enable(tristate);
                    val
                })
                .unwrap();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mio_offsets_to_banks() {
        let led = PinOffset::new_for_mio(47).unwrap();
        assert_eq!(led.bank(), 1);
        assert_eq!(led.bit(), 15);
        assert_eq!(led.mask(), 1 << 15);
        assert_eq!(led.masked_out_index(), 2);

        let uart_rx = PinOffset::new_for_mio(49).unwrap();
        assert_eq!(uart_rx.bank(), 1);
        assert_eq!(uart_rx.bit(), 17);
        assert_eq!(uart_rx.masked_out_index(), 3);
        assert!(PinOffset::new_for_mio(54).is_none());
    }

    #[test]
    fn emio_offsets_to_banks() {
        let first = PinOffset::new_for_emio(0).unwrap();
        assert_eq!(first.bank(), 2);
        assert_eq!(first.masked_out_index(), 4);
        let last = PinOffset::new_for_emio(63).unwrap();
        assert_eq!(last.bank(), 3);
        assert_eq!(last.bit(), 31);
        assert_eq!(last.masked_out_index(), 7);
        assert!(!last.is_mio());
        assert!(PinOffset::new_for_emio(64).is_none());
    }
}
