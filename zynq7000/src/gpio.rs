//! # GPIO register module
//!
//! Banks 0 and 1 are routed to the MIO pins (32 + 22 pins), banks 2 and 3 to the EMIO pins
//! (2 * 32 pins) which are accessible through the programmable logic.
pub const GPIO_BASE_ADDR: usize = 0xE000_A000;

pub const NUM_BANKS: usize = 4;
/// MIO pins 0..=53 plus EMIO pins 0..=63.
pub const NUM_PINS: usize = 118;
/// Number of pins per bank. Bank 1 only uses 22 pins.
pub const BANK_WIDTHS: [u32; NUM_BANKS] = [32, 22, 32, 32];

/// Writes only update the output bits which are not masked.
#[bitbybit::bitfield(u32, default = 0x0)]
#[derive(Debug)]
pub struct MaskedOutput {
    /// A set bit protects the corresponding output bit from being written.
    #[bits(16..=31, w)]
    mask: u16,
    #[bits(0..=15, rw)]
    output: u16,
}

/// Interrupt and direction control of one bank.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct BankControl {
    /// Direction mode. A set bit configures the pin as an output.
    dirm: u32,
    /// Output enable.
    out_en: u32,
    /// Interrupt mask status. A set bit means the interrupt is masked (disabled).
    #[mmio(PureRead)]
    int_mask: u32,
    /// Writing a one unmasks the interrupt.
    #[mmio(Write)]
    int_en: u32,
    /// Writing a one masks the interrupt.
    #[mmio(Write)]
    int_dis: u32,
    /// Interrupt status. Writing a one clears the status bit.
    #[mmio(PureRead, Write)]
    int_sts: u32,
    /// Set bit: edge sensitive. Cleared bit: level sensitive.
    int_type: u32,
    /// Set bit: active high or rising edge. Cleared bit: active low or falling edge.
    int_pol: u32,
    /// Set bit: trigger on both edges. Only used for edge sensitive pins.
    int_any: u32,
}

/// GPIO register block.
#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Gpio {
    /// Maskable output data, two halfword registers per bank: the lower 16 bits first.
    masked_out: [MaskedOutput; 8],

    _reserved_0: [u32; 8],

    /// Output data, one register per bank.
    out: [u32; NUM_BANKS],

    _reserved_1: [u32; 4],

    /// Input data, one register per bank.
    #[mmio(PureRead)]
    input: [u32; NUM_BANKS],

    _reserved_2: [u32; 101],

    #[mmio(Inner)]
    bank_0: BankControl,

    _reserved_3: [u32; 7],

    #[mmio(Inner)]
    bank_1: BankControl,

    _reserved_4: [u32; 7],

    #[mmio(Inner)]
    bank_2: BankControl,

    _reserved_5: [u32; 7],

    #[mmio(Inner)]
    bank_3: BankControl,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Gpio>(), 0x2E8);

impl Gpio {
    /// Create a new GPIO MMIO instance at the fixed base address.
    ///
    /// # Safety
    ///
    /// This API can be used to potentially create a driver to the same peripheral structure
    /// from multiple threads. The user must ensure that concurrent accesses are safe and do not
    /// interfere with each other.
    pub const unsafe fn new_mmio_fixed() -> MmioGpio<'static> {
        unsafe { Self::new_mmio_at(GPIO_BASE_ADDR) }
    }
}

impl MmioGpio<'_> {
    /// Access the control block of the given bank.
    ///
    /// # Panics
    ///
    /// Panics if the bank index is larger than 3.
    pub fn bank(&mut self, bank: usize) -> MmioBankControl<'_> {
        match bank {
            0 => self.bank_0(),
            1 => self.bank_1(),
            2 => self.bank_2(),
            3 => self.bank_3(),
            _ => panic!("invalid GPIO bank {bank}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_widths_sum_to_pin_count() {
        assert_eq!(BANK_WIDTHS.iter().sum::<u32>() as usize, NUM_PINS);
    }

    #[test]
    fn masked_output_layout() {
        let reg = MaskedOutput::builder()
            .with_mask(!(1 << 15))
            .with_output(1 << 15)
            .build();
        assert_eq!(reg.raw_value(), 0x7FFF_8000);
    }
}
