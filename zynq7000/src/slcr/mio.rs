//! # SLCR MIO pin registers
//!
//! One [Config] register per multiplexed I/O pin, write protected by the SLCR lock.
use arbitrary_int::{u2, u3};

pub const NUM_MIO_PINS: usize = 54;

/// I/O standard of the pin buffer. The voltage must match the bank supply.
#[bitbybit::bitenum(u3, exhaustive = false)]
#[derive(Debug, PartialEq, Eq)]
pub enum IoType {
    LvCmos18 = 0b001,
    LvCmos25 = 0b010,
    LvCmos33 = 0b011,
    Hstl = 0b100,
}

/// The four select levels pick the routed peripheral. All of them cleared routes the pin to
/// the GPIO controller.
#[bitbybit::bitfield(u32, debug)]
pub struct Config {
    #[bit(13, rw)]
    disable_hstl_rcvr: bool,
    #[bit(12, rw)]
    pullup: bool,
    #[bits(9..=11, rw)]
    io_type: Option<IoType>,
    /// Fast CMOS edges if set.
    #[bit(8, rw)]
    fast_edge: bool,
    #[bits(5..=7, rw)]
    l3_sel: u3,
    #[bits(3..=4, rw)]
    l2_sel: u2,
    #[bit(2, rw)]
    l1_sel: bool,
    #[bit(1, rw)]
    l0_sel: bool,
    /// Output driver disabled, the pin is an input.
    #[bit(0, rw)]
    tri_enable: bool,
}

impl Config {
    /// Whether the pin is routed to the GPIO controller.
    pub const fn routed_to_gpio(&self) -> bool {
        !self.l0_sel() && !self.l1_sel() && self.l2_sel().value() == 0 && self.l3_sel().value() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uart_pin_config() {
        // UART1 TX and RX on MIO48/49 as written by the PS7 initialization.
        let tx = Config::new_with_raw_value(0x12E0);
        assert!(tx.pullup());
        assert_eq!(tx.io_type(), Ok(IoType::LvCmos18));
        assert_eq!(tx.l3_sel().value(), 0b111);
        assert!(!tx.tri_enable());
        assert!(!tx.routed_to_gpio());
        assert!(Config::new_with_raw_value(0x12E1).tri_enable());
    }

    #[test]
    fn gpio_pin_config() {
        let led = Config::new_with_raw_value(0x1200);
        assert!(led.routed_to_gpio());
        assert!(!led.fast_edge());
        assert!(Config::new_with_raw_value(0x0E00).io_type().is_err());
    }
}
