//! PS UART registers.
//!
//! Only the registers and fields touched by a polled console are modelled with bit fields.
//! The interrupt and modem registers are plain words.
pub const UART_0_BASE: usize = 0xE000_0000;
pub const UART_1_BASE: usize = 0xE000_1000;

/// Depth of the TX and RX FIFO.
pub const FIFO_DEPTH: usize = 64;

/// Value for the interrupt enable/disable registers which selects every source.
pub const ALL_INTERRUPTS: u32 = 0x3FFF;

#[bitbybit::bitenum(u3, exhaustive = true)]
#[derive(Debug, PartialEq, Eq)]
pub enum Parity {
    Even = 0b000,
    Odd = 0b001,
    Space = 0b010,
    Mark = 0b011,
    Disabled = 0b100,
    /// `0b1xx` all disable the parity bit.
    DisabledAlt0 = 0b101,
    DisabledAlt1 = 0b110,
    DisabledAlt2 = 0b111,
}

#[bitbybit::bitenum(u2, exhaustive = true)]
#[derive(Default, Debug, PartialEq, Eq)]
pub enum CharLen {
    #[default]
    Eight = 0b00,
    EightAlt = 0b01,
    Seven = 0b10,
    Six = 0b11,
}

#[bitbybit::bitenum(u1, exhaustive = true)]
#[derive(Default, Debug, PartialEq, Eq)]
pub enum ClockSelect {
    #[default]
    UartRefClk = 0b0,
    UartRefClkDiv8 = 0b1,
}

#[bitbybit::bitenum(u2, exhaustive = false)]
#[derive(Default, Debug, PartialEq, Eq)]
pub enum StopBits {
    #[default]
    One = 0b00,
    OnePointFive = 0b01,
    Two = 0b10,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Control {
    /// Takes precedence over `tx_enable`.
    #[bit(5, rw)]
    tx_disable: bool,
    #[bit(4, rw)]
    tx_enable: bool,
    /// Takes precedence over `rx_enable`.
    #[bit(3, rw)]
    rx_disable: bool,
    #[bit(2, rw)]
    rx_enable: bool,
    /// Self-clearing.
    #[bit(1, rw)]
    tx_reset: bool,
    /// Self-clearing.
    #[bit(0, rw)]
    rx_reset: bool,
}

impl Control {
    /// Both data paths disabled.
    pub const DISABLED: Self = Self::new_with_raw_value(0x28);
    /// Both data paths disabled and reset.
    pub const DISABLED_AND_RESET: Self = Self::new_with_raw_value(0x2B);
    /// Both data paths enabled.
    pub const ENABLED: Self = Self::new_with_raw_value(0x14);
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Mode {
    #[bits(6..=7, rw)]
    stop_bits: Option<StopBits>,
    #[bits(3..=5, rw)]
    parity: Parity,
    #[bits(1..=2, rw)]
    char_len: CharLen,
    #[bit(0, rw)]
    clock_select: ClockSelect,
}

impl Mode {
    /// Eight data bits, no parity and one stop bit.
    pub const fn eight_n_one(clock_select: ClockSelect) -> Self {
        Self::builder()
            .with_stop_bits(StopBits::One)
            .with_parity(Parity::Disabled)
            .with_char_len(CharLen::Eight)
            .with_clock_select(clock_select)
            .build()
    }
}

/// Baud rate generator. The sample clock is the selected clock divided by this value.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Baudgen {
    #[bits(0..=15, rw)]
    clock_divisor: u16,
}

/// The baud rate is the sample clock divided by `divisor + 1`.
#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct BaudRateDivisor {
    #[bits(0..=7, rw)]
    divisor: u8,
}

#[bitbybit::bitfield(u32, default = 0x0, debug)]
pub struct Fifo {
    #[bits(0..=7, rw)]
    data: u8,
}

#[bitbybit::bitfield(u32, debug)]
pub struct Status {
    #[bit(11, r)]
    tx_active: bool,
    #[bit(10, r)]
    rx_active: bool,
    #[bit(4, r)]
    tx_full: bool,
    #[bit(3, r)]
    tx_empty: bool,
    #[bit(2, r)]
    rx_full: bool,
    #[bit(1, r)]
    rx_empty: bool,
}

#[derive(derive_mmio::Mmio)]
#[repr(C)]
pub struct Uart {
    cr: Control,
    mr: Mode,
    #[mmio(Write)]
    ier: u32,
    #[mmio(Write)]
    idr: u32,
    #[mmio(PureRead)]
    imr: u32,
    /// Write one to clear.
    #[mmio(PureRead, Write)]
    isr: u32,
    baudgen: Baudgen,
    rx_timeout: u32,
    rx_fifo_trigger: u32,
    modem_ctrl: u32,
    modem_status: u32,
    #[mmio(PureRead)]
    sr: Status,
    /// Reading pops the RX FIFO.
    #[mmio(Read, Write)]
    fifo: Fifo,
    baud_rate_div: BaudRateDivisor,
    flow_delay: u32,
    _reserved: [u32; 2],
    tx_fifo_trigger: u32,
}

static_assertions::const_assert_eq!(core::mem::size_of::<Uart>(), 0x48);

impl Uart {
    /// # Safety
    ///
    /// Creates an MMIO handle for UART0 without checking whether another handle exists.
    pub const unsafe fn new_mmio_fixed_0() -> MmioUart<'static> {
        unsafe { Self::new_mmio_at(UART_0_BASE) }
    }

    /// # Safety
    ///
    /// Creates an MMIO handle for UART1 without checking whether another handle exists.
    pub const unsafe fn new_mmio_fixed_1() -> MmioUart<'static> {
        unsafe { Self::new_mmio_at(UART_1_BASE) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn register_offsets() {
        assert_eq!(offset_of!(Uart, baudgen), 0x18);
        assert_eq!(offset_of!(Uart, sr), 0x2C);
        assert_eq!(offset_of!(Uart, fifo), 0x30);
        assert_eq!(offset_of!(Uart, baud_rate_div), 0x34);
        assert_eq!(offset_of!(Uart, tx_fifo_trigger), 0x44);
    }

    #[test]
    fn control_presets() {
        assert!(Control::DISABLED.tx_disable());
        assert!(Control::DISABLED.rx_disable());
        assert!(!Control::DISABLED.tx_reset());
        assert!(Control::DISABLED_AND_RESET.tx_reset());
        assert!(Control::DISABLED_AND_RESET.rx_reset());
        assert!(Control::ENABLED.tx_enable());
        assert!(Control::ENABLED.rx_enable());
        assert!(!Control::ENABLED.tx_disable());
    }

    #[test]
    fn eight_n_one_mode() {
        assert_eq!(Mode::eight_n_one(ClockSelect::UartRefClk).raw_value(), 0x20);
        let mode = Mode::eight_n_one(ClockSelect::UartRefClkDiv8);
        assert_eq!(mode.raw_value(), 0x21);
        assert_eq!(mode.stop_bits(), Ok(StopBits::One));
    }
}
