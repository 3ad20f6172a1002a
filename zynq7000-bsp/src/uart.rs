//! # UART module.
//!
//! Polled, blocking driver for the processing system UARTs. It is used as the console of the
//! demonstration programs.
use core::convert::Infallible;

use arbitrary_int::u3;
use fugit::HertzU32 as Hertz;
use libm::round;
use zynq7000::{
    slcr::reset::DualRefAndClockReset,
    uart::{
        ALL_INTERRUPTS, BaudRateDivisor, Baudgen, ClockSelect, Control, Fifo, MmioUart, Mode,
        UART_0_BASE, UART_1_BASE,
    },
};

use crate::{
    enable_amba_periph_clk,
    gpio::{
        IoPeriphPin,
        mio::{
            Mio8, Mio9, Mio12, Mio13, Mio28, Mio29, Mio32, Mio33, Mio36, Mio37, Mio48, Mio49,
            Mio52, Mio53, MioPinMarker, MuxConfig, Pin,
        },
    },
    slcr::Slcr,
};

#[cfg(not(feature = "7z010-7z007s-clg225"))]
use crate::gpio::mio::{Mio16, Mio17, Mio20, Mio21, Mio24, Mio25, Mio40, Mio41, Mio44, Mio45};

pub use zynq7000::uart::FIFO_DEPTH;

pub const UART_MUX_CONF: MuxConfig = MuxConfig::new_with_l3(u3::new(0b111));

/// Based on values provided by the vendor library.
pub const MAX_BAUD_RATE: u32 = 6240000;
/// Based on values provided by the vendor library.
pub const MIN_BAUD_RATE: u32 = 110;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UartId {
    Uart0 = 0,
    Uart1 = 1,
}

impl UartId {
    pub fn from_regs(regs: &MmioUart<'static>) -> Option<Self> {
        match unsafe { regs.ptr() } as usize {
            UART_0_BASE => Some(UartId::Uart0),
            UART_1_BASE => Some(UartId::Uart1),
            _ => None,
        }
    }
}

pub trait RxPin: MioPinMarker {
    const UART_IDX: UartId;
}
pub trait TxPin: MioPinMarker {
    const UART_IDX: UartId;
}

pub trait UartPins {}

macro_rules! pin_pairs {
    ($UartPeriph:path, ($( [$(#[$meta:meta], )? $TxMio:ident, $RxMio:ident] ),+ $(,)? )) => {
        $(
            $( #[$meta] )?
            impl TxPin for Pin<$TxMio> {
                const UART_IDX: UartId = $UartPeriph;
            }

            $( #[$meta] )?
            impl RxPin for Pin<$RxMio> {
                const UART_IDX: UartId = $UartPeriph;
            }

            $( #[$meta] )?
            impl UartPins for (Pin<$TxMio>, Pin<$RxMio>) {}
        )+
    };
}

pin_pairs!(
    UartId::Uart1,
    (
        [Mio8, Mio9],
        [Mio12, Mio13],
        [#[cfg(not(feature ="7z010-7z007s-clg225"))], Mio16, Mio17],
        [#[cfg(not(feature ="7z010-7z007s-clg225"))], Mio20, Mio21],
        [#[cfg(not(feature ="7z010-7z007s-clg225"))], Mio24, Mio25],
        [Mio28, Mio29],
        [Mio32, Mio33],
        [Mio36, Mio37],
        [#[cfg(not(feature ="7z010-7z007s-clg225"))], Mio40, Mio41],
        [#[cfg(not(feature ="7z010-7z007s-clg225"))], Mio44, Mio45],
        [Mio48, Mio49],
        [Mio52, Mio53],
    )
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("divisor is zero")]
pub struct DivisorZero;

#[derive(Debug, thiserror::Error)]
pub enum UartConstructionError {
    #[error("invalid UART register block")]
    InvalidPsUart,
    #[error("pins belong to another UART")]
    IdxMissmatch,
}

/// Raw baud rate generator settings: `baud = sel_clk / (cd * (bdiv + 1))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClkConfigRaw {
    cd: u16,
    bdiv: u8,
}

impl ClkConfigRaw {
    #[inline]
    pub const fn new(cd: u16, bdiv: u8) -> Result<Self, DivisorZero> {
        if cd == 0 {
            return Err(DivisorZero);
        }
        Ok(ClkConfigRaw { cd, bdiv })
    }

    /// Calculate the clock configuration with the smallest error to reach the target baud rate.
    ///
    /// Returns the configuration together with the baud error in percent. It is recommended to
    /// keep this error below 2-3 %.
    pub fn new_autocalc_with_error(
        mut uart_clk: Hertz,
        clk_sel: ClockSelect,
        target_baud: u32,
    ) -> Result<(Self, f64), DivisorZero> {
        if target_baud == 0 {
            return Err(DivisorZero);
        }
        if clk_sel == ClockSelect::UartRefClkDiv8 {
            uart_clk /= 8;
        }
        let mut best = ClkConfigRaw { cd: 1, bdiv: 0 };
        let mut smallest_error: f64 = 100.0;
        for bdiv in 4..u8::MAX {
            let cd = round(uart_clk.raw() as f64 / ((bdiv as u32 + 1) as f64 * target_baud as f64))
                as u64;
            if cd == 0 || cd > u16::MAX as u64 {
                continue;
            }
            let candidate = ClkConfigRaw {
                cd: cd as u16,
                bdiv,
            };
            let baud = candidate.actual_baud(uart_clk);
            let error = ((baud - target_baud as f64).abs() / target_baud as f64) * 100.0;
            if error < smallest_error {
                best = candidate;
                smallest_error = error;
            }
        }
        Ok((best, smallest_error))
    }

    #[inline]
    pub const fn cd(&self) -> u16 {
        self.cd
    }

    #[inline]
    pub const fn bdiv(&self) -> u8 {
        self.bdiv
    }

    #[inline]
    pub fn rounded_baud(&self, sel_clk: Hertz) -> u32 {
        round(self.actual_baud(sel_clk)) as u32
    }

    #[inline]
    pub fn actual_baud(&self, sel_clk: Hertz) -> f64 {
        sel_clk.raw() as f64 / (self.cd as f64 * (self.bdiv as f64 + 1.0))
    }
}

/// Console UART configuration. Always 8 data bits, no parity and one stop bit.
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    clk_config: ClkConfigRaw,
    clk_sel: ClockSelect,
}

impl UartConfig {
    pub const fn new_with_clk_config(clk_config: ClkConfigRaw) -> Self {
        Self {
            clk_config,
            clk_sel: ClockSelect::UartRefClk,
        }
    }

    #[inline]
    pub const fn raw_clk_config(&self) -> ClkConfigRaw {
        self.clk_config
    }
}

pub struct Uart {
    regs: MmioUart<'static>,
    id: UartId,
}

impl Uart {
    /// Create the UART driver and route the UART to the given MIO pins.
    pub fn new_with_mio<TxPinI: TxPin, RxPinI: RxPin>(
        regs: MmioUart<'static>,
        cfg: UartConfig,
        pins: (TxPinI, RxPinI),
    ) -> Result<Self, UartConstructionError>
    where
        (TxPinI, RxPinI): UartPins,
    {
        let id = UartId::from_regs(&regs).ok_or(UartConstructionError::InvalidPsUart)?;
        if id != TxPinI::UART_IDX || id != RxPinI::UART_IDX {
            return Err(UartConstructionError::IdxMissmatch);
        }
        IoPeriphPin::new(pins.0, UART_MUX_CONF, None);
        IoPeriphPin::new(pins.1, UART_MUX_CONF, None);
        Ok(Self::new_generic_unchecked(regs, id, cfg))
    }

    /// Does not perform any pin configuration.
    pub fn new_generic_unchecked(mut regs: MmioUart<'static>, id: UartId, cfg: UartConfig) -> Uart {
        enable_amba_periph_clk(match id {
            UartId::Uart0 => crate::PeriphSelect::Uart0,
            UartId::Uart1 => crate::PeriphSelect::Uart1,
        });
        reset(id);
        regs.write_cr(Control::DISABLED);
        regs.write_idr(ALL_INTERRUPTS);
        regs.write_mr(Mode::eight_n_one(cfg.clk_sel));
        regs.write_baudgen(
            Baudgen::builder()
                .with_clock_divisor(cfg.clk_config.cd())
                .build(),
        );
        regs.write_baud_rate_div(
            BaudRateDivisor::builder()
                .with_divisor(cfg.clk_config.bdiv())
                .build(),
        );
        regs.write_cr(Control::DISABLED_AND_RESET);
        regs.write_cr(Control::ENABLED);
        Uart { regs, id }
    }

    #[inline]
    pub fn id(&self) -> UartId {
        self.id
    }

    /// Write one byte if the TX FIFO is not full.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.regs.read_sr().tx_full() {
            return Err(nb::Error::WouldBlock);
        }
        self.regs
            .write_fifo(Fifo::builder().with_data(byte).build());
        Ok(())
    }

    #[inline]
    pub fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        if self.regs.read_sr().rx_empty() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.regs.read_fifo().data())
    }

    /// Returns [nb::Error::WouldBlock] until all bytes left the transmitter.
    pub fn flush_tx(&mut self) -> nb::Result<(), Infallible> {
        let status = self.regs.read_sr();
        if !status.tx_empty() || status.tx_active() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl embedded_hal_nb::serial::ErrorType for Uart {
    type Error = Infallible;
}

impl embedded_hal_nb::serial::Write for Uart {
    #[inline]
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.write_byte(word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.flush_tx()
    }
}

impl embedded_hal_nb::serial::Read for Uart {
    #[inline]
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.read_byte()
    }
}

impl embedded_io::ErrorType for Uart {
    type Error = Infallible;
}

impl embedded_io::Write for Uart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Block for the first byte only, then fill the FIFO as far as possible.
        nb::block!(self.write_byte(buf[0]))?;
        let mut written = 1;
        for &byte in &buf[1..] {
            if self.write_byte(byte).is_err() {
                break;
            }
            written += 1;
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        nb::block!(self.flush_tx())
    }
}

impl embedded_io::Read for Uart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        buf[0] = nb::block!(self.read_byte())?;
        let mut read = 1;
        for slot in &mut buf[1..] {
            match self.read_byte() {
                Ok(byte) => *slot = byte,
                Err(_) => break,
            }
            read += 1;
        }
        Ok(read)
    }
}

impl core::fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            let _ = nb::block!(self.write_byte(byte));
        }
        Ok(())
    }
}

/// Reset the UART peripheral using the SLCR reset register for UART.
///
/// Please note that this function will interfere with an already configured
/// UART instance.
#[inline]
pub fn reset(id: UartId) {
    let assert_reset = match id {
        UartId::Uart0 => DualRefAndClockReset::builder()
            .with_periph1_ref_rst(false)
            .with_periph0_ref_rst(true)
            .with_periph1_cpu1x_rst(false)
            .with_periph0_cpu1x_rst(true)
            .build(),
        UartId::Uart1 => DualRefAndClockReset::builder()
            .with_periph1_ref_rst(true)
            .with_periph0_ref_rst(false)
            .with_periph1_cpu1x_rst(true)
            .with_periph0_cpu1x_rst(false)
            .build(),
    };
    unsafe {
        Slcr::with(|regs| {
            regs.reset_ctrl().write_uart(assert_reset);
            cortex_ar::asm::nop();
            regs.reset_ctrl()
                .write_uart(DualRefAndClockReset::new_with_raw_value(0));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::abs_diff_eq;

    const REF_UART_CLK: Hertz = Hertz::from_raw(50_000_000);
    const REF_UART_CLK_DIV_8: Hertz = Hertz::from_raw(6_250_000);

    #[test]
    fn baud_9600_from_ref_clk() {
        let cfg = ClkConfigRaw::new(651, 7).unwrap();
        assert!(abs_diff_eq!(
            cfg.actual_baud(REF_UART_CLK),
            9600.614,
            epsilon = 0.01
        ));
        assert_eq!(cfg.rounded_baud(REF_UART_CLK), 9601);
    }

    #[test]
    fn baud_9600_from_divided_clk() {
        let cfg = ClkConfigRaw::new(81, 7).unwrap();
        assert!(abs_diff_eq!(
            cfg.actual_baud(REF_UART_CLK_DIV_8),
            9645.061,
            epsilon = 0.01
        ));
    }

    #[test]
    fn zero_divisor_is_rejected() {
        assert_eq!(ClkConfigRaw::new(0, 7), Err(DivisorZero));
        assert!(
            ClkConfigRaw::new_autocalc_with_error(REF_UART_CLK, ClockSelect::UartRefClk, 0)
                .is_err()
        );
    }

    #[test]
    fn best_config_for_600_baud() {
        let (cfg, _error) =
            ClkConfigRaw::new_autocalc_with_error(REF_UART_CLK, ClockSelect::UartRefClk, 600)
                .unwrap();
        assert_eq!(cfg.cd(), 499);
        assert_eq!(cfg.bdiv(), 166);
    }

    #[test]
    fn console_baud_error_is_small() {
        let (cfg, error) =
            ClkConfigRaw::new_autocalc_with_error(REF_UART_CLK, ClockSelect::UartRefClk, 115200)
                .unwrap();
        assert!(error < 0.5);
        assert!(abs_diff_eq!(
            cfg.actual_baud(REF_UART_CLK),
            115200.0,
            epsilon = 115200.0 * 0.005
        ));
    }
}
