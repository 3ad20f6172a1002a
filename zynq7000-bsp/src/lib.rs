//! # Board support package for the AMD Zynq 7000 SoC family
//!
//! Drivers on top of the [register access crate](zynq7000) for the peripherals used by the
//! bare-metal demonstration programs: GPIO, the generic interrupt controller, the triple timer
//! counters, the CPU private timer and watchdog, the PS-XADC interface and the UART console.
//!
//! The [dbg] module contains helpers which bypass the drivers and access the registers
//! directly. They are intended to inspect the hardware state while debugging a driver.
#![no_std]

#[cfg(feature = "std")]
extern crate std;

use slcr::Slcr;
use zynq7000::slcr::{LevelShifterConfig, LevelShifterRegister};

pub use zynq7000 as pac;

pub mod axi_periph;
pub mod clocks;
pub mod dbg;
pub mod gic;
pub mod gpio;
pub mod log;
pub mod priv_tim;
pub mod report;
pub mod slcr;
pub mod ttc;
pub mod uart;
pub mod wdt;
pub mod xadc;

/// A register did not hold the value which was just written to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{register} verification failed: expected {expected:#010x}, received {received:#010x}")]
pub struct VerifyError {
    pub register: &'static str,
    pub expected: u32,
    pub received: u32,
}

/// This configures the level shifters between the programmable logic (PL) and the processing
/// system (PS).
///
/// The Zynq-7000 TRM p.32 specifies more information about this register and how to use it.
pub fn configure_level_shifter(config: LevelShifterConfig) {
    // Safety: We only manipulate the level shift registers.
    unsafe {
        Slcr::with(|slcr_unlocked| {
            slcr_unlocked.write_lvl_shftr_en(
                LevelShifterRegister::builder()
                    .with_user_lvl_shftr_en(config)
                    .build(),
            );
        });
    }
}

/// AMBA peripherals with a clock gate in the `APER_CLK_CTRL` register.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PeriphSelect {
    Gpio = 22,
    Uart1 = 21,
    Uart0 = 20,
}

fn set_amba_periph_clk(select: PeriphSelect, enable: bool) {
    // Safety: Only the clock gate of the selected peripheral is modified.
    unsafe {
        Slcr::with(|regs| {
            regs.clk_ctrl().modify_aper_clk_ctrl(|mut val| {
                match select {
                    PeriphSelect::Gpio => val.set_gpio_1x_clk_act(enable),
                    PeriphSelect::Uart1 => val.set_uart_1_1x_clk_act(enable),
                    PeriphSelect::Uart0 => val.set_uart_0_1x_clk_act(enable),
                }
                val
            })
        });
    }
}

/// Enable the AMBA peripheral clock, which is required to read the registers of a peripheral
/// block.
#[inline]
pub fn enable_amba_periph_clk(select: PeriphSelect) {
    set_amba_periph_clk(select, true);
}

#[inline]
pub fn disable_amba_periph_clk(select: PeriphSelect) {
    set_amba_periph_clk(select, false);
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn verify_error_message() {
        let err = VerifyError {
            register: "TTC interval",
            expected: 0x1234,
            received: 0,
        };
        let mut out = heapless::String::<96>::new();
        write!(out, "{err}").unwrap();
        assert_eq!(
            out.as_str(),
            "TTC interval verification failed: expected 0x00001234, received 0x00000000"
        );
    }
}
