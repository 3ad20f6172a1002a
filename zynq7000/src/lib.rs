//! # Register access crate for the AMD Zynq 7000 processing system
//!
//! Register blocks are generated with [derive_mmio] and bit fields with [bitbybit]. Only the
//! blocks exercised by the board support package are modelled: the interrupt controller, GPIO,
//! the triple timer counters, the CPU private timer and watchdog, the PS-XADC interface, the
//! device configuration block, the UARTs and the system level control registers.
//!
//! Every block exposes a `new_mmio_fixed*` constructor for direct register access. The
//! [PsPeripherals] singleton hands out the blocks which have an ownership based driver.
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(test)]
extern crate std;

use core::sync::atomic::{AtomicBool, Ordering};

pub mod devcfg;
pub mod gic;
pub mod gpio;
pub mod mpcore;
pub mod priv_tim;
pub mod priv_wdt;
pub mod slcr;
pub mod ttc;
pub mod uart;
pub mod xadc;

static PERIPHERALS_TAKEN: AtomicBool = AtomicBool::new(false);

/// Processing system peripherals which are owned by a driver.
pub struct PsPeripherals {
    pub gicc: gic::MmioGicCpuInterface<'static>,
    pub gicd: gic::MmioGicDistributor<'static>,
    pub gpio: gpio::MmioGpio<'static>,
    pub ttc_0: ttc::MmioTtc<'static>,
    pub ttc_1: ttc::MmioTtc<'static>,
    pub priv_tim: priv_tim::MmioCpuPrivateTimer<'static>,
    pub priv_wdt: priv_wdt::MmioCpuPrivateWatchdog<'static>,
    pub xadc: xadc::MmioXAdc<'static>,
    pub uart_0: uart::MmioUart<'static>,
    pub uart_1: uart::MmioUart<'static>,
}

impl PsPeripherals {
    /// Returns the peripheral singleton exactly once.
    pub fn take() -> Option<Self> {
        if PERIPHERALS_TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }
        // Safety: This is the only place the singleton is handed out.
        Some(unsafe { Self::steal() })
    }

    /// Create the peripheral singleton without checking whether it was already taken.
    ///
    /// # Safety
    ///
    /// Circumvents the ownership tracking. The caller must ensure that no two drivers access the
    /// same register block concurrently.
    pub unsafe fn steal() -> Self {
        unsafe {
            Self {
                gicc: gic::GicCpuInterface::new_mmio_fixed(),
                gicd: gic::GicDistributor::new_mmio_fixed(),
                gpio: gpio::Gpio::new_mmio_fixed(),
                ttc_0: ttc::Ttc::new_mmio_fixed_0(),
                ttc_1: ttc::Ttc::new_mmio_fixed_1(),
                priv_tim: priv_tim::CpuPrivateTimer::new_mmio_fixed(),
                priv_wdt: priv_wdt::CpuPrivateWatchdog::new_mmio_fixed(),
                xadc: xadc::XAdc::new_mmio_fixed(),
                uart_0: uart::Uart::new_mmio_fixed_0(),
                uart_1: uart::Uart::new_mmio_fixed_1(),
            }
        }
    }
}
