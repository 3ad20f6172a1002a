//! Private watchdog with a 3 s timeout in watchdog (reset) mode.
//!
//! Each press of the push button on MIO51 restarts the watchdog. Once the button is no longer
//! pressed, the core is reset and the next run reports the watchdog as reset reason.
#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32 as Milliseconds;
use log::{error, info};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    dbg,
    gic::{SpiInterrupt, dispatch},
    gpio::{GpioPins, Input, InterruptPolarity, InterruptType},
    pac::gpio::NUM_BANKS,
    priv_tim::CpuPrivateTimer,
    report,
    wdt::{Watchdog, WdtMode, ticks_for_timeout, within_margin},
};
use zynq7000_bsp_demos::{halt, init_console, init_gic, read_clocks};
use zynq7000_rt as _;

const WATCHDOG_TIMEOUT: Milliseconds = Milliseconds::from_ticks(3000);
const DEBOUNCE_MS: u32 = 200;
const POLL_MS: u32 = 10;
/// Several poll periods, so a counter sampled once per poll cannot skip over it.
const EXPIRY_MARGIN: Milliseconds = Milliseconds::from_ticks(5 * POLL_MS);

static BUTTON: Mutex<RefCell<Option<Input>>> = Mutex::new(RefCell::new(None));
static PRESS_COUNT: AtomicU32 = AtomicU32::new(0);
static RESTART_REQUEST: AtomicBool = AtomicBool::new(false);

fn button_handler() {
    critical_section::with(|cs| {
        let mut button = BUTTON.borrow(cs).borrow_mut();
        let Some(button) = button.as_mut() else {
            return;
        };
        if !button.is_interrupt_pending() {
            return;
        }
        button.disable_interrupt();
        button.clear_interrupt();
        RESTART_REQUEST.store(true, Ordering::Relaxed);
    });
}

zynq7000_bsp_demos::entry!(main);

pub fn main() -> ! {
    let Some(dp) = PsPeripherals::take() else {
        halt();
    };
    let clocks = read_clocks();
    let mut gpio_pins = GpioPins::new(dp.gpio);
    init_console(
        dp.uart_1,
        (gpio_pins.mio.mio48, gpio_pins.mio.mio49),
        &clocks,
        "Private Watchdog Examples",
    );
    let Some(mut delay) = CpuPrivateTimer::take(clocks.arm_clocks()) else {
        halt();
    };
    let mut gic = init_gic(dp.gicc, dp.gicd);

    let Some(mut wdt) = Watchdog::take(dp.priv_wdt, clocks.arm_clocks()) else {
        halt();
    };
    let reset_status = if wdt.reset_occurred() { "RESET" } else { "CLEAR" };
    info!("{:<50}{:>10}", "Watchdog timer reset status register", reset_status);
    wdt.clear_reset_status();
    if report::check("Watchdog timer self test", wdt.self_test()).is_err() {
        halt();
    }
    wdt.stop();
    wdt.set_mode(WdtMode::Watchdog);
    report::operation("Watchdog mode selected", wdt.is_watchdog_mode());
    let load = match report::check("Watchdog timeout 3 s", wdt.load_timeout(WATCHDOG_TIMEOUT)) {
        Ok(load) => load,
        Err(_) => halt(),
    };
    report::field("Load value", load);

    if report::check("GPIO PS self test", gpio_pins.interrupts.self_test()).is_err() {
        halt();
    }
    let mut disabled = true;
    let mut cleared = true;
    for bank in 0..NUM_BANKS {
        disabled &= gpio_pins.interrupts.disable_all(bank).is_ok()
            && gpio_pins.interrupts.enabled_mask(bank) == Ok(0);
        cleared &= gpio_pins.interrupts.clear_all(bank).is_ok()
            && gpio_pins.interrupts.pending_mask(bank) == Ok(0);
    }
    report::operation("Disable GPIO PS interrupts", disabled);
    report::operation("Clear pending GPIO PS interrupts", cleared);

    let mut button = match Input::new_for_mio(gpio_pins.mio.mio51) {
        Ok(button) => button,
        Err(e) => {
            error!("{e}");
            halt();
        }
    };
    button.set_interrupt_type(InterruptType::Edge);
    button.set_interrupt_polarity(InterruptPolarity::ActiveHighOrRisingEdge);
    button.set_interrupt_any_edge(false);
    button.clear_interrupt();
    button.enable_interrupt();
    critical_section::with(|cs| BUTTON.borrow(cs).replace(Some(button)));

    if let Ok(Some(_)) = dispatch::connect(SpiInterrupt::Gpio as usize, button_handler) {
        info!("Replaced previously connected GPIO handler");
    }
    gic.enable_spi_interrupt(SpiInterrupt::Gpio);
    // Safety: Not called inside a critical section.
    unsafe { gic.enable_interrupts() };

    dbg::wdt::print_status(wdt.regs());
    info!("Press the button to restart the watchdog");
    let cpu_3x2x_clk = clocks.arm_clocks().cpu_3x2x_clk();
    let expiry_margin = match ticks_for_timeout(cpu_3x2x_clk, wdt.prescaler(), EXPIRY_MARGIN) {
        Ok(ticks) => ticks,
        Err(e) => {
            error!("{e}");
            halt();
        }
    };
    let mut flushed = false;
    wdt.start();
    loop {
        if RESTART_REQUEST.swap(false, Ordering::Relaxed) {
            wdt.restart();
            flushed = false;
            let count = PRESS_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
            info!("Watchdog restarted {count}");
            delay.delay_ms(DEBOUNCE_MS);
            critical_section::with(|cs| {
                if let Some(button) = BUTTON.borrow(cs).borrow_mut().as_mut() {
                    button.clear_interrupt();
                    button.enable_interrupt();
                }
            });
        } else {
            delay.delay_ms(POLL_MS);
        }
        if !flushed && within_margin(wdt.counter(), expiry_margin) {
            info!("Watchdog about to expire");
            zynq7000_bsp::log::flush();
            flushed = true;
        }
    }
}

zynq7000_bsp_demos::exception_handlers!();
