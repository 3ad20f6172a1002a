//! Counts presses of the push button on MIO51 with a rising edge GPIO interrupt.
//!
//! The interrupt handler reports the press and masks the pin interrupt. The main loop unmasks
//! it again after the debounce time.
#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use log::{error, info};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    gic::{SpiInterrupt, dispatch},
    gpio::{GpioPins, Input, InterruptPolarity, InterruptType, Output, PinState},
    pac::gpio::NUM_BANKS,
    priv_tim::CpuPrivateTimer,
    report,
};
use zynq7000_bsp_demos::{halt, init_console, init_gic, read_clocks};
use zynq7000_rt as _;

const DEBOUNCE_MS: u32 = 200;
const RUN_TIME_MS: u32 = 12_000;
const POLL_MS: u32 = 10;

static BUTTON: Mutex<RefCell<Option<Input>>> = Mutex::new(RefCell::new(None));
static PRESS_COUNT: AtomicU32 = AtomicU32::new(0);
static DEBOUNCING: AtomicBool = AtomicBool::new(false);

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
        let count = PRESS_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Button pressed {count}");
        DEBOUNCING.store(true, Ordering::Relaxed);
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
        "Interrupt Examples",
    );
    let Some(mut delay) = CpuPrivateTimer::take(clocks.arm_clocks()) else {
        halt();
    };

    if report::check("GPIO self test", gpio_pins.interrupts.self_test()).is_err() {
        halt();
    }
    let mut button = match Input::new_for_mio(gpio_pins.mio.mio51) {
        Ok(button) => button,
        Err(e) => {
            error!("{e}");
            halt();
        }
    };
    button.disable_interrupt();
    button.clear_interrupt();
    let _led = Output::new_for_mio(gpio_pins.mio.mio47, PinState::Low);

    let mut gic = init_gic(dp.gicc, dp.gicd);
    gic.disable_spi_interrupt(SpiInterrupt::Gpio);
    if let Ok(Some(_)) = dispatch::connect(SpiInterrupt::Gpio as usize, button_handler) {
        info!("Replaced previously connected GPIO handler");
    }

    button.set_interrupt_type(InterruptType::Edge);
    button.set_interrupt_polarity(InterruptPolarity::ActiveHighOrRisingEdge);
    button.set_interrupt_any_edge(false);
    button.enable_interrupt();
    critical_section::with(|cs| BUTTON.borrow(cs).replace(Some(button)));
    gic.enable_spi_interrupt(SpiInterrupt::Gpio);
    // Safety: Not called inside a critical section.
    unsafe { gic.enable_interrupts() };

    for bank in 0..NUM_BANKS {
        if let Ok(mask) = gpio_pins.interrupts.enabled_mask(bank) {
            info!("GPIO bank {bank} interrupt enabled\t\t0x{mask:08x}");
        }
    }
    let button_enabled = critical_section::with(|cs| {
        BUTTON
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .is_some_and(|button| button.is_interrupt_enabled())
    });
    if button_enabled {
        info!("Interrupts enabled for GPIO pin 51");
    }

    info!("Waiting for button press...");
    let mut elapsed_ms = 0;
    while elapsed_ms < RUN_TIME_MS {
        if DEBOUNCING.load(Ordering::Relaxed) {
            delay.delay_ms(DEBOUNCE_MS);
            elapsed_ms += DEBOUNCE_MS;
            critical_section::with(|cs| {
                if let Some(button) = BUTTON.borrow(cs).borrow_mut().as_mut() {
                    button.clear_interrupt();
                    button.enable_interrupt();
                }
            });
            DEBOUNCING.store(false, Ordering::Relaxed);
        } else {
            delay.delay_ms(POLL_MS);
            elapsed_ms += POLL_MS;
        }
    }
    gic.disable_spi_interrupt(SpiInterrupt::Gpio);
    let _ = dispatch::disconnect(SpiInterrupt::Gpio as usize);
    info!("Finished");
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
