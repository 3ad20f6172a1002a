//! Prints the GPIO controller summary, runs the self test and lights the user LED for ten
//! seconds.
#![no_std]
#![no_main]

use embedded_hal::delay::DelayNs;
use log::info;
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    gpio::{GpioPins, Output, PinState},
    priv_tim::CpuPrivateTimer,
    report,
};
use zynq7000_bsp_demos::{halt, info_lines, init_console, read_clocks};
use zynq7000_rt as _;

const LED_ON_SECONDS: u32 = 10;

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
        "GPIO Examples",
    );
    let Some(mut delay) = CpuPrivateTimer::take(clocks.arm_clocks()) else {
        halt();
    };

    info_lines(gpio_pins.interrupts.summary());
    if report::check("GPIO self test", gpio_pins.interrupts.self_test()).is_err() {
        halt();
    }

    info!("Enabled GPIO pin 47");
    let mut led = Output::new_for_mio(gpio_pins.mio.mio47, PinState::High);
    delay.delay_ms(LED_ON_SECONDS * 1000);
    led.set_low();
    info!("Done.");
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
