//! Identification of the processing system silicon.
#![no_std]
#![no_main]

use log::{error, info};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{dbg::ps7, gpio::GpioPins, report};
use zynq7000_bsp_demos::{halt, info_lines, init_console, read_clocks};
use zynq7000_rt as _;

zynq7000_bsp_demos::entry!(main);

pub fn main() -> ! {
    let Some(dp) = PsPeripherals::take() else {
        halt();
    };
    let clocks = read_clocks();
    let gpio_pins = GpioPins::new(dp.gpio);
    init_console(
        dp.uart_1,
        (gpio_pins.mio.mio48, gpio_pins.mio.mio49),
        &clocks,
        "PS7 Silicon Information",
    );

    report::field("Device Code:", ps7::device_code() as u32);
    report::field("Mfr ID:", ps7::mfr_id() as u32);
    info!("{:<20}{}", "PS Version:", ps7::ps_version());

    match report::check("Silicon sanity check", ps7::sanity_check()) {
        Ok(info) => info_lines(info),
        Err(e) => error!("{e}"),
    }
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
