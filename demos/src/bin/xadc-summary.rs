//! Summary of the PS-XADC interface registers and the on-die sensor readings.
#![no_std]
#![no_main]

use log::{error, info};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    gpio::GpioPins,
    report,
    xadc::{
        FifoSummary, InterfaceConfigSummary, InterruptSummary, MiscControlSummary,
        MiscStatusSummary, XAdc,
    },
};
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
        "XADC Summary Application",
    );

    let mut xadc = XAdc::new(dp.xadc);
    info!("Initialization complete");
    if report::check("XADC self test", xadc.self_test()).is_err() {
        halt();
    }

    info_lines(InterfaceConfigSummary(xadc.interface_config()));
    info_lines(InterruptSummary {
        reg: xadc.interrupt_status(),
        is_mask: false,
    });
    info_lines(InterruptSummary {
        reg: xadc.interrupt_mask(),
        is_mask: true,
    });
    let msts = xadc.misc_status();
    info_lines(MiscStatusSummary(msts));
    info_lines(FifoSummary(msts));
    info_lines(MiscControlSummary(xadc.misc_control()));

    match xadc.sensor_readings() {
        Ok(readings) => info_lines(readings),
        Err(e) => error!("Reading the XADC sensors failed: {e}"),
    }
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
