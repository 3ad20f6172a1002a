//! Calculator commands on the custom AXI peripheral in the programmable logic.
//!
//! The bitstream containing the peripheral must be loaded and the level shifters enabled before
//! this program runs.
#![no_std]
#![no_main]

use log::{info, warn};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    axi_periph::{TaylorCommand, TaylorPeripheral, parse_command},
    dbg::ps7,
    gpio::GpioPins,
    report,
};
use zynq7000_bsp_demos::{halt, init_console, read_clocks};
use zynq7000_rt as _;

const OPERAND_A: u32 = 0x314;
const OPERAND_B: u32 = 0x1420;
const BAD_COMMAND: u32 = 0xDEAD_BEE0;

fn header(title: &str) {
    info!("{title}");
    let mut underline = heapless::String::<32>::new();
    for _ in 0..title.len().min(32) {
        let _ = underline.push('-');
    }
    info!("{underline}");
}

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
        "Taylor Peripheral Example",
    );
    zynq7000_bsp::configure_level_shifter(zynq7000::slcr::LevelShifterConfig::EnableAll);

    report::field("Device Code:", ps7::device_code() as u32);
    report::field("Mfr ID:", ps7::mfr_id() as u32);
    info!("{:<20}{}", "PS Version:", ps7::ps_version());

    // Safety: Only driver for the peripheral.
    let mut taylor = unsafe { TaylorPeripheral::new() };
    if report::check("AXI peripheral self test", taylor.self_test()).is_err() {
        halt();
    }

    taylor.set_operands(OPERAND_A, OPERAND_B);
    for (title, cmd) in [
        ("Addition", TaylorCommand::Add),
        ("Subtraction", TaylorCommand::Sub),
        ("Multiplication", TaylorCommand::Mult),
    ] {
        header(title);
        let result = taylor.execute(cmd);
        taylor.dump();
        let expected = cmd.expected(OPERAND_A, OPERAND_B);
        if result != expected {
            report::mismatch("Result", expected, result);
        }
    }

    header("Bad Command");
    if let Err(e) = parse_command(BAD_COMMAND) {
        warn!("{e}");
    }
    taylor.execute_raw(BAD_COMMAND);
    taylor.dump();
    info!("Finished.");
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
