//! Board setup shared by the demonstration programs.
//!
//! The programs target a MicroZed style board: user LED on MIO47, push button on MIO51 and the
//! USB-UART bridge on UART1 (MIO48/MIO49).
#![no_std]

use core::fmt::{Display, Write as _};

use embedded_io::Write as _;
use fugit::HertzU32 as Hertz;
use zynq7000::{
    gic::{MmioGicCpuInterface, MmioGicDistributor},
    uart::{ClockSelect, MmioUart},
};
use zynq7000_bsp::{
    clocks::Clocks,
    gic::GicConfigurator,
    gpio::mio::{Mio48, Mio49, Pin},
    report,
    uart::{ClkConfigRaw, Uart, UartConfig},
};

pub use log;

/// PS reference clock of the board.
pub const PS_CLOCK_FREQUENCY: Hertz = Hertz::from_raw(33_333_300);
pub const UART_BAUD: u32 = 115200;

/// Stop the demonstration. Interrupt handlers keep running.
pub fn halt() -> ! {
    loop {
        cortex_ar::asm::nop();
    }
}

/// Read back the clock configuration written by the boot loader. Without it, nothing can be
/// reported, so the program halts on failure.
pub fn read_clocks() -> Clocks {
    match Clocks::new_from_regs(PS_CLOCK_FREQUENCY) {
        Ok(clocks) => clocks,
        Err(_) => halt(),
    }
}

/// Set up UART1 on MIO48/MIO49, install the blocking logger, clear the terminal and print the
/// title of the program.
pub fn init_console(
    uart: MmioUart<'static>,
    pins: (Pin<Mio48>, Pin<Mio49>),
    clocks: &Clocks,
    title: &str,
) {
    let clk_config = match ClkConfigRaw::new_autocalc_with_error(
        clocks.uart_clk(),
        ClockSelect::UartRefClk,
        UART_BAUD,
    ) {
        Ok((config, _error)) => config,
        Err(_) => halt(),
    };
    let uart_config = UartConfig::new_with_clk_config(clk_config);
    let mut uart = match Uart::new_with_mio(uart, uart_config, pins) {
        Ok(uart) => uart,
        Err(_) => halt(),
    };
    // The UART writer is infallible.
    let _ = uart.write_all(report::CLEAR_SCREEN.as_bytes());
    zynq7000_bsp::log::uart_blocking::init_with_locks(uart, log::LevelFilter::Trace);
    log::info!("{title}");
    let mut underline = heapless::String::<64>::new();
    for _ in 0..title.len().min(64) {
        let _ = underline.push('-');
    }
    log::info!("{underline}");
}

/// Initialize the interrupt controller, route all SPIs to CPU 0 and enable it. The IRQ
/// exception stays masked until the caller has connected its handlers.
pub fn init_gic(
    gicc: MmioGicCpuInterface<'static>,
    gicd: MmioGicDistributor<'static>,
) -> GicConfigurator {
    let mut gic = GicConfigurator::new_with_init(gicc, gicd);
    gic.disable_interrupts();
    gic.set_all_spi_interrupt_targets_cpu0();
    gic.enable();
    report::operation("Configuring generic interrupt controller", true);
    if report::check("Running GIC self test", gic.self_test()).is_err() {
        halt();
    }
    gic
}

/// Log a multi-line report one line at a time.
pub fn info_lines(value: impl Display) {
    let mut buf = heapless::String::<1024>::new();
    if write!(buf, "{value}").is_err() {
        log::warn!("report truncated");
    }
    for line in buf.lines() {
        log::info!("{line}");
    }
}

/// Defines the IRQ exception handler which dispatches to the connected interrupt handlers, the
/// remaining exception handlers and the panic handler.
#[macro_export]
macro_rules! exception_handlers {
    () => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _irq_handler() {
            let mut gic_helper = zynq7000_bsp::gic::GicInterruptHelper::new();
            let (interrupt, handled) = gic_helper.handle_with_dispatch();
            if !handled && interrupt != zynq7000_bsp::gic::Interrupt::Spurious {
                $crate::log::warn!("unhandled interrupt {:?}", interrupt);
            }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _abort_handler() {
            loop {
                cortex_ar::asm::nop();
            }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _undefined_handler() {
            loop {
                cortex_ar::asm::nop();
            }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _prefetch_handler() {
            loop {
                cortex_ar::asm::nop();
            }
        }

        #[panic_handler]
        fn panic(info: &core::panic::PanicInfo) -> ! {
            $crate::log::error!("Panic: {info:?}");
            loop {}
        }
    };
}

/// Defines the `boot_core` entry point called by the start-up code, which only accepts CPU 0
/// and calls the given main function.
#[macro_export]
macro_rules! entry {
    ($main:path) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn boot_core(cpu_id: u32) -> ! {
            if cpu_id != 0 {
                panic!("unexpected CPU ID {}", cpu_id);
            }
            $main()
        }
    };
}
