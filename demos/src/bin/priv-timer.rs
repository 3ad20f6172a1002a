//! CPU private timer in one-shot and auto-reload mode.
//!
//! The one-shot run is polled. The auto-reload run uses the private timer interrupt (PPI 29),
//! which counts one tick per second.
#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use log::info;
use zynq7000::{PsPeripherals, priv_tim::InterruptStatus};
use zynq7000_bsp::{
    gic::{PpiInterrupt, dispatch},
    gpio::GpioPins,
    priv_tim::CpuPrivateTimer,
    report,
};
use zynq7000_bsp_demos::{halt, init_console, init_gic, read_clocks};
use zynq7000_rt as _;

const RUN_SECONDS: u32 = 5;

static TICKS: AtomicU32 = AtomicU32::new(0);

fn private_timer_handler() {
    // Safety: Only the event flag is written, the driver in main never touches it while the
    // interrupt is enabled.
    let mut regs = unsafe { zynq7000::priv_tim::CpuPrivateTimer::new_mmio_fixed() };
    regs.write_interrupt_status(InterruptStatus::builder().with_event_flag(true).build());
    let ticks = TICKS.fetch_add(1, Ordering::Relaxed) + 1;
    info!("Private timer tick {ticks}");
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
        "CPU Private Timer Example",
    );
    let mut gic = init_gic(dp.gicc, dp.gicd);

    let Some(mut timer) = CpuPrivateTimer::take(clocks.arm_clocks()) else {
        halt();
    };
    if report::check("Running private timer self test", timer.self_test()).is_err() {
        halt();
    }
    let one_second = timer.counter_clock().raw();
    info!("Counter clock {} Hz", one_second);

    info!("Starting one-shot timer with 1 s");
    timer.start_with_ticks(one_second, false);
    while !timer.is_expired() {
        cortex_ar::asm::nop();
    }
    report::operation("One-shot timer expired", true);
    timer.clear_event_flag();

    let irq_id = PpiInterrupt::CpuPrivateTimer as usize;
    if let Ok(Some(_)) = dispatch::connect(irq_id, private_timer_handler) {
        info!("Replaced previously connected private timer handler");
    }
    gic.enable_ppi_interrupt(PpiInterrupt::CpuPrivateTimer);
    // Safety: Not called inside a critical section.
    unsafe { gic.enable_interrupts() };

    info!("Starting auto-reload timer for {RUN_SECONDS} s");
    timer.start_with_ticks(one_second, true);
    timer.enable_interrupt();
    while TICKS.load(Ordering::Relaxed) < RUN_SECONDS {
        cortex_ar::asm::nop();
    }
    timer.stop();
    gic.disable_interrupts();
    let _ = dispatch::disconnect(irq_id);
    // A tick may still arrive between the poll and stopping the timer.
    report::operation("Auto-reload timer", TICKS.load(Ordering::Relaxed) >= RUN_SECONDS);
    info!("Ticks counted: {}", TICKS.load(Ordering::Relaxed));
    info!("Finished.");
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
