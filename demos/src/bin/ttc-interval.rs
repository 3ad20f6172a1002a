//! Interval interrupts from counter 0 of TTC0 once per second.
//!
//! The interval and the clock control registers are verified after writing them. The debug
//! helpers dump the counter configuration before the counter is started.
#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use fugit::HertzU32 as Hertz;
use log::{error, info};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    dbg,
    gic::{SpiInterrupt, dispatch},
    gpio::GpioPins,
    priv_tim::CpuPrivateTimer,
    report,
    ttc::{CounterOptions, IntervalTimer, Ttc, TtcConstructionError},
};
use zynq7000_bsp_demos::{halt, init_console, init_gic, read_clocks};
use zynq7000_rt as _;

const EXPIRE_SECONDS: u32 = 10;
const INTERRUPT_FREQUENCY: Hertz = Hertz::from_raw(1);

static TIMER: Mutex<RefCell<Option<IntervalTimer>>> = Mutex::new(RefCell::new(None));
static CALLS: AtomicU32 = AtomicU32::new(0);
static EXPIRED: AtomicBool = AtomicBool::new(false);

fn ttc_handler() {
    let interval_event = critical_section::with(|cs| {
        TIMER
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map(|timer| timer.clear_interrupt())
    });
    match interval_event {
        Some(true) => {
            let calls = CALLS.fetch_add(1, Ordering::Relaxed) + 1;
            info!("Received TTC interval interrupt {calls}");
            if calls == EXPIRE_SECONDS {
                EXPIRED.store(true, Ordering::Relaxed);
            }
        }
        Some(false) => info!("Received some other TTC interrupt"),
        None => error!("TTC interrupt without a configured timer"),
    }
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
        "TTC Interval Example",
    );
    let Some(mut delay) = CpuPrivateTimer::take(clocks.arm_clocks()) else {
        halt();
    };

    let mut gic = init_gic(dp.gicc, dp.gicd);

    // Start from the reset state in case a previous run left the counter running.
    if let Err(e) = dbg::ttc::reset(0, 0) {
        error!("{e}");
        halt();
    }
    let Some(mut ttc) = Ttc::new(dp.ttc_0) else {
        halt();
    };
    report::operation("Configuring triple timer TTC0", true);
    if report::check("Running TTC self test", ttc.self_test()).is_err() {
        halt();
    }

    let timer_result =
        IntervalTimer::new_with_cpu_clk(ttc.ch0, clocks.arm_clocks(), INTERRUPT_FREQUENCY);
    report::operation(
        "Configuring TTC with interrupt frequency 1 Hz",
        timer_result.is_ok(),
    );
    let mut timer = match timer_result {
        Ok(timer) => timer,
        Err(TtcConstructionError::Verify(e)) => {
            report::mismatch(e.register, e.expected, e.received);
            halt();
        }
        Err(e) => {
            error!("{e}");
            halt();
        }
    };
    let options = timer.channel_mut().options();
    if options != CounterOptions::INTERVAL {
        report::mismatch(
            "Options",
            CounterOptions::INTERVAL.raw_value(),
            options.raw_value(),
        );
    }

    let irq_id = SpiInterrupt::Ttc00 as usize;
    if let Ok(Some(_)) = dispatch::connect(irq_id, ttc_handler) {
        info!("Replaced previously connected TTC handler");
    }
    timer.enable_interrupt();
    let interval = timer.channel_mut().interval();
    let prescaler = timer.channel_mut().prescaler();
    critical_section::with(|cs| TIMER.borrow(cs).replace(Some(timer)));
    gic.enable_spi_interrupt(SpiInterrupt::Ttc00);
    // Safety: Not called inside a critical section.
    unsafe { gic.enable_interrupts() };

    info!("Starting...");
    info!("Silicon Revision {}", dbg::ps7::ps_version());
    dbg::ttc::print_input_freq(clocks.arm_clocks().cpu_1x_clk());
    dbg::ttc::print_options(options);
    dbg::ttc::print_interval(interval, prescaler);

    critical_section::with(|cs| {
        if let Some(timer) = TIMER.borrow(cs).borrow_mut().as_mut() {
            timer.start();
        }
    });

    for i in 0..EXPIRE_SECONDS {
        delay.delay_ms(1000);
        info!("Sleeping...{}", i + 1);
    }
    while !EXPIRED.load(Ordering::Relaxed) {
        cortex_ar::asm::nop();
    }
    critical_section::with(|cs| {
        if let Some(timer) = TIMER.borrow(cs).borrow_mut().as_mut() {
            timer.stop();
        }
    });
    if dbg::ttc::print_summary(0, 0).is_err() {
        error!("Could not read TTC0 counter 0");
    }
    info!("Finished.");
    halt();
}

zynq7000_bsp_demos::exception_handlers!();
