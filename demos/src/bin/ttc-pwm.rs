//! PWM waveform on the wave output of TTC0 counter 0 (MIO30) with a 50 % duty cycle.
//!
//! The interval interrupt counts the PWM cycles. The program runs until it is reset.
#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use fugit::HertzU32 as Hertz;
use log::{error, info, warn};
use zynq7000::PsPeripherals;
use zynq7000_bsp::{
    dbg,
    gic::{SpiInterrupt, dispatch},
    gpio::GpioPins,
    priv_tim::CpuPrivateTimer,
    report,
    ttc::{Pwm, Ttc},
};
use zynq7000_bsp_demos::{halt, init_console, init_gic, read_clocks};
use zynq7000_rt as _;

const PWM_FREQUENCY: Hertz = Hertz::from_raw(2);
const REPORT_INTERVAL_MS: u32 = 2000;

static PWM: Mutex<RefCell<Option<Pwm>>> = Mutex::new(RefCell::new(None));
static CYCLES: AtomicU32 = AtomicU32::new(0);

fn pwm_handler() {
    let status = critical_section::with(|cs| {
        PWM.borrow(cs)
            .borrow_mut()
            .as_mut()
            .map(|pwm| pwm.ttc_channel_mut().interrupt_status())
    });
    let Some(status) = status else {
        warn!("TTC interrupt without a configured PWM");
        return;
    };
    if status.interval() {
        CYCLES.fetch_add(1, Ordering::Relaxed);
    }
    let others = status.raw_value() & !Pwm::CYCLE_INTERRUPTS.raw_value();
    if others != 0 {
        warn!("Received some other TTC interrupt: 0x{others:02x}");
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
        "TTC PWM Example",
    );
    let Some(mut delay) = CpuPrivateTimer::take(clocks.arm_clocks()) else {
        halt();
    };

    let mut gic = init_gic(dp.gicc, dp.gicd);

    if let Err(e) = dbg::ttc::reset(0, 0) {
        error!("{e}");
        halt();
    }
    let Some(ttc) = Ttc::new(dp.ttc_0) else {
        halt();
    };
    let pwm_result = Pwm::new_with_cpu_clk_and_mio_waveout(
        ttc.ch0,
        clocks.arm_clocks(),
        PWM_FREQUENCY,
        gpio_pins.mio.mio30,
    );
    let mut pwm = match report::check("Configuring triple timer TTC0 as PWM", pwm_result) {
        Ok(pwm) => pwm,
        Err(_) => halt(),
    };
    let half = pwm.max_duty_cycle() / 2;
    pwm.set_duty_cycle(half);
    pwm.ttc_channel_mut().stop();
    // Discard events of the configuration phase.
    let _ = pwm.ttc_channel_mut().interrupt_status();

    let irq_id = SpiInterrupt::Ttc00 as usize;
    if let Ok(Some(_)) = dispatch::connect(irq_id, pwm_handler) {
        info!("Replaced previously connected TTC handler");
    }
    pwm.enable_cycle_interrupt();
    critical_section::with(|cs| PWM.borrow(cs).replace(Some(pwm)));
    gic.enable_spi_interrupt(SpiInterrupt::Ttc00);
    // Safety: Not called inside a critical section.
    unsafe { gic.enable_interrupts() };

    info!("{:<20}{}", "Silicon Rev", dbg::ps7::ps_version());
    info!("{:<20}0x{:02x}", "Manufacturer ID", dbg::ps7::mfr_id());
    info!("{:<20}0x{:02x}", "Device Code", dbg::ps7::device_code());
    let dumped = dbg::ttc::print_ier_status(0, 0).and_then(|_| dbg::ttc::print_summary(0, 0));
    if let Err(e) = dumped {
        error!("{e}");
    }

    info!("Starting");
    critical_section::with(|cs| {
        if let Some(pwm) = PWM.borrow(cs).borrow_mut().as_mut() {
            pwm.ttc_channel_mut().reset_counter();
            pwm.ttc_channel_mut().start();
        }
    });
    loop {
        delay.delay_ms(REPORT_INTERVAL_MS);
        info!("PWM cycles: {}", CYCLES.load(Ordering::Relaxed));
    }
}

zynq7000_bsp_demos::exception_handlers!();
