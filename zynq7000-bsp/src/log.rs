//! # Blocking UART console loggers
//!
//! Both loggers print one line per record in the `"{level} - {message}"` format, terminated
//! with `"\n\r"` for serial terminals.
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

static LOGGER_INIT_DONE: AtomicBool = AtomicBool::new(false);

const LOG_SEL_LOCKED: u8 = 1;
const LOG_SEL_UNSAFE_SINGLE_CORE: u8 = 2;

static LOG_SEL: AtomicU8 = AtomicU8::new(0);

/// Flush the installed logger. Returns once the UART transmitter is idle.
pub fn flush() {
    uart_blocking::flush();
}

pub mod uart_blocking {
    use super::*;
    use core::cell::{Cell, RefCell, UnsafeCell};
    use core::fmt::Write as _;

    use cortex_ar::register::{Cpsr, cpsr::ProcessorMode};
    use critical_section::Mutex;
    use log::{LevelFilter, Log, set_logger, set_max_level};

    use crate::uart::Uart;

    fn write_record(uart: &mut Uart, record: &log::Record) {
        // The UART writer never fails.
        let _ = write!(uart, "{} - {}\n\r", record.level(), record.args());
    }

    fn drain(uart: &mut Uart) {
        let _ = nb::block!(uart.flush_tx());
    }

    pub struct UartLoggerBlocking(Mutex<RefCell<Option<Uart>>>);

    unsafe impl Send for UartLoggerBlocking {}
    unsafe impl Sync for UartLoggerBlocking {}

    static UART_LOGGER_BLOCKING: UartLoggerBlocking =
        UartLoggerBlocking(Mutex::new(RefCell::new(None)));

    /// Initialize the logger with a blocking UART instance.
    ///
    /// Every record is written inside a critical section, so interrupts are disabled while the
    /// logger is writing to the UART.
    pub fn init_with_locks(uart: Uart, level: LevelFilter) {
        if LOGGER_INIT_DONE.swap(true, Ordering::Relaxed) {
            return;
        }
        LOG_SEL.store(LOG_SEL_LOCKED, Ordering::Relaxed);
        critical_section::with(|cs| {
            UART_LOGGER_BLOCKING.0.borrow(cs).replace(Some(uart));
        });
        // Can only fail if another logger was installed, which the flag above prevents.
        let _ = set_logger(&UART_LOGGER_BLOCKING);
        set_max_level(level);
    }

    impl Log for UartLoggerBlocking {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            critical_section::with(|cs| {
                if let Some(uart) = self.0.borrow(cs).borrow_mut().as_mut() {
                    write_record(uart, record);
                }
            })
        }

        fn flush(&self) {
            critical_section::with(|cs| {
                if let Some(uart) = self.0.borrow(cs).borrow_mut().as_mut() {
                    drain(uart);
                }
            });
        }
    }

    pub struct UartLoggerUnsafeSingleThread {
        skip_in_isr: Cell<bool>,
        uart: UnsafeCell<Option<Uart>>,
    }

    unsafe impl Send for UartLoggerUnsafeSingleThread {}
    unsafe impl Sync for UartLoggerUnsafeSingleThread {}

    static UART_LOGGER_UNSAFE_SINGLE_THREAD: UartLoggerUnsafeSingleThread =
        UartLoggerUnsafeSingleThread {
            skip_in_isr: Cell::new(false),
            uart: UnsafeCell::new(None),
        };

    /// Initialize the logger with a blocking UART instance which does not use locks.
    ///
    /// # Safety
    ///
    /// Records are written WITHOUT a critical section. Output from interrupt handlers can garble
    /// the output of the main thread, which is why it can optionally be suppressed.
    pub unsafe fn init_unsafe_single_core(uart: Uart, level: LevelFilter, skip_in_isr: bool) {
        if LOGGER_INIT_DONE.swap(true, Ordering::Relaxed) {
            return;
        }
        LOG_SEL.store(LOG_SEL_UNSAFE_SINGLE_CORE, Ordering::Relaxed);
        let opt_uart = unsafe { &mut *UART_LOGGER_UNSAFE_SINGLE_THREAD.uart.get() };
        opt_uart.replace(uart);
        UART_LOGGER_UNSAFE_SINGLE_THREAD
            .skip_in_isr
            .set(skip_in_isr);
        let _ = set_logger(&UART_LOGGER_UNSAFE_SINGLE_THREAD);
        set_max_level(level);
    }

    impl Log for UartLoggerUnsafeSingleThread {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if self.skip_in_isr.get()
                && matches!(
                    Cpsr::read().mode(),
                    Ok(ProcessorMode::Fiq) | Ok(ProcessorMode::Irq)
                )
            {
                return;
            }
            if let Some(uart) = unsafe { &mut *self.uart.get() }.as_mut() {
                write_record(uart, record);
            }
        }

        fn flush(&self) {
            if let Some(uart) = unsafe { &mut *self.uart.get() }.as_mut() {
                drain(uart);
            }
        }
    }

    /// Flush the selected logger instance.
    pub fn flush() {
        match LOG_SEL.load(Ordering::Relaxed) {
            LOG_SEL_LOCKED => UART_LOGGER_BLOCKING.flush(),
            LOG_SEL_UNSAFE_SINGLE_CORE => UART_LOGGER_UNSAFE_SINGLE_THREAD.flush(),
            _ => (),
        }
    }
}
