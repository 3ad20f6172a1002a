//! # CPU private timer module
//!
//! The private timer is a 32 bit down counter clocked by the CPU 3x2x clock divided by
//! `prescaler + 1`. The event flag is set when the counter reaches zero.
use core::{
    marker::PhantomData,
    sync::atomic::{AtomicBool, Ordering},
};

use fugit::HertzU32 as Hertz;
use zynq7000::priv_tim::{Control, CpuPrivateTimer as PrivTimRegisters, InterruptStatus};

use crate::{VerifyError, clocks::ArmClocks};

static TIMER_TAKEN: AtomicBool = AtomicBool::new(false);

/// High-level CPU private timer driver.
pub struct CpuPrivateTimer {
    regs: zynq7000::priv_tim::MmioCpuPrivateTimer<'static>,
    cpu_3x2x_clock: Hertz,
    // The registers are banked per core, so the driver must not be sent to the other core.
    _not_send: PhantomData<*const ()>,
}

impl CpuPrivateTimer {
    /// Take the CPU private timer. Returns [None] if it was already taken.
    pub fn take(clocks: &ArmClocks) -> Option<Self> {
        if TIMER_TAKEN.swap(true, Ordering::Relaxed) {
            return None;
        }
        Some(unsafe { Self::steal(clocks) })
    }

    /// Create a new CPU private timer driver.
    ///
    /// # Safety
    ///
    /// This function allows to potentially create an arbitrary amount of timers.
    pub unsafe fn steal(clocks: &ArmClocks) -> Self {
        Self {
            regs: unsafe { PrivTimRegisters::new_mmio_fixed() },
            cpu_3x2x_clock: clocks.cpu_3x2x_clk(),
            _not_send: PhantomData,
        }
    }

    /// Input clock of the counter with the current prescaler setting.
    pub fn counter_clock(&mut self) -> Hertz {
        let prescaler = self.regs.read_control().prescaler() as u32;
        self.cpu_3x2x_clock / (prescaler + 1)
    }

    /// Write the load register. This also updates the counter and is the value loaded by the
    /// hardware when the counter reaches zero and auto reload is enabled.
    #[inline]
    pub fn write_reload(&mut self, value: u32) {
        self.regs.write_load(value);
    }

    #[inline]
    pub fn reload(&mut self) -> u32 {
        self.regs.read_load()
    }

    #[inline]
    pub fn write_counter(&mut self, value: u32) {
        self.regs.write_counter(value);
    }

    #[inline]
    pub fn counter(&mut self) -> u32 {
        self.regs.read_counter()
    }

    pub fn set_prescaler(&mut self, prescaler: u8) {
        self.regs.modify_control(|mut val| {
            val.set_prescaler(prescaler);
            val
        });
    }

    /// Auto reload restarts the counter from the load value. Otherwise, the timer stops at zero.
    pub fn set_auto_reload(&mut self, auto_reload: bool) {
        self.regs.modify_control(|mut val| {
            val.set_auto_reload(auto_reload);
            val
        });
    }

    pub fn enable_interrupt(&mut self) {
        self.regs.modify_control(|mut val| {
            val.set_interrupt_enable(true);
            val
        });
    }

    pub fn disable_interrupt(&mut self) {
        self.regs.modify_control(|mut val| {
            val.set_interrupt_enable(false);
            val
        });
    }

    #[inline]
    pub fn start(&mut self) {
        self.regs.modify_control(|mut val| {
            val.set_enable(true);
            val
        });
    }

    #[inline]
    pub fn stop(&mut self) {
        self.regs.modify_control(|mut val| {
            val.set_enable(false);
            val
        });
    }

    #[inline]
    pub fn is_started(&mut self) -> bool {
        self.regs.read_control().enable()
    }

    #[inline]
    pub fn event_flag(&mut self) -> bool {
        self.regs.read_interrupt_status().event_flag()
    }

    /// Clear the event flag by writing 1 to it.
    #[inline]
    pub fn clear_event_flag(&mut self) {
        self.regs
            .write_interrupt_status(InterruptStatus::builder().with_event_flag(true).build());
    }

    /// The timer has expired once since the event flag was last cleared. The flag stays set
    /// until it is cleared, also in auto-reload mode where the counter is reloaded right away.
    pub fn is_expired(&mut self) -> bool {
        expired(self.regs.read_interrupt_status())
    }

    /// Configure and start the timer as a one-shot or auto-reload timer with the given number of
    /// ticks. The event flag is cleared before starting.
    pub fn start_with_ticks(&mut self, ticks: u32, auto_reload: bool) {
        self.regs.write_control(
            Control::builder()
                .with_prescaler(0)
                .with_interrupt_enable(false)
                .with_auto_reload(auto_reload)
                .with_enable(false)
                .build(),
        );
        self.clear_event_flag();
        self.write_reload(ticks);
        self.start();
    }

    /// Writes a test value to the load register with the timer stopped, reads it back and
    /// restores the previous value.
    pub fn self_test(&mut self) -> Result<(), VerifyError> {
        const TEST_VALUE: u32 = 0xA5A5_5A5A;
        let was_started = self.is_started();
        self.stop();
        let saved = self.reload();
        self.write_reload(TEST_VALUE);
        let received = self.reload();
        self.write_reload(saved);
        if was_started {
            self.start();
        }
        if received != TEST_VALUE {
            return Err(VerifyError {
                register: "private timer load",
                expected: TEST_VALUE,
                received,
            });
        }
        Ok(())
    }
}

#[inline]
const fn expired(status: InterruptStatus) -> bool {
    status.event_flag()
}

/// Number of timer ticks for the given delay in nanoseconds.
pub fn ticks_for_ns(clock: Hertz, ns: u32) -> u64 {
    // Even for a value of 1000 MHz for the clock and u32::MAX for nanoseconds, this will
    // never overflow.
    (ns as u64 * clock.raw() as u64) / 1_000_000_000
}

impl embedded_hal::delay::DelayNs for CpuPrivateTimer {
    fn delay_ns(&mut self, ns: u32) {
        let mut remaining = ticks_for_ns(self.cpu_3x2x_clock, ns);

        self.regs.write_control(
            Control::builder()
                .with_prescaler(0)
                .with_interrupt_enable(false)
                .with_auto_reload(false)
                .with_enable(false)
                .build(),
        );
        while remaining > 0 {
            let chunk = remaining.min((u32::MAX - 1) as u64) as u32;
            self.clear_event_flag();
            self.write_reload(chunk);
            self.start();
            while !self.is_expired() {}
            remaining -= chunk as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_ticks() {
        let clk = Hertz::from_raw(333_333_330);
        assert_eq!(ticks_for_ns(clk, 1_000_000), 333_333);
        assert_eq!(ticks_for_ns(clk, 0), 0);
        assert_eq!(
            ticks_for_ns(Hertz::from_raw(1_000_000_000), u32::MAX),
            u32::MAX as u64
        );
    }

    #[test]
    fn expiry_is_latched_event_flag() {
        assert!(expired(InterruptStatus::new_with_raw_value(0x1)));
        assert!(!expired(InterruptStatus::new_with_raw_value(0x0)));
    }
}
