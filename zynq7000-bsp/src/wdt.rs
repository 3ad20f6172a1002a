//! # CPU private watchdog driver
//!
//! The watchdog is a 32 bit down counter clocked by `CPU_3x2x / (prescaler + 1)`. In timer mode
//! it behaves like the private timer. In watchdog mode, the core reset request is asserted when
//! the counter reaches zero and the reset flag is set, which survives the reset.
//!
//! Watchdog mode can only be left again by writing [DISABLE_SEQUENCE] to the disable register.
use core::sync::atomic::{AtomicBool, Ordering};

use zynq7000::priv_wdt::{
    Control, CpuPrivateWatchdog, DISABLE_SEQUENCE, InterruptStatus, MmioCpuPrivateWatchdog,
    ResetStatus,
};

pub use zynq7000::priv_wdt::WdtMode;

use fugit::{HertzU32 as Hertz, MillisDurationU32 as Milliseconds};

use crate::{VerifyError, clocks::ArmClocks};

static WDT_TAKEN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timeout requires {0} ticks, which does not fit the load register")]
pub struct TimeoutTooLong(pub u64);

/// Number of load register ticks for the given timeout.
pub fn ticks_for_timeout(
    cpu_3x2x_clk: Hertz,
    prescaler: u8,
    timeout: Milliseconds,
) -> Result<u32, TimeoutTooLong> {
    let wdt_clk = cpu_3x2x_clk.raw() as u64 / (prescaler as u64 + 1);
    let ticks = wdt_clk * timeout.to_millis() as u64 / 1000;
    u32::try_from(ticks).map_err(|_| TimeoutTooLong(ticks))
}

/// Whether a down counter value lies within `margin_ticks` of zero. Zero itself is inside the
/// margin.
#[inline]
pub const fn within_margin(counter: u32, margin_ticks: u32) -> bool {
    counter <= margin_ticks
}

pub struct Watchdog {
    regs: MmioCpuPrivateWatchdog<'static>,
    cpu_3x2x_clk: Hertz,
}

impl Watchdog {
    /// Take the private watchdog. Returns [None] if it was already taken.
    pub fn take(regs: MmioCpuPrivateWatchdog<'static>, clocks: &ArmClocks) -> Option<Self> {
        if WDT_TAKEN.swap(true, Ordering::Relaxed) {
            return None;
        }
        Some(Self {
            regs,
            cpu_3x2x_clk: clocks.cpu_3x2x_clk(),
        })
    }

    /// Create a watchdog driver without ownership checks.
    ///
    /// # Safety
    ///
    /// Allows multiple drivers for the same register block.
    pub unsafe fn steal(clocks: &ArmClocks) -> Self {
        Self {
            regs: unsafe { CpuPrivateWatchdog::new_mmio_fixed() },
            cpu_3x2x_clk: clocks.cpu_3x2x_clk(),
        }
    }

    #[inline]
    pub fn regs(&mut self) -> &mut MmioCpuPrivateWatchdog<'static> {
        &mut self.regs
    }

    /// Switching from watchdog to timer mode is only possible with
    /// [Self::disable_watchdog_mode]. Requesting timer mode while in watchdog mode executes the
    /// disable sequence.
    pub fn set_mode(&mut self, mode: WdtMode) {
        match mode {
            WdtMode::Watchdog => self.regs.modify_control(|mut val| {
                val.set_mode(WdtMode::Watchdog);
                val
            }),
            WdtMode::Timer => {
                if self.is_watchdog_mode() {
                    self.disable_watchdog_mode();
                }
            }
        }
    }

    #[inline]
    pub fn is_watchdog_mode(&mut self) -> bool {
        self.regs.read_control().mode() == WdtMode::Watchdog
    }

    /// Write the disable sequence, which returns the watchdog to timer mode.
    pub fn disable_watchdog_mode(&mut self) {
        for word in DISABLE_SEQUENCE {
            self.regs.write_disable(word);
        }
    }

    pub fn set_prescaler(&mut self, prescaler: u8) {
        self.regs.modify_control(|mut val| {
            val.set_prescaler(prescaler);
            val
        });
    }

    #[inline]
    pub fn prescaler(&mut self) -> u8 {
        self.regs.read_control().prescaler()
    }

    /// Counter clock with the current prescaler.
    pub fn counter_clock(&mut self) -> Hertz {
        self.cpu_3x2x_clk / (self.prescaler() as u32 + 1)
    }

    /// Write the load register, which also reloads the counter.
    #[inline]
    pub fn load(&mut self, ticks: u32) {
        self.regs.write_load(ticks);
    }

    /// Load the watchdog with the given timeout.
    pub fn load_timeout(&mut self, timeout: Milliseconds) -> Result<u32, TimeoutTooLong> {
        let ticks = ticks_for_timeout(self.cpu_3x2x_clk, self.prescaler(), timeout)?;
        self.load(ticks);
        Ok(ticks)
    }

    #[inline]
    pub fn load_value(&mut self) -> u32 {
        self.regs.read_load()
    }

    /// Restart the watchdog by writing the current load value back to the load register.
    #[inline]
    pub fn restart(&mut self) {
        let load = self.regs.read_load();
        self.regs.write_load(load);
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
    pub fn counter(&mut self) -> u32 {
        self.regs.read_counter()
    }

    #[inline]
    pub fn control(&mut self) -> Control {
        self.regs.read_control()
    }

    pub fn enable_interrupt(&mut self) {
        self.regs.modify_control(|mut val| {
            val.set_interrupt_enable(true);
            val
        });
    }

    #[inline]
    pub fn interrupt_flag(&mut self) -> bool {
        self.regs.read_interrupt_status().event_flag()
    }

    #[inline]
    pub fn clear_interrupt_flag(&mut self) {
        self.regs
            .write_interrupt_status(InterruptStatus::builder().with_event_flag(true).build());
    }

    /// The last reset was caused by this watchdog.
    #[inline]
    pub fn reset_occurred(&mut self) -> bool {
        self.regs.read_reset_status().reset_flag()
    }

    #[inline]
    pub fn clear_reset_status(&mut self) {
        self.regs
            .write_reset_status(ResetStatus::builder().with_reset_flag(true).build());
    }

    /// Checks the load register read-back with the counter stopped. The previous load value
    /// and running state are restored.
    pub fn self_test(&mut self) -> Result<(), VerifyError> {
        const TEST_VALUE: u32 = 0x5A5A_A5A5;
        let was_started = self.is_started();
        self.stop();
        let saved = self.load_value();
        self.load(TEST_VALUE);
        let received = self.load_value();
        self.load(saved);
        if was_started {
            self.start();
        }
        if received != TEST_VALUE {
            return Err(VerifyError {
                register: "watchdog load",
                expected: TEST_VALUE,
                received,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_ticks() {
        let clk = Hertz::from_raw(333_333_330);
        assert_eq!(ticks_for_timeout(clk, 0, Milliseconds::from_ticks(3000)), Ok(999_999_990));
        assert_eq!(ticks_for_timeout(clk, 255, Milliseconds::from_ticks(3000)), Ok(3_906_249));
        assert_eq!(ticks_for_timeout(clk, 9, Milliseconds::from_ticks(1)), Ok(33_333));
    }

    #[test]
    fn timeout_too_long() {
        let clk = Hertz::from_raw(333_333_330);
        assert_eq!(
            ticks_for_timeout(clk, 0, Milliseconds::from_ticks(20_000)),
            Err(TimeoutTooLong(6_666_666_600))
        );
    }

    #[test]
    fn expiry_margin() {
        let clk = Hertz::from_raw(333_333_330);
        let margin = ticks_for_timeout(clk, 0, Milliseconds::from_ticks(50)).unwrap();
        assert_eq!(margin, 16_666_666);
        assert!(within_margin(0, margin));
        assert!(within_margin(margin, margin));
        assert!(!within_margin(margin + 1, margin));
        // A counter sampled one 10 ms poll period before expiry is still caught.
        let poll = ticks_for_timeout(clk, 0, Milliseconds::from_ticks(10)).unwrap();
        assert!(within_margin(poll, margin));
    }
}
