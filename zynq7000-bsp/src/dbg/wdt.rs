//! Private watchdog register dump.
use core::fmt;

use zynq7000::priv_wdt::{Control, MmioCpuPrivateWatchdog, WdtMode};

/// Snapshot of all readable watchdog registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WdtRegisters {
    pub load: u32,
    pub counter: u32,
    pub control: u32,
    pub interrupt: u32,
    pub reset: u32,
}

impl WdtRegisters {
    pub fn read(regs: &mut MmioCpuPrivateWatchdog<'static>) -> Self {
        Self {
            load: regs.read_load(),
            counter: regs.read_counter(),
            control: regs.read_control().raw_value(),
            interrupt: regs.read_interrupt_status().raw_value(),
            reset: regs.read_reset_status().raw_value(),
        }
    }
}

pub struct LoadLine(pub u32);
pub struct CounterLine(pub u32);
pub struct InterruptLine(pub u32);

impl fmt::Display for LoadLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Load Reg:\t\t\t0x{:08x}", self.0)
    }
}

impl fmt::Display for CounterLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counter Reg:\t\t\t0x{:08x}", self.0)
    }
}

impl fmt::Display for InterruptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interrupt Reg:\t\t\t0x{:08x}", self.0)
    }
}

/// Control register with its decoded fields.
pub struct ControlLine(pub u32);

impl fmt::Display for ControlLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctrl = Control::new_with_raw_value(self.0);
        write!(
            f,
            "Control Reg:\t\t\t0x{:08x} (prescaler {}, {} mode, IT enable {}, auto-reload {}, enable {})",
            self.0,
            ctrl.prescaler(),
            match ctrl.mode() {
                WdtMode::Timer => "timer",
                WdtMode::Watchdog => "watchdog",
            },
            ctrl.interrupt_enable() as u8,
            ctrl.auto_reload() as u8,
            ctrl.enable() as u8,
        )
    }
}

/// Reset status as text together with the raw register value.
pub struct ResetLine(pub u32);

impl fmt::Display for ResetLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0 & 0x1 == 1 { "RESET" } else { "CLEAR" };
        write!(f, "Reset Reg:\t\t\t{} (0x{:08x})", state, self.0)
    }
}

pub fn print_reset(regs: &mut MmioCpuPrivateWatchdog<'static>) {
    log::info!("{}", ResetLine(regs.read_reset_status().raw_value()));
}

pub fn print_control(regs: &mut MmioCpuPrivateWatchdog<'static>) {
    log::info!("{}", ControlLine(regs.read_control().raw_value()));
}

pub fn print_load(regs: &mut MmioCpuPrivateWatchdog<'static>) {
    log::info!("{}", LoadLine(regs.read_load()));
}

pub fn print_counter(regs: &mut MmioCpuPrivateWatchdog<'static>) {
    log::info!("{}", CounterLine(regs.read_counter()));
}

pub fn print_interrupt(regs: &mut MmioCpuPrivateWatchdog<'static>) {
    log::info!("{}", InterruptLine(regs.read_interrupt_status().raw_value()));
}

/// Log load, counter, control, interrupt and reset register in that order.
pub fn print_status(regs: &mut MmioCpuPrivateWatchdog<'static>) {
    let snapshot = WdtRegisters::read(regs);
    log::info!("{}", LoadLine(snapshot.load));
    log::info!("{}", CounterLine(snapshot.counter));
    log::info!("{}", ControlLine(snapshot.control));
    log::info!("{}", InterruptLine(snapshot.interrupt));
    log::info!("{}", ResetLine(snapshot.reset));
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn register_lines() {
        let mut out = heapless::String::<128>::new();
        write!(out, "{}", LoadLine(0x3B9A_C9F6)).unwrap();
        assert_eq!(out.as_str(), "Load Reg:\t\t\t0x3b9ac9f6");
        out.clear();
        write!(out, "{}", InterruptLine(1)).unwrap();
        assert_eq!(out.as_str(), "Interrupt Reg:\t\t\t0x00000001");
    }

    #[test]
    fn control_decoding() {
        let mut out = heapless::String::<128>::new();
        write!(out, "{}", ControlLine(0x0000_0909)).unwrap();
        assert_eq!(
            out.as_str(),
            "Control Reg:\t\t\t0x00000909 (prescaler 9, watchdog mode, IT enable 0, auto-reload 0, enable 1)"
        );
    }

    #[test]
    fn reset_status() {
        let mut out = heapless::String::<64>::new();
        write!(out, "{}", ResetLine(1)).unwrap();
        assert_eq!(out.as_str(), "Reset Reg:\t\t\tRESET (0x00000001)");
        out.clear();
        write!(out, "{}", ResetLine(0)).unwrap();
        assert_eq!(out.as_str(), "Reset Reg:\t\t\tCLEAR (0x00000000)");
    }
}
