//! # Custom four register AXI4-Lite peripheral in the programmable logic
//!
//! The peripheral implements a small calculator: the operands are written to register 1 and
//! register 2, a command to register 0, and the result can be read from register 3.
use core::fmt;

use crate::{
    VerifyError,
    dbg::{read_reg, write_reg},
};

pub const AXI_PERIPH_BASE_ADDR: usize = 0x43C1_0000;
pub const NUM_REGS: usize = 4;

/// Multiplier of the register index used for the self test patterns.
const SELF_TEST_FACTOR: u32 = 0x10;

const REG_NAMES: [&str; NUM_REGS] = ["AXI reg0", "AXI reg1", "AXI reg2", "AXI reg3"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[repr(u32)]
pub enum TaylorCommand {
    Add = 1,
    Sub = 2,
    Mult = 3,
}

impl TaylorCommand {
    /// Result the peripheral is expected to produce.
    pub const fn expected(&self, a: u32, b: u32) -> u32 {
        match self {
            TaylorCommand::Add => a.wrapping_add(b),
            TaylorCommand::Sub => a.wrapping_sub(b),
            TaylorCommand::Mult => a.wrapping_mul(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid calculator command {0:#x}")]
pub struct InvalidCommand(pub u32);

pub fn parse_command(raw: u32) -> Result<TaylorCommand, InvalidCommand> {
    TaylorCommand::try_from(raw).map_err(|_| InvalidCommand(raw))
}

/// One register of the register dump.
pub struct RegisterLine {
    pub addr: usize,
    pub value: u32,
}

impl fmt::Display for RegisterLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr: {:#010x} Data: {:#010x}", self.addr, self.value)
    }
}

pub struct TaylorPeripheral {
    base: usize,
}

impl TaylorPeripheral {
    /// Create a driver for the peripheral at [AXI_PERIPH_BASE_ADDR].
    ///
    /// # Safety
    ///
    /// The bitstream containing the peripheral must be loaded and the level shifters must be
    /// enabled. Accesses to an unmapped PL address can stall the bus.
    pub const unsafe fn new() -> Self {
        unsafe { Self::new_at(AXI_PERIPH_BASE_ADDR) }
    }

    /// Create a driver for the peripheral at a custom base address.
    ///
    /// # Safety
    ///
    /// See [Self::new].
    pub const unsafe fn new_at(base: usize) -> Self {
        Self { base }
    }

    #[inline]
    pub fn base_addr(&self) -> usize {
        self.base
    }

    /// # Panics
    ///
    /// Panics if the index is larger than 3.
    #[inline]
    pub fn read(&self, idx: usize) -> u32 {
        assert!(idx < NUM_REGS);
        read_reg(self.base + idx * 4)
    }

    /// # Panics
    ///
    /// Panics if the index is larger than 3.
    #[inline]
    pub fn write(&mut self, idx: usize, value: u32) {
        assert!(idx < NUM_REGS);
        write_reg(self.base + idx * 4, value);
    }

    pub fn set_operands(&mut self, a: u32, b: u32) {
        self.write(1, a);
        self.write(2, b);
    }

    pub fn execute(&mut self, cmd: TaylorCommand) -> u32 {
        self.write(0, cmd as u32);
        self.result()
    }

    /// Write a raw command. Values other than the [TaylorCommand]s are ignored by the hardware.
    pub fn execute_raw(&mut self, cmd: u32) -> u32 {
        self.write(0, cmd);
        self.result()
    }

    #[inline]
    pub fn result(&self) -> u32 {
        self.read(3)
    }

    /// Writes a distinct pattern to each register and reads it back.
    pub fn self_test(&mut self) -> Result<(), VerifyError> {
        for idx in 0..NUM_REGS {
            self.write(idx, (idx as u32 + 1) * SELF_TEST_FACTOR);
        }
        for (idx, name) in REG_NAMES.iter().enumerate() {
            let expected = (idx as u32 + 1) * SELF_TEST_FACTOR;
            let received = self.read(idx);
            if received != expected {
                return Err(VerifyError {
                    register: *name,
                    expected,
                    received,
                });
            }
        }
        Ok(())
    }

    pub fn lines(&self) -> impl Iterator<Item = RegisterLine> + '_ {
        (0..NUM_REGS).map(|idx| RegisterLine {
            addr: self.base + idx * 4,
            value: self.read(idx),
        })
    }

    /// Log all four registers.
    pub fn dump(&self) {
        for line in self.lines() {
            log::info!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn command_parsing() {
        assert_eq!(parse_command(1), Ok(TaylorCommand::Add));
        assert_eq!(parse_command(2), Ok(TaylorCommand::Sub));
        assert_eq!(parse_command(3), Ok(TaylorCommand::Mult));
        assert_eq!(parse_command(0), Err(InvalidCommand(0)));
        assert_eq!(parse_command(0xDEAD_BEE0), Err(InvalidCommand(0xDEAD_BEE0)));
    }

    #[test]
    fn expected_results() {
        assert_eq!(TaylorCommand::Add.expected(0x314, 0x1420), 0x1734);
        assert_eq!(TaylorCommand::Sub.expected(0x314, 0x1420), 0xFFFF_EEF4);
        assert_eq!(TaylorCommand::Mult.expected(0x314, 0x1420), 0x003D_F280);
    }

    #[test]
    fn register_line() {
        let mut out = heapless::String::<64>::new();
        write!(
            out,
            "{}",
            RegisterLine {
                addr: AXI_PERIPH_BASE_ADDR + 4,
                value: 0x314
            }
        )
        .unwrap();
        assert_eq!(out.as_str(), "Addr: 0x43c10004 Data: 0x00000314");
    }
}
