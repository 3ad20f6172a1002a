//! Console report formatting shared by the demonstration programs.
//!
//! All items implement [core::fmt::Display] so they can be logged with the [log] macros or
//! written into any [core::fmt::Write] sink.
use core::fmt;

use crate::VerifyError;

/// Clear screen escape sequence for the serial terminal.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

#[inline]
pub const fn result(ok: bool) -> &'static str {
    if ok { "OK" } else { "FAIL" }
}

/// One line with the operation name in a 50 character column and the result right aligned in a
/// 10 character column.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub name: &'a str,
    pub ok: bool,
}

impl fmt::Display for Operation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<50}{:>10}", self.name, result(self.ok))
    }
}

/// Log the outcome of an operation. Failures are logged with the error level.
pub fn operation(name: &str, ok: bool) {
    let op = Operation { name, ok };
    if ok {
        log::info!("{op}");
    } else {
        log::error!("{op}");
    }
}

/// Log the outcome of a fallible operation and pass the result on.
pub fn check<T, E: fmt::Display>(name: &str, res: Result<T, E>) -> Result<T, E> {
    operation(name, res.is_ok());
    if let Err(e) = &res {
        log::error!("{e}");
    }
    res
}

/// Register value with a 20 character label column.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub label: &'a str,
    pub value: u32,
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<20}0x{:08x}", self.label, self.value)
    }
}

pub fn field(label: &str, value: u32) {
    log::info!("{}", Field { label, value });
}

/// Expected and received value of a register which did not read back correctly.
#[derive(Debug, Clone, Copy)]
pub struct Mismatch<'a> {
    pub what: &'a str,
    pub expected: u32,
    pub received: u32,
}

impl fmt::Display for Mismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:\t\tExpected: 0x{:08x}\tReceived: 0x{:08x}",
            self.what, self.expected, self.received
        )
    }
}

impl<'a> From<&'a VerifyError> for Mismatch<'a> {
    fn from(value: &'a VerifyError) -> Self {
        Self {
            what: value.register,
            expected: value.expected,
            received: value.received,
        }
    }
}

pub fn mismatch(what: &str, expected: u32, received: u32) {
    log::error!(
        "{}",
        Mismatch {
            what,
            expected,
            received
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn operation_columns() {
        let mut out = heapless::String::<64>::new();
        write!(
            out,
            "{}",
            Operation {
                name: "Initializing GIC",
                ok: true
            }
        )
        .unwrap();
        assert_eq!(out.len(), 60);
        assert!(out.starts_with("Initializing GIC "));
        assert!(out.ends_with("        OK"));

        out.clear();
        write!(
            out,
            "{}",
            Operation {
                name: "Self test",
                ok: false
            }
        )
        .unwrap();
        assert!(out.ends_with("      FAIL"));
    }

    #[test]
    fn field_layout() {
        let mut out = heapless::String::<64>::new();
        write!(
            out,
            "{}",
            Field {
                label: "Device Code:",
                value: 0x07
            }
        )
        .unwrap();
        assert_eq!(out.as_str(), "Device Code:        0x00000007");
    }

    #[test]
    fn mismatch_from_verify_error() {
        let err = VerifyError {
            register: "Interval",
            expected: 0xD903,
            received: 0,
        };
        let mut out = heapless::String::<96>::new();
        write!(out, "{}", Mismatch::from(&err)).unwrap();
        assert_eq!(
            out.as_str(),
            "Interval:\t\tExpected: 0x0000d903\tReceived: 0x00000000"
        );
    }
}
