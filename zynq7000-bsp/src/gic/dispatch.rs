//! Interrupt handler table.
//!
//! Handlers are plain function pointers indexed by the raw interrupt ID. Registering a handler
//! for an ID which already has one replaces the previous handler.
use core::cell::RefCell;

use critical_section::Mutex;

use super::NUM_INTERRUPTS;

pub type Handler = fn();

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid interrupt ID {0}")]
pub struct InvalidInterruptId(pub usize);

static HANDLERS: Mutex<RefCell<[Option<Handler>; NUM_INTERRUPTS]>> =
    Mutex::new(RefCell::new([None; NUM_INTERRUPTS]));

/// Register a handler for the given interrupt ID. Returns the handler which was replaced.
pub fn connect(id: usize, handler: Handler) -> Result<Option<Handler>, InvalidInterruptId> {
    if id >= NUM_INTERRUPTS {
        return Err(InvalidInterruptId(id));
    }
    Ok(critical_section::with(|cs| {
        HANDLERS.borrow(cs).borrow_mut()[id].replace(handler)
    }))
}

/// Remove the handler for the given interrupt ID.
pub fn disconnect(id: usize) -> Result<Option<Handler>, InvalidInterruptId> {
    if id >= NUM_INTERRUPTS {
        return Err(InvalidInterruptId(id));
    }
    Ok(critical_section::with(|cs| {
        HANDLERS.borrow(cs).borrow_mut()[id].take()
    }))
}

pub fn is_connected(id: usize) -> bool {
    id < NUM_INTERRUPTS && critical_section::with(|cs| HANDLERS.borrow(cs).borrow()[id].is_some())
}

/// Run the handler registered for the given ID. Returns false if there is none.
///
/// The handler is called outside of the critical section.
pub fn dispatch(id: usize) -> bool {
    if id >= NUM_INTERRUPTS {
        return false;
    }
    let handler = critical_section::with(|cs| HANDLERS.borrow(cs).borrow()[id]);
    match handler {
        Some(handler) => {
            handler();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    static FIRST_CALLS: AtomicU32 = AtomicU32::new(0);
    static SECOND_CALLS: AtomicU32 = AtomicU32::new(0);

    fn first() {
        FIRST_CALLS.fetch_add(1, Ordering::Relaxed);
    }

    fn second() {
        SECOND_CALLS.fetch_add(1, Ordering::Relaxed);
    }

    // All table manipulation happens in a single test because the table is global.
    #[test]
    fn connect_replace_and_disconnect() {
        let id = 61;
        assert!(!dispatch(id));
        assert_eq!(connect(id, first), Ok(None));
        assert!(is_connected(id));
        assert!(dispatch(id));
        assert_eq!(FIRST_CALLS.load(Ordering::Relaxed), 1);

        let previous = connect(id, second).unwrap();
        assert!(previous.is_some());
        assert!(dispatch(id));
        assert_eq!(FIRST_CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(SECOND_CALLS.load(Ordering::Relaxed), 1);

        assert!(disconnect(id).unwrap().is_some());
        assert!(!is_connected(id));
        assert!(!dispatch(id));
        assert_eq!(SECOND_CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(disconnect(id), Ok(None));
    }

    #[test]
    fn out_of_range_ids() {
        assert_eq!(connect(96, first), Err(InvalidInterruptId(96)));
        assert_eq!(disconnect(200), Err(InvalidInterruptId(200)));
        assert!(!is_connected(96));
        assert!(!dispatch(1023));
    }
}
