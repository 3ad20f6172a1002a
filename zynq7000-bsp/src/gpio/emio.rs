//! EMIO (Extended Multiplexed I/O) pins.
//!
//! EMIO pins are wires into the programmable logic. They do not have a SLCR pin configuration,
//! so a pin is only identified by its offset.
use zynq7000::gpio::MmioGpio;

use super::ll::NUM_EMIO_PINS;

#[derive(Debug)]
pub struct EmioPin {
    offset: usize,
}

impl EmioPin {
    /// Steal an EMIO pin. Returns [None] for offsets larger than 63.
    ///
    /// # Safety
    ///
    /// This allows to create multiple instances of the same pin, which can lead to
    /// data races on concurrent access.
    pub unsafe fn steal(offset: usize) -> Option<Self> {
        if offset >= NUM_EMIO_PINS {
            return None;
        }
        Some(Self { offset })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

pub struct Pins {
    emios: [Option<EmioPin>; NUM_EMIO_PINS],
}

impl Pins {
    /// All EMIO pins are configured as inputs.
    pub fn new(mut mmio: MmioGpio<'static>) -> Self {
        mmio.bank(2).write_dirm(0);
        mmio.bank(3).write_dirm(0);
        Self {
            emios: core::array::from_fn(|offset| Some(EmioPin { offset })),
        }
    }

    /// Returns [None] if the pin was already taken or the offset is invalid.
    pub fn take(&mut self, offset: usize) -> Option<EmioPin> {
        self.emios.get_mut(offset)?.take()
    }

    pub fn give(&mut self, emio: EmioPin) {
        let offset = emio.offset;
        self.emios[offset] = Some(emio);
    }
}
