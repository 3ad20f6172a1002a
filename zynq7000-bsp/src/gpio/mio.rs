//! Multiplexed I/O (MIO) module.
//!
//! Every MIO pin is represented by its own zero-sized type so a pin can only be handed to one
//! driver. The [Pins] structure is the singleton holding all of them.
use arbitrary_int::{u2, u3};
use zynq7000::gpio::MmioGpio;

/// Routing of a MIO pin, the four multiplexer levels of the SLCR MIO pin register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MuxConfig {
    l3: u3,
    l2: u2,
    l1: bool,
    l0: bool,
}

impl From<zynq7000::slcr::mio::Config> for MuxConfig {
    fn from(value: zynq7000::slcr::mio::Config) -> Self {
        Self::new(
            value.l0_sel(),
            value.l1_sel(),
            value.l2_sel(),
            value.l3_sel(),
        )
    }
}

impl MuxConfig {
    #[inline]
    pub const fn new(l0: bool, l1: bool, l2: u2, l3: u3) -> Self {
        Self { l3, l2, l1, l0 }
    }

    #[inline]
    pub const fn new_with_l3(l3: u3) -> Self {
        Self::new(false, false, u2::new(0b00), l3)
    }

    /// All levels zero routes the pin to the GPIO controller.
    #[inline]
    pub const fn new_for_gpio() -> Self {
        Self::new(false, false, u2::new(0), u3::new(0))
    }

    #[inline]
    pub const fn l0_sel(&self) -> bool {
        self.l0
    }

    #[inline]
    pub const fn l1_sel(&self) -> bool {
        self.l1
    }

    #[inline]
    pub const fn l2_sel(&self) -> u2 {
        self.l2
    }

    #[inline]
    pub const fn l3_sel(&self) -> u3 {
        self.l3
    }
}

pub trait PinId: crate::sealed::Sealed {
    const OFFSET: usize;
}

/// Implemented by all typed MIO pins.
pub trait MioPinMarker: crate::sealed::Sealed {
    fn offset(&self) -> usize;
}

pub struct Pin<I: PinId> {
    phantom: core::marker::PhantomData<I>,
}

impl<I: PinId> Pin<I> {
    #[inline]
    const unsafe fn new() -> Self {
        Self {
            phantom: core::marker::PhantomData,
        }
    }

    /// Steal a typed MIO pin without any re-configuration.
    ///
    /// # Safety
    ///
    /// This allows to create multiple instances of the same pin, which can lead to
    /// data races on concurrent access.
    #[inline]
    pub const unsafe fn steal() -> Self {
        unsafe { Self::new() }
    }
}

impl<I: PinId> MioPinMarker for Pin<I> {
    #[inline]
    fn offset(&self) -> usize {
        I::OFFSET
    }
}

impl<I: PinId> crate::sealed::Sealed for Pin<I> {}

/// Declares the pin ID types together with the [Pins] singleton. Pins which are not bonded out
/// on the CLG225 package are gated with the `7z010-7z007s-clg225` feature.
macro_rules! mio_pins {
    ($( $(#[$meta:meta])? ($Id:ident, $field:ident, $num:literal) ),+ $(,)?) => {
        $(
            paste::paste! {
                #[doc = "Pin ID representing MIO pin " $num]
                $(#[$meta])?
                #[derive(Debug)]
                pub enum $Id {}
            }
            $(#[$meta])?
            impl crate::sealed::Sealed for $Id {}
            $(#[$meta])?
            impl PinId for $Id {
                const OFFSET: usize = $num;
            }
        )+

        pub struct Pins {
            $(
                $(#[$meta])?
                pub $field: Pin<$Id>,
            )+
        }

        impl Pins {
            /// Create the MIO pin singleton. The GPIO register block is consumed to make sure
            /// this happens only once.
            pub const fn new(_mmio: MmioGpio<'static>) -> Self {
                Self {
                    $(
                        $(#[$meta])?
                        $field: unsafe { Pin::new() },
                    )+
                }
            }
        }
    };
}

mio_pins!(
    (Mio0, mio0, 0),
    (Mio1, mio1, 1),
    (Mio2, mio2, 2),
    (Mio3, mio3, 3),
    (Mio4, mio4, 4),
    (Mio5, mio5, 5),
    (Mio6, mio6, 6),
    (Mio7, mio7, 7),
    (Mio8, mio8, 8),
    (Mio9, mio9, 9),
    (Mio10, mio10, 10),
    (Mio11, mio11, 11),
    (Mio12, mio12, 12),
    (Mio13, mio13, 13),
    (Mio14, mio14, 14),
    (Mio15, mio15, 15),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio16, mio16, 16),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio17, mio17, 17),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio18, mio18, 18),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio19, mio19, 19),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio20, mio20, 20),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio21, mio21, 21),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio22, mio22, 22),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio23, mio23, 23),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio24, mio24, 24),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio25, mio25, 25),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio26, mio26, 26),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio27, mio27, 27),
    (Mio28, mio28, 28),
    (Mio29, mio29, 29),
    (Mio30, mio30, 30),
    (Mio31, mio31, 31),
    (Mio32, mio32, 32),
    (Mio33, mio33, 33),
    (Mio34, mio34, 34),
    (Mio35, mio35, 35),
    (Mio36, mio36, 36),
    (Mio37, mio37, 37),
    (Mio38, mio38, 38),
    (Mio39, mio39, 39),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio40, mio40, 40),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio41, mio41, 41),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio42, mio42, 42),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio43, mio43, 43),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio44, mio44, 44),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio45, mio45, 45),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio46, mio46, 46),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio47, mio47, 47),
    (Mio48, mio48, 48),
    (Mio49, mio49, 49),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio50, mio50, 50),
    #[cfg(not(feature = "7z010-7z007s-clg225"))]
    (Mio51, mio51, 51),
    (Mio52, mio52, 52),
    (Mio53, mio53, 53),
);
