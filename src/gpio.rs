//! General Purpose Input / Output
use core::marker::PhantomData;

use crate::rcc::Rcc;

/// Default pin mode
///
/// Every F1 pin resets to floating input.
pub type DefaultMode = Input<Floating>;

/// Extension trait to split a GPIO peripheral in independent pins and registers
pub trait GpioExt {
    /// The parts to split the GPIO into
    type Parts;

    /// Splits the GPIO block into independent pins and registers
    ///
    /// Enables the port clock on APB2 first, so the pins are safe to
    /// configure as soon as this returns.
    fn split(self, rcc: &mut Rcc) -> Self::Parts;
}

/// Input mode (type state)
pub struct Input<MODE> {
    _mode: PhantomData<MODE>,
}

/// Floating input (type state)
pub struct Floating;

/// Pulled down input (type state)
pub struct PullDown;

/// Pulled up input (type state)
pub struct PullUp;

/// Open drain output (type state)
pub struct OpenDrain;

/// Analog mode (type state)
pub struct Analog;

/// Output mode (type state)
pub struct Output<MODE> {
    _mode: PhantomData<MODE>,
}

/// Push pull output (type state)
pub struct PushPull;

/// Output slew rate selection
///
/// On the F1 the slew rate lives in the MODE bits of the port
/// configuration register.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Mhz10 = 0b01,
    Mhz2 = 0b10,
    Mhz50 = 0b11,
}

macro_rules! gpio {
    ($GPIOX:ident, $gpiox:ident, $iopxen:ident, [
        $($PXi:ident: ($pxi:ident, $i:expr, $cr:ident),)+
    ]) => {
        /// GPIO
        pub mod $gpiox {
            use core::convert::Infallible;
            use core::marker::PhantomData;

            use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState, StatefulOutputPin};

            use crate::rcc::Rcc;
            use crate::stm32::$GPIOX;
            use super::*;

            /// GPIO parts
            pub struct Parts {
                $(
                    pub $pxi: $PXi<DefaultMode>,
                )+
            }

            impl GpioExt for $GPIOX {
                type Parts = Parts;

                fn split(self, rcc: &mut Rcc) -> Parts {
                    rcc.rb.apb2enr.modify(|_, w| w.$iopxen().set_bit());

                    Parts {
                        $(
                            $pxi: $PXi { _mode: PhantomData },
                        )+
                    }
                }
            }

            $(
                pub struct $PXi<MODE> {
                    _mode: PhantomData<MODE>,
                }

                impl<MODE> $PXi<MODE> {
                    // Each pin owns a 4 bit CNF|MODE nibble in CRL/CRH.
                    fn set_config(&mut self, config: u32) {
                        let offset = 4 * ($i % 8);
                        // NOTE(unsafe) write restricted to this pin's nibble
                        unsafe {
                            (*$GPIOX::ptr()).$cr.modify(|r, w| {
                                w.bits((r.bits() & !(0b1111 << offset)) | (config << offset))
                            })
                        };
                    }

                    /// Configures the pin to operate as a floating input pin
                    pub fn into_floating_input(mut self) -> $PXi<Input<Floating>> {
                        self.set_config(0b0100);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as a pulled up input pin
                    pub fn into_pull_up_input(mut self) -> $PXi<Input<PullUp>> {
                        // NOTE(unsafe) atomic write to a stateless register
                        unsafe { (*$GPIOX::ptr()).bsrr.write(|w| w.bits(1 << $i)) };
                        self.set_config(0b1000);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as a pulled down input pin
                    pub fn into_pull_down_input(mut self) -> $PXi<Input<PullDown>> {
                        // NOTE(unsafe) atomic write to a stateless register
                        unsafe { (*$GPIOX::ptr()).bsrr.write(|w| w.bits(1 << ($i + 16))) };
                        self.set_config(0b1000);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as an analog pin
                    pub fn into_analog(mut self) -> $PXi<Analog> {
                        self.set_config(0b0000);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as an open drain output pin
                    /// with the default 2 MHz slew rate
                    pub fn into_open_drain_output(mut self) -> $PXi<Output<OpenDrain>> {
                        self.set_config(0b0100 | Speed::Mhz2 as u32);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin to operate as a push pull output pin
                    /// with the default 2 MHz slew rate
                    pub fn into_push_pull_output(mut self) -> $PXi<Output<PushPull>> {
                        self.set_config(Speed::Mhz2 as u32);
                        $PXi { _mode: PhantomData }
                    }
                }

                impl<MODE> $PXi<Output<MODE>> {
                    /// Reprograms the output slew rate
                    pub fn set_speed(&mut self, speed: Speed) {
                        let offset = 4 * ($i % 8);
                        // NOTE(unsafe) write restricted to this pin's MODE bits
                        unsafe {
                            (*$GPIOX::ptr()).$cr.modify(|r, w| {
                                w.bits((r.bits() & !(0b11 << offset)) | ((speed as u32) << offset))
                            })
                        };
                    }

                    /// Drives the pin high
                    pub fn set_high(&mut self) {
                        // NOTE(unsafe) atomic write to a stateless register
                        unsafe { (*$GPIOX::ptr()).bsrr.write(|w| w.bits(1 << $i)) };
                    }

                    /// Drives the pin low
                    pub fn set_low(&mut self) {
                        // NOTE(unsafe) atomic write to a stateless register
                        unsafe { (*$GPIOX::ptr()).bsrr.write(|w| w.bits(1 << ($i + 16))) };
                    }

                    /// Drives the pin to the given level
                    pub fn set_state(&mut self, state: PinState) {
                        match state {
                            PinState::Low => self.set_low(),
                            PinState::High => self.set_high(),
                        }
                    }

                    pub fn is_set_high(&self) -> bool {
                        !self.is_set_low()
                    }

                    pub fn is_set_low(&self) -> bool {
                        // NOTE(unsafe) atomic read with no side effects
                        unsafe { (*$GPIOX::ptr()).odr.read().bits() & (1 << $i) == 0 }
                    }

                    /// Flips the output level
                    pub fn toggle(&mut self) {
                        if Self::is_set_low(self) {
                            self.set_high()
                        } else {
                            self.set_low()
                        }
                    }
                }

                impl<MODE> ErrorType for $PXi<Output<MODE>> {
                    type Error = Infallible;
                }

                impl<MODE> OutputPin for $PXi<Output<MODE>> {
                    fn set_high(&mut self) -> Result<(), Self::Error> {
                        $PXi::set_high(self);
                        Ok(())
                    }

                    fn set_low(&mut self) -> Result<(), Self::Error> {
                        $PXi::set_low(self);
                        Ok(())
                    }
                }

                impl<MODE> StatefulOutputPin for $PXi<Output<MODE>> {
                    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
                        Ok($PXi::is_set_high(self))
                    }

                    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
                        Ok($PXi::is_set_low(self))
                    }
                }

                impl<MODE> $PXi<Input<MODE>> {
                    pub fn is_high(&self) -> bool {
                        !self.is_low()
                    }

                    pub fn is_low(&self) -> bool {
                        // NOTE(unsafe) atomic read with no side effects
                        unsafe { (*$GPIOX::ptr()).idr.read().bits() & (1 << $i) == 0 }
                    }
                }

                impl<MODE> ErrorType for $PXi<Input<MODE>> {
                    type Error = Infallible;
                }

                impl<MODE> InputPin for $PXi<Input<MODE>> {
                    fn is_high(&mut self) -> Result<bool, Self::Error> {
                        Ok($PXi::is_high(self))
                    }

                    fn is_low(&mut self) -> Result<bool, Self::Error> {
                        Ok($PXi::is_low(self))
                    }
                }
            )+
        }
    };
}

gpio!(GPIOA, gpioa, iopaen, [
    PA0: (pa0, 0, crl),
    PA1: (pa1, 1, crl),
    PA2: (pa2, 2, crl),
    PA3: (pa3, 3, crl),
    PA4: (pa4, 4, crl),
    PA5: (pa5, 5, crl),
    PA6: (pa6, 6, crl),
    PA7: (pa7, 7, crl),
    PA8: (pa8, 8, crh),
    PA9: (pa9, 9, crh),
    PA10: (pa10, 10, crh),
    PA11: (pa11, 11, crh),
    PA12: (pa12, 12, crh),
    PA13: (pa13, 13, crh),
    PA14: (pa14, 14, crh),
    PA15: (pa15, 15, crh),
]);

gpio!(GPIOB, gpiob, iopben, [
    PB0: (pb0, 0, crl),
    PB1: (pb1, 1, crl),
    PB2: (pb2, 2, crl),
    PB3: (pb3, 3, crl),
    PB4: (pb4, 4, crl),
    PB5: (pb5, 5, crl),
    PB6: (pb6, 6, crl),
    PB7: (pb7, 7, crl),
    PB8: (pb8, 8, crh),
    PB9: (pb9, 9, crh),
    PB10: (pb10, 10, crh),
    PB11: (pb11, 11, crh),
    PB12: (pb12, 12, crh),
    PB13: (pb13, 13, crh),
    PB14: (pb14, 14, crh),
    PB15: (pb15, 15, crh),
]);

gpio!(GPIOC, gpioc, iopcen, [
    PC0: (pc0, 0, crl),
    PC1: (pc1, 1, crl),
    PC2: (pc2, 2, crl),
    PC3: (pc3, 3, crl),
    PC4: (pc4, 4, crl),
    PC5: (pc5, 5, crl),
    PC6: (pc6, 6, crl),
    PC7: (pc7, 7, crl),
    PC8: (pc8, 8, crh),
    PC9: (pc9, 9, crh),
    PC10: (pc10, 10, crh),
    PC11: (pc11, 11, crh),
    PC12: (pc12, 12, crh),
    PC13: (pc13, 13, crh),
    PC14: (pc14, 14, crh),
    PC15: (pc15, 15, crh),
]);
