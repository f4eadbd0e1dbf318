pub use embedded_hal::delay::DelayNs as _;
pub use embedded_hal::digital::InputPin as _;
pub use embedded_hal::digital::OutputPin as _;
pub use embedded_hal::digital::StatefulOutputPin as _;

pub use crate::gpio::GpioExt as _;
pub use crate::rcc::RccExt as _;
pub use crate::ticks::SysTickExt as _;
pub use crate::time::ExtU32 as _;
pub use crate::time::RateExtU32 as _;
