use crate::time::Hertz;

/// Bus clock prescaler
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prescaler {
    NotDivided,
    Div2,
    Div4,
    Div8,
    Div16,
    Div64,
    Div128,
    Div256,
    Div512,
}

/// System clock mux source
///
/// The system clock is taken from an oscillator directly; the PLL is left
/// off and every divider defaults to pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysClockSrc {
    /// Internal 8 MHz RC oscillator
    HSI,
    /// External crystal on OSC_IN/OSC_OUT
    HSE(Hertz),
    /// External clock fed into OSC_IN
    HSE_BYPASS(Hertz),
}

/// Clocks configuration
///
/// A validated value object describing the requested clock tree. It is
/// inert until passed to [`Rcc::freeze`](super::Rcc::freeze).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub(crate) sys_mux: SysClockSrc,
    pub(crate) ahb_psc: Prescaler,
    pub(crate) apb1_psc: Prescaler,
    pub(crate) apb2_psc: Prescaler,
}

impl Config {
    pub fn new(mux: SysClockSrc) -> Self {
        Config::default().clock_src(mux)
    }

    /// Internal oscillator, all dividers pass-through
    pub fn hsi() -> Self {
        Config::default()
    }

    /// External crystal, all dividers pass-through
    pub fn hse(freq: Hertz) -> Self {
        Config::default().clock_src(SysClockSrc::HSE(freq))
    }

    /// External clock on OSC_IN, all dividers pass-through
    pub fn hse_bypass(freq: Hertz) -> Self {
        Config::default().clock_src(SysClockSrc::HSE_BYPASS(freq))
    }

    pub fn clock_src(mut self, mux: SysClockSrc) -> Self {
        self.sys_mux = mux;
        self
    }

    pub fn ahb_psc(mut self, psc: Prescaler) -> Self {
        self.ahb_psc = psc;
        self
    }

    pub fn apb1_psc(mut self, psc: Prescaler) -> Self {
        self.apb1_psc = psc;
        self
    }

    pub fn apb2_psc(mut self, psc: Prescaler) -> Self {
        self.apb2_psc = psc;
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            sys_mux: SysClockSrc::HSI,
            ahb_psc: Prescaler::NotDivided,
            apb1_psc: Prescaler::NotDivided,
            apb2_psc: Prescaler::NotDivided,
        }
    }
}
