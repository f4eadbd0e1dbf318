//! Reset and clock control
use crate::stm32::{FLASH, RCC};
use crate::time::Hertz;

mod config;

pub use config::*;

/// HSI speed
pub const HSI_FREQ: u32 = 8_000_000;

/// APB1 ceiling
const APB1_MAX_FREQ: u32 = 36_000_000;

/// Spins granted to the hardware to acknowledge a requested state
const READY_SPINS: u32 = 100_000;

/// Clock configuration failure
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested configuration is out of range for this part
    InvalidConfig,
    /// The selected oscillator never reported ready
    OscillatorNotReady,
    /// The system clock mux did not switch to the requested source
    SwitchTimeout,
}

/// Clock frequencies
#[derive(Debug, Clone, Copy)]
pub struct Clocks {
    /// System frequency
    pub sys_clk: Hertz,
    /// AHB frequency
    pub ahb_clk: Hertz,
    /// APB1 frequency
    pub apb1_clk: Hertz,
    /// APB2 frequency
    pub apb2_clk: Hertz,
}

impl Default for Clocks {
    /// Reset state: HSI feeding every bus undivided
    fn default() -> Clocks {
        Clocks {
            sys_clk: Hertz::from_raw(HSI_FREQ),
            ahb_clk: Hertz::from_raw(HSI_FREQ),
            apb1_clk: Hertz::from_raw(HSI_FREQ),
            apb2_clk: Hertz::from_raw(HSI_FREQ),
        }
    }
}

/// Register values and frequencies derived from a `Config`
#[derive(Debug)]
struct Settings {
    clocks: Clocks,
    sw_bits: u8,
    hpre_bits: u8,
    ppre1_bits: u8,
    ppre2_bits: u8,
    latency: u8,
}

fn ahb_prescale(psc: Prescaler) -> (u32, u8) {
    match psc {
        Prescaler::Div2 => (2, 0b1000),
        Prescaler::Div4 => (4, 0b1001),
        Prescaler::Div8 => (8, 0b1010),
        Prescaler::Div16 => (16, 0b1011),
        Prescaler::Div64 => (64, 0b1100),
        Prescaler::Div128 => (128, 0b1101),
        Prescaler::Div256 => (256, 0b1110),
        Prescaler::Div512 => (512, 0b1111),
        _ => (1, 0b0000),
    }
}

fn apb_prescale(psc: Prescaler) -> (u32, u8) {
    match psc {
        Prescaler::Div2 => (2, 0b100),
        Prescaler::Div4 => (4, 0b101),
        Prescaler::Div8 => (8, 0b110),
        Prescaler::Div16 => (16, 0b111),
        _ => (1, 0b000),
    }
}

fn flash_latency(sys_clk: u32) -> u8 {
    if sys_clk <= 24_000_000 {
        0b000
    } else if sys_clk <= 48_000_000 {
        0b001
    } else {
        0b010
    }
}

fn settings(cfg: &Config) -> Result<Settings, Error> {
    let (sys_clk, sw_bits) = match cfg.sys_mux {
        SysClockSrc::HSI => (HSI_FREQ, 0b00),
        // 4..16 MHz crystal range of the F103
        SysClockSrc::HSE(freq) => {
            if freq.raw() < 4_000_000 || freq.raw() > 16_000_000 {
                return Err(Error::InvalidConfig);
            }
            (freq.raw(), 0b01)
        }
        SysClockSrc::HSE_BYPASS(freq) => {
            if freq.raw() < 1_000_000 || freq.raw() > 25_000_000 {
                return Err(Error::InvalidConfig);
            }
            (freq.raw(), 0b01)
        }
    };

    let (ahb_div, hpre_bits) = ahb_prescale(cfg.ahb_psc);
    let (apb1_div, ppre1_bits) = apb_prescale(cfg.apb1_psc);
    let (apb2_div, ppre2_bits) = apb_prescale(cfg.apb2_psc);

    let ahb_clk = sys_clk / ahb_div;
    let apb1_clk = ahb_clk / apb1_div;
    let apb2_clk = ahb_clk / apb2_div;

    if apb1_clk > APB1_MAX_FREQ {
        return Err(Error::InvalidConfig);
    }

    Ok(Settings {
        clocks: Clocks {
            sys_clk: Hertz::from_raw(sys_clk),
            ahb_clk: Hertz::from_raw(ahb_clk),
            apb1_clk: Hertz::from_raw(apb1_clk),
            apb2_clk: Hertz::from_raw(apb2_clk),
        },
        sw_bits,
        hpre_bits,
        ppre1_bits,
        ppre2_bits,
        latency: flash_latency(sys_clk),
    })
}

/// Constrained RCC peripheral
pub struct Rcc {
    /// Frozen clock frequencies
    pub clocks: Clocks,
    pub(crate) rb: RCC,
}

impl core::ops::Deref for Rcc {
    type Target = RCC;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.rb
    }
}

impl Rcc {
    /// Applies the clock configuration
    ///
    /// Programs the oscillator, flash wait states and bus prescalers, then
    /// waits for the hardware to acknowledge each step. Fails instead of
    /// spinning forever when an acknowledgement never arrives.
    pub fn freeze(self, rcc_cfg: Config) -> Result<Rcc, Error> {
        let s = settings(&rcc_cfg)?;

        match rcc_cfg.sys_mux {
            SysClockSrc::HSI => self.enable_hsi()?,
            SysClockSrc::HSE(_) => self.enable_hse(false)?,
            SysClockSrc::HSE_BYPASS(_) => self.enable_hse(true)?,
        }

        unsafe {
            let flash = &(*FLASH::ptr());
            flash.acr.modify(|_, w| w.latency().bits(s.latency));
        }

        self.cfgr.modify(|_, w| unsafe {
            w.hpre()
                .bits(s.hpre_bits)
                .ppre1()
                .bits(s.ppre1_bits)
                .ppre2()
                .bits(s.ppre2_bits)
                .sw()
                .bits(s.sw_bits)
        });

        if !spin_until(|| self.cfgr.read().sws().bits() == s.sw_bits) {
            return Err(Error::SwitchTimeout);
        }

        Ok(Rcc {
            rb: self.rb,
            clocks: s.clocks,
        })
    }

    fn enable_hsi(&self) -> Result<(), Error> {
        // Default calibration trim, midpoint of the 5 bit range
        self.cr
            .modify(|_, w| unsafe { w.hsion().set_bit().hsitrim().bits(16) });
        if spin_until(|| self.cr.read().hsirdy().bit_is_set()) {
            Ok(())
        } else {
            Err(Error::OscillatorNotReady)
        }
    }

    fn enable_hse(&self, bypass: bool) -> Result<(), Error> {
        self.cr
            .modify(|_, w| w.hseon().set_bit().hsebyp().bit(bypass));
        if spin_until(|| self.cr.read().hserdy().bit_is_set()) {
            Ok(())
        } else {
            Err(Error::OscillatorNotReady)
        }
    }
}

fn spin_until(mut ready: impl FnMut() -> bool) -> bool {
    for _ in 0..READY_SPINS {
        if ready() {
            return true;
        }
    }
    false
}

/// Extension trait that constrains the `RCC` peripheral
pub trait RccExt {
    /// Constrains the `RCC` peripheral so it plays nicely with the other abstractions
    fn constrain(self) -> Rcc;
    /// Constrains the `RCC` peripheral and applies the clock configuration
    fn freeze(self, rcc_cfg: Config) -> Result<Rcc, Error>;
}

impl RccExt for RCC {
    fn constrain(self) -> Rcc {
        Rcc {
            rb: self,
            clocks: Clocks::default(),
        }
    }

    fn freeze(self, rcc_cfg: Config) -> Result<Rcc, Error> {
        self.constrain().freeze(rcc_cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::RateExtU32;

    #[test]
    fn hsi_passthrough_runs_every_bus_at_8_mhz() {
        let s = settings(&Config::hsi()).unwrap();
        assert_eq!(s.clocks.sys_clk.raw(), 8_000_000);
        assert_eq!(s.clocks.ahb_clk.raw(), 8_000_000);
        assert_eq!(s.clocks.apb1_clk.raw(), 8_000_000);
        assert_eq!(s.clocks.apb2_clk.raw(), 8_000_000);
        assert_eq!(s.sw_bits, 0b00);
        assert_eq!(s.hpre_bits, 0b0000);
        assert_eq!(s.ppre1_bits, 0b000);
        assert_eq!(s.ppre2_bits, 0b000);
        assert_eq!(s.latency, 0b000);
    }

    #[test]
    fn prescalers_divide_down_the_buses() {
        let cfg = Config::hsi()
            .ahb_psc(Prescaler::Div2)
            .apb1_psc(Prescaler::Div4)
            .apb2_psc(Prescaler::Div16);
        let s = settings(&cfg).unwrap();
        assert_eq!(s.clocks.ahb_clk.raw(), 4_000_000);
        assert_eq!(s.clocks.apb1_clk.raw(), 1_000_000);
        assert_eq!(s.clocks.apb2_clk.raw(), 250_000);
        assert_eq!(s.hpre_bits, 0b1000);
        assert_eq!(s.ppre1_bits, 0b101);
        assert_eq!(s.ppre2_bits, 0b111);
    }

    #[test]
    fn hse_selects_the_external_source() {
        let s = settings(&Config::hse(8.MHz())).unwrap();
        assert_eq!(s.sw_bits, 0b01);
        assert_eq!(s.clocks.sys_clk.raw(), 8_000_000);
    }

    #[test]
    fn hse_crystal_out_of_range_is_rejected() {
        assert_eq!(
            settings(&Config::hse(1.MHz())).unwrap_err(),
            Error::InvalidConfig
        );
        assert_eq!(
            settings(&Config::hse(20.MHz())).unwrap_err(),
            Error::InvalidConfig
        );
    }

    #[test]
    fn fast_bypass_clock_needs_one_wait_state() {
        let s = settings(&Config::hse_bypass(25.MHz())).unwrap();
        assert_eq!(s.latency, 0b001);
    }
}
