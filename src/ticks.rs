//! Millisecond tick source
use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use crate::rcc::Clocks;
use crate::time::Instant;

/// Tick rate of the counter
pub const TICK_HZ: u32 = 1_000;

/// Free-running millisecond counter
///
/// A single machine word with exactly one writer, the periodic timer
/// interrupt, and any number of readers. Word-sized atomic access rules out
/// torn reads; relaxed ordering is sufficient on the single-core target.
/// The counter starts at zero and wraps on overflow.
pub struct TickCounter {
    ticks: AtomicU32,
}

impl TickCounter {
    pub const fn new() -> Self {
        TickCounter {
            ticks: AtomicU32::new(0),
        }
    }

    #[cfg(test)]
    pub(crate) const fn starting_at(ticks: u32) -> Self {
        TickCounter {
            ticks: AtomicU32::new(ticks),
        }
    }

    /// Advances the counter by one tick
    ///
    /// The single write operation. Call it from the tick interrupt handler
    /// and nowhere else.
    pub fn tick(&self) {
        let next = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
        self.ticks.store(next, Ordering::Relaxed);
    }

    /// Samples the counter
    pub fn now(&self) -> Instant {
        Instant(self.ticks.load(Ordering::Relaxed))
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        TickCounter::new()
    }
}

/// System timer (SysTick) as the periodic tick interrupt source
pub struct Ticker {
    syst: SYST,
}

impl Ticker {
    /// Configures SysTick to raise its exception once per tick period
    pub fn new(mut syst: SYST, clocks: &Clocks) -> Self {
        let reload = clocks.ahb_clk.raw() / TICK_HZ - 1;
        assert!(reload <= 0x00ff_ffff);

        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(reload);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();

        Ticker { syst }
    }

    /// Stops the tick interrupt and releases the SysTick resource
    pub fn release(mut self) -> SYST {
        self.syst.disable_counter();
        self.syst.disable_interrupt();
        self.syst
    }
}

pub trait SysTickExt {
    fn ticker(self, clocks: &Clocks) -> Ticker;
}

impl SysTickExt for SYST {
    fn ticker(self, clocks: &Clocks) -> Ticker {
        Ticker::new(self, clocks)
    }
}

#[cfg(test)]
mod tests {
    use super::TickCounter;

    #[test]
    fn starts_at_zero_and_counts_by_one() {
        let counter = TickCounter::new();
        assert_eq!(counter.now().0, 0);
        counter.tick();
        counter.tick();
        counter.tick();
        assert_eq!(counter.now().0, 3);
    }

    #[test]
    fn wraps_at_the_representable_maximum() {
        let counter = TickCounter::starting_at(u32::MAX);
        counter.tick();
        assert_eq!(counter.now().0, 0);
    }
}
