//! Tick-counted delays
use embedded_hal::delay::DelayNs;
use void::{ResultVoidExt, Void};

use crate::ticks::TickCounter;
use crate::time::{Instant, MilliSecond};

/// Millisecond delay provider backed by the shared tick counter
pub struct Delay<'a> {
    counter: &'a TickCounter,
}

impl<'a> Delay<'a> {
    pub fn new(counter: &'a TickCounter) -> Self {
        Delay { counter }
    }

    /// Starts a countdown of `ticks` milliseconds
    pub fn start(&self, ticks: u32) -> Countdown<'a> {
        Countdown {
            counter: self.counter,
            from: self.counter.now(),
            ticks,
        }
    }

    /// Blocks for at least `ms` milliseconds
    pub fn delay_ms(&mut self, ms: u32) {
        let mut countdown = self.start(ms);
        nb::block!(countdown.wait()).void_unwrap()
    }

    pub fn delay<T>(&mut self, delay: T)
    where
        T: Into<MilliSecond>,
    {
        self.delay_ms(delay.into().ticks())
    }
}

/// An in-progress delay
pub struct Countdown<'a> {
    counter: &'a TickCounter,
    from: Instant,
    ticks: u32,
}

impl Countdown<'_> {
    /// Completes once the counter has advanced by at least the requested
    /// number of ticks from the sampled start; never earlier.
    pub fn wait(&mut self) -> nb::Result<(), Void> {
        if self.counter.now().ticks_since(self.from) < self.ticks {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}

impl DelayNs for Delay<'_> {
    /// Rounds up to whole ticks, so the wait may be late but never early
    fn delay_ns(&mut self, ns: u32) {
        Delay::delay_ms(self, ns.div_ceil(1_000_000));
    }

    fn delay_us(&mut self, us: u32) {
        Delay::delay_ms(self, us.div_ceil(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        Delay::delay_ms(self, ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticks::TickCounter;

    #[test]
    fn thousand_tick_wait_is_not_satisfied_at_999() {
        let counter = TickCounter::new();
        let delay = Delay::new(&counter);
        let mut wait = delay.start(1_000);

        for _ in 0..999 {
            counter.tick();
        }
        assert!(matches!(wait.wait(), Err(nb::Error::WouldBlock)));

        counter.tick();
        assert!(matches!(wait.wait(), Ok(())));
    }

    #[test]
    fn wait_spanning_the_wrap_completes_on_time() {
        let counter = TickCounter::starting_at(u32::MAX - 500);
        let delay = Delay::new(&counter);
        let mut wait = delay.start(1_000);

        // 500 ticks up to the wrap, 499 past it: still waiting.
        for _ in 0..999 {
            counter.tick();
        }
        assert_eq!(counter.now().0, 498);
        assert!(matches!(wait.wait(), Err(nb::Error::WouldBlock)));

        counter.tick();
        assert!(matches!(wait.wait(), Ok(())));
    }

    #[test]
    fn zero_tick_wait_is_immediately_satisfied() {
        let counter = TickCounter::new();
        let delay = Delay::new(&counter);
        assert!(matches!(delay.start(0).wait(), Ok(())));
    }

    #[test]
    fn completed_wait_stays_completed() {
        let counter = TickCounter::new();
        let delay = Delay::new(&counter);
        let mut wait = delay.start(10);

        for _ in 0..50 {
            counter.tick();
        }
        assert!(matches!(wait.wait(), Ok(())));
        assert!(matches!(wait.wait(), Ok(())));
    }
}
