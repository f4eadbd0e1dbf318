//! LED toggle schedule
use embedded_hal::digital::PinState;

/// Milliseconds between pin transitions
pub const BLINK_PERIOD_MS: u32 = 1_000;

/// Two-state toggle machine over the pin's electrical level
///
/// Starts at `Low` and alternates forever; there is no terminal state.
pub struct Blinker {
    level: PinState,
}

impl Blinker {
    pub const fn new() -> Self {
        Blinker {
            level: PinState::Low,
        }
    }

    /// Current pin level
    pub fn level(&self) -> PinState {
        self.level
    }

    /// Flips to the other level and returns it
    pub fn toggle(&mut self) -> PinState {
        self.level = match self.level {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        };
        self.level
    }
}

impl Default for Blinker {
    fn default() -> Self {
        Blinker::new()
    }
}

/// Pin level after `elapsed` ticks of a schedule that starts `Low` and
/// toggles every `period` ticks: `High` exactly in the odd periods.
pub fn level_after(period: u32, elapsed: u32) -> PinState {
    if (elapsed / period) % 2 == 1 {
        PinState::High
    } else {
        PinState::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::Delay;
    use crate::ticks::TickCounter;

    #[test]
    fn alternates_from_low() {
        let mut blink = Blinker::new();
        assert_eq!(blink.level(), PinState::Low);
        assert_eq!(blink.toggle(), PinState::High);
        assert_eq!(blink.toggle(), PinState::Low);
        assert_eq!(blink.toggle(), PinState::High);
    }

    #[test]
    fn schedule_is_high_exactly_in_odd_periods() {
        assert_eq!(level_after(1_000, 0), PinState::Low);
        assert_eq!(level_after(1_000, 999), PinState::Low);
        assert_eq!(level_after(1_000, 1_000), PinState::High);
        assert_eq!(level_after(1_000, 1_999), PinState::High);
        assert_eq!(level_after(1_000, 2_000), PinState::Low);
        assert_eq!(level_after(1_000, 5_000), PinState::High);
    }

    #[test]
    fn stepped_machine_matches_the_schedule() {
        let mut blink = Blinker::new();
        for second in 1..=10 {
            assert_eq!(blink.toggle(), level_after(1_000, second * 1_000));
        }
    }

    // Five simulated seconds of the firmware loop, one tick at a time. The
    // delay completes on the period boundary itself, so the transition at
    // t = 5000 ms is the fifth and last one.
    #[test]
    fn five_seconds_give_five_transitions_ending_high() {
        let counter = TickCounter::new();
        let delay = Delay::new(&counter);
        let mut blink = Blinker::new();

        let mut level = blink.level();
        let mut transitions = 0;
        let mut wait = delay.start(BLINK_PERIOD_MS);

        for _ in 0..5_000 {
            counter.tick();
            if wait.wait().is_ok() {
                level = blink.toggle();
                transitions += 1;
                wait = delay.start(BLINK_PERIOD_MS);
            }
        }

        assert_eq!(transitions, 5);
        assert_eq!(level, PinState::High);
        assert_eq!(level, level_after(BLINK_PERIOD_MS, 5_000));
    }
}
