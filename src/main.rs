//! Blinks the Blue Pill's PC13 LED once per second.
//!
//! Boot order: freeze the clock tree, start the SysTick millisecond tick,
//! configure the LED pin, then toggle forever. Any initialization failure
//! parks the core in [`fault::halt`].
#![cfg_attr(all(not(test), target_arch = "arm"), no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(target_arch = "arm")]
use panic_halt as _;

#[cfg(target_arch = "arm")]
use cortex_m_rt::{entry, exception};

#[cfg(target_arch = "arm")]
use bluepill_blink::blink::{Blinker, BLINK_PERIOD_MS};
#[cfg(target_arch = "arm")]
use bluepill_blink::delay::Delay;
#[cfg(target_arch = "arm")]
use bluepill_blink::prelude::*;
#[cfg(target_arch = "arm")]
use bluepill_blink::rcc::Config;
#[cfg(target_arch = "arm")]
use bluepill_blink::ticks::TickCounter;
#[cfg(target_arch = "arm")]
use bluepill_blink::{fault, stm32};

/// Millisecond tick counter; written only by the SysTick handler below.
#[cfg(target_arch = "arm")]
static TICKS: TickCounter = TickCounter::new();

#[cfg(target_arch = "arm")]
#[entry]
fn main() -> ! {
    let Some(dp) = stm32::Peripherals::take() else {
        fault::halt()
    };
    let Some(cp) = cortex_m::Peripherals::take() else {
        fault::halt()
    };

    // HSI straight through, every divider at pass-through.
    let mut rcc = match dp.RCC.constrain().freeze(Config::hsi()) {
        Ok(rcc) => rcc,
        Err(_) => fault::halt(),
    };

    #[cfg(feature = "debug")]
    bluepill_blink::debug::init();
    #[cfg(feature = "debug")]
    bluepill_blink::println!("sys_clk: {} Hz", rcc.clocks.sys_clk.raw());

    let _ticker = cp.SYST.ticker(&rcc.clocks);

    let gpioc = dp.GPIOC.split(&mut rcc);
    let mut led = gpioc.pc13.into_push_pull_output();

    let mut delay = Delay::new(&TICKS);
    let mut blink = Blinker::new();

    // The reset level of the pin is not specified; start from a known one.
    // Low lights the LED, which sits between PC13 and 3V3 on this board.
    led.set_state(blink.level());

    loop {
        delay.delay_ms(BLINK_PERIOD_MS);
        led.set_state(blink.toggle());
    }
}

#[cfg(target_arch = "arm")]
#[exception]
fn SysTick() {
    TICKS.tick();
}

#[cfg(not(target_arch = "arm"))]
fn main() {}
