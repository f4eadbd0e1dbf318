//! Terminal fault state
use core::sync::atomic::{compiler_fence, Ordering};

/// Masks interrupts and parks the core forever
///
/// The one response to a fatal initialization failure: no recovery, no
/// retry, no further observable activity until reset or power-off.
pub fn halt() -> ! {
    cortex_m::interrupt::disable();
    loop {
        compiler_fence(Ordering::SeqCst);
    }
}
