//! Semihosting debug output
//!
//! Only compiled with the `debug` feature. Semihosting traps the core when
//! no debugger is attached, so release firmware must be built without it.

use core::cell::RefCell;

use cortex_m::interrupt::Mutex;
use cortex_m_semihosting::hio::HStdout;

/// Host stdout handle, populated by [`init`]
pub static STDOUT: Mutex<RefCell<Option<HStdout>>> = Mutex::new(RefCell::new(None));

/// Connects to the host's stdout
///
/// Call once at the start of the program, before the first [`print!`] or
/// [`println!`].
pub fn init() {
    cortex_m::interrupt::free(|cs| {
        *STDOUT.borrow(cs).borrow_mut() = cortex_m_semihosting::hio::hstdout().ok();
    });
}

/// Sends a debug message to the host
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::cortex_m::interrupt::free(|cs| {
            if let Some(ref mut stdout) = *$crate::debug::STDOUT.borrow(cs).borrow_mut() {
                use core::fmt::Write;
                write!(stdout, $($arg)*).ok();
            }
        })
    }
}

/// Sends a debug message to the host, with a trailing newline
#[macro_export]
macro_rules! println {
    ($fmt:expr) => {
        $crate::print!(concat!($fmt, "\n"))
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::print!(concat!($fmt, "\n"), $($arg)*)
    };
}
