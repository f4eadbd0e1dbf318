//! LED blink firmware support for STM32F1 "Blue Pill" boards.
#![cfg_attr(not(test), no_std)]
#![allow(non_camel_case_types)]

#[cfg(not(any(feature = "stm32f100", feature = "stm32f101", feature = "stm32f103")))]
compile_error!(
    "This crate requires one of the following features enabled: stm32f100, stm32f101 or stm32f103"
);

pub use cortex_m;
pub use embedded_hal as hal;
pub use nb;
pub use stm32f1;

pub use nb::block;

#[cfg(feature = "stm32f100")]
pub use stm32f1::stm32f100 as stm32;

#[cfg(feature = "stm32f101")]
pub use stm32f1::stm32f101 as stm32;

#[cfg(feature = "stm32f103")]
pub use stm32f1::stm32f103 as stm32;

#[cfg(feature = "rt")]
pub use crate::stm32::interrupt;

#[cfg(feature = "debug")]
#[macro_use]
pub mod debug;

pub mod blink;
pub mod delay;
pub mod fault;
pub mod gpio;
pub mod prelude;
pub mod rcc;
pub mod ticks;
pub mod time;
