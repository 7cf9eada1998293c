//! Board support for the GigaDevice GD32F205R-START evaluation board.
//!
//! The board has one user LED (LED2 on PC6) and one user key (PA0, wired to
//! EXTI line 0). [`hardware::Board`] wraps the handful of register sequences
//! needed to drive them. The register primitives live in [`periph`] and are
//! written against [`periph::RegisterBus`], so the same code runs on the chip
//! through [`periph::Mmio`] or on the host through [`sim::SimBus`].
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod hardware;
pub mod periph;
pub mod sim;

#[cfg(feature = "rt")]
use defmt_brtt as _; // global logger

#[cfg(feature = "rt")]
use panic_probe as _;

/// Board support error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// No LED with this index on the board.
    InvalidLed(u8),

    /// No key with this index on the board.
    InvalidKey(u8),

    /// GPIO pin numbers go from 0 to 15.
    InvalidPin(u8),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::InvalidLed(n) => write!(f, "invalid LED index {n}"),
            Error::InvalidKey(n) => write!(f, "invalid key index {n}"),
            Error::InvalidPin(n) => write!(f, "invalid GPIO pin {n}"),
        }
    }
}

/// Board support result.
pub type Result<T> = core::result::Result<T, Error>;

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is
// invoked
#[cfg(feature = "rt")]
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

/// Terminates the application and makes `probe-rs` exit with exit-code = 0
#[cfg(feature = "rt")]
pub fn exit() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}
