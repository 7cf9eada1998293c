#![no_main]
#![no_std]

use cortex_m_rt::entry;
use embedded_hal::digital::{OutputPin, PinState};
use gd32f205r_start as _; // global logger + panicking-behavior
use gd32f205r_start::hardware::{Board, KeyMode};
use gd32f205r_start::periph::Mmio;

#[entry]
fn main() -> ! {
    defmt::info!("init");

    // SAFETY: nothing else in this program touches the registers
    let board = Board::new(unsafe { Mmio::steal() });
    let mut parts = board.split(KeyMode::Gpio);

    // LED mirrors the key
    let mut last = PinState::Low;
    loop {
        let state = parts.user_key.state();
        if state != last {
            defmt::info!("key {}", state);
            last = state;
        }
        parts.led2.set_state(state).unwrap();
    }
}
