#![no_main]
#![no_std]

use cortex_m_rt::entry;
use gd32f205r_start as _; // global logger + panicking-behavior
use gd32f205r_start::hardware::{Board, LedId};
use gd32f205r_start::periph::Mmio;

/// Core cycles between toggles, ~250 ms on the 8 MHz reset clock.
const HALF_PERIOD: u32 = 2_000_000;

#[entry]
fn main() -> ! {
    defmt::info!("init");

    // SAFETY: nothing else in this program touches the registers
    let board = Board::new(unsafe { Mmio::steal() });
    board.led_init(LedId::Led2);

    loop {
        board.led_toggle(LedId::Led2);
        cortex_m::asm::delay(HALF_PERIOD);
    }
}
