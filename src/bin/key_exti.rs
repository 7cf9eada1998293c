#![no_main]
#![no_std]

use core::cell::Cell;

use cortex_m_rt::{entry, exception};
use critical_section::Mutex;
use gd32f205r_start as _; // global logger + panicking-behavior
use gd32f205r_start::hardware::{Board, KeyId, KeyMode, LedId, EXTI0_IRQ};
use gd32f205r_start::periph::{exti, Mmio};

static PRESSES: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

fn board() -> Board<Mmio> {
    // SAFETY: main only writes before enabling the interrupt, afterwards
    // the handler is the only writer
    Board::new(unsafe { Mmio::steal() })
}

#[entry]
fn main() -> ! {
    defmt::info!("init");

    let board = board();
    board.led_init(LedId::Led2);
    board.key_init(KeyId::User, KeyMode::Exti);

    let mut seen = 0;
    loop {
        cortex_m::asm::wfi();
        let presses = critical_section::with(|cs| PRESSES.borrow(cs).get());
        if presses != seen {
            defmt::info!("key presses: {}", presses);
            seen = presses;
        }
    }
}

// No device crate provides the vector table, so every interrupt lands here.
#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    if irqn != EXTI0_IRQ as i16 {
        defmt::panic!("unexpected interrupt {}", irqn);
    }

    let board = board();
    let line = KeyId::User.descriptor().exti_line;
    if exti::interrupt_flag_get(board.bus(), line) {
        exti::interrupt_flag_clear(board.bus(), line);
        board.led_toggle(LedId::Led2);
        critical_section::with(|cs| {
            let presses = PRESSES.borrow(cs);
            presses.set(presses.get() + 1);
        });
    }
}
