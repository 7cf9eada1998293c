use embedded_hal::digital::{InputPin, OutputPin, PinState, StatefulOutputPin};
use gd32f205r_start::hardware::{Board, KeyId, KeyMode, LedId, EXTI0_IRQ};
use gd32f205r_start::periph::gpio::Port;
use gd32f205r_start::periph::{exti, nvic, rcu};
use gd32f205r_start::sim::SimBus;

#[test]
fn led_sequence() {
    let bus = SimBus::new();
    let board = Board::new(&bus);

    board.led_init(LedId::Led2);
    assert_eq!(bus.level(Port::C, 6), PinState::Low);

    board.led_on(LedId::Led2);
    assert_eq!(bus.level(Port::C, 6), PinState::High);

    board.led_toggle(LedId::Led2);
    assert_eq!(bus.level(Port::C, 6), PinState::Low);
    board.led_toggle(LedId::Led2);
    assert_eq!(bus.level(Port::C, 6), PinState::High);

    board.led_off(LedId::Led2);
    assert_eq!(bus.level(Port::C, 6), PinState::Low);
}

#[test]
fn key_polling() {
    let bus = SimBus::new();
    let board = Board::new(&bus);
    board.key_init(KeyId::User, KeyMode::Gpio);

    for level in [PinState::High, PinState::Low, PinState::High] {
        bus.drive(Port::A, 0, level);
        assert_eq!(board.key_state(KeyId::User), level);
    }
    assert!(!nvic::irq_enabled(&bus, EXTI0_IRQ));
}

#[test]
fn key_press_toggles_led_from_handler() {
    let bus = SimBus::new();
    let board = Board::new(&bus);
    board.led_init(LedId::Led2);
    board.key_init(KeyId::User, KeyMode::Exti);
    let line = KeyId::User.descriptor().exti_line;

    // what the EXTI0 handler in the firmware does
    let handle = || {
        if exti::interrupt_flag_get(board.bus(), line) {
            exti::interrupt_flag_clear(board.bus(), line);
            board.led_toggle(LedId::Led2);
        }
    };

    for expected in [PinState::High, PinState::Low, PinState::High] {
        bus.drive(Port::A, 0, PinState::High);
        bus.drive(Port::A, 0, PinState::Low);
        assert!(nvic::irq_pending(&bus, EXTI0_IRQ));
        handle();
        assert_eq!(bus.level(Port::C, 6), expected);
        assert!(!exti::flag_get(&bus, line));
    }
}

#[test]
fn split_pins() {
    let bus = SimBus::new();
    let board = Board::new(&bus);
    let mut parts = board.split(KeyMode::Exti);

    assert!(rcu::clock_enabled(&bus, rcu::Periph::GpioA));
    assert!(rcu::clock_enabled(&bus, rcu::Periph::GpioC));
    assert!(rcu::clock_enabled(&bus, rcu::Periph::Af));

    bus.drive(Port::A, 0, PinState::High);
    let pressed = parts.user_key.is_high().unwrap();
    parts.led2.set_state(PinState::from(pressed)).unwrap();
    assert!(parts.led2.is_set_high().unwrap());

    StatefulOutputPin::toggle(&mut parts.led2).unwrap();
    assert!(parts.led2.is_set_low().unwrap());
}
