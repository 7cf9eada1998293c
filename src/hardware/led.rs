//! User LEDs.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, PinState, StatefulOutputPin};

use super::LedId;
use crate::periph::gpio::{self, Mode, Speed};
use crate::periph::{rcu, RegisterBus};

pub(crate) fn init<B: RegisterBus>(bus: &B, id: LedId) {
    let led = id.descriptor();
    debug!("led: init {}", id);

    rcu::clock_enable(bus, led.clock);
    gpio::init(bus, led.port, Mode::PushPullOutput, Speed::Mhz50, led.pin);
    gpio::bit_reset(bus, led.port, led.pin);
}

pub(crate) fn on<B: RegisterBus>(bus: &B, id: LedId) {
    let led = id.descriptor();
    gpio::bit_set(bus, led.port, led.pin);
}

pub(crate) fn off<B: RegisterBus>(bus: &B, id: LedId) {
    let led = id.descriptor();
    gpio::bit_reset(bus, led.port, led.pin);
}

pub(crate) fn toggle<B: RegisterBus>(bus: &B, id: LedId) {
    let led = id.descriptor();
    let level = gpio::input_bit_get(bus, led.port, led.pin);
    gpio::bit_write(bus, led.port, led.pin, !level);
}

/// An initialized LED.
pub struct Led<B> {
    bus: B,
    id: LedId,
}

impl<B: RegisterBus> Led<B> {
    /// Initializes the LED, which starts off.
    pub fn new(bus: B, id: LedId) -> Self {
        init(&bus, id);
        Self { bus, id }
    }

    pub fn id(&self) -> LedId {
        self.id
    }

    pub fn on(&mut self) {
        on(&self.bus, self.id)
    }

    pub fn off(&mut self) {
        off(&self.bus, self.id)
    }

    pub fn toggle(&mut self) {
        toggle(&self.bus, self.id)
    }

    /// Level sampled on the LED pin.
    pub fn level(&self) -> PinState {
        let led = self.id.descriptor();
        gpio::input_bit_get(&self.bus, led.port, led.pin)
    }

    pub fn free(self) -> B {
        self.bus
    }
}

impl<B> ErrorType for Led<B> {
    type Error = Infallible;
}

impl<B: RegisterBus> OutputPin for Led<B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.off();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.on();
        Ok(())
    }
}

impl<B: RegisterBus> StatefulOutputPin for Led<B> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        let led = self.id.descriptor();
        Ok(gpio::output_bit_get(&self.bus, led.port, led.pin) == PinState::High)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_set_high()?)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        toggle(&self.bus, self.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::Board;
    use crate::periph::gpio::Port;
    use crate::sim::SimBus;

    #[test]
    fn init_clocks_port_and_starts_low() {
        let bus = SimBus::new();
        // leave a stale high level on the pin before init
        rcu::clock_enable(&bus, rcu::Periph::GpioC);
        gpio::bit_set(&bus, Port::C, gpio::pin(6));

        let board = Board::new(&bus);
        board.led_init(LedId::Led2);
        assert!(rcu::clock_enabled(&bus, rcu::Periph::GpioC));
        assert_eq!(bus.level(Port::C, 6), PinState::Low);
    }

    #[test]
    fn on_off() {
        let bus = SimBus::new();
        let board = Board::new(&bus);
        board.led_init(LedId::Led2);

        board.led_on(LedId::Led2);
        assert_eq!(bus.level(Port::C, 6), PinState::High);
        board.led_off(LedId::Led2);
        assert_eq!(bus.level(Port::C, 6), PinState::Low);
    }

    #[test]
    fn toggle_twice_restores_level() {
        let bus = SimBus::new();
        let board = Board::new(&bus);
        board.led_init(LedId::Led2);

        board.led_toggle(LedId::Led2);
        assert_eq!(bus.level(Port::C, 6), PinState::High);
        board.led_toggle(LedId::Led2);
        assert_eq!(bus.level(Port::C, 6), PinState::Low);
    }

    #[test]
    fn on_before_init_has_no_effect() {
        let bus = SimBus::new();
        Board::new(&bus).led_on(LedId::Led2);
        assert!(!rcu::clock_enabled(&bus, rcu::Periph::GpioC));
        assert_eq!(bus.level(Port::C, 6), PinState::Low);
    }

    #[test]
    fn other_pins_untouched() {
        let bus = SimBus::new();
        rcu::clock_enable(&bus, rcu::Periph::GpioC);
        gpio::init(&bus, Port::C, Mode::PushPullOutput, Speed::Mhz2, gpio::pin(7));
        gpio::bit_set(&bus, Port::C, gpio::pin(7));

        let mut led = Led::new(&bus, LedId::Led2);
        led.toggle();
        led.off();
        assert_eq!(bus.level(Port::C, 7), PinState::High);
    }

    #[test]
    fn embedded_hal_pin() {
        let bus = SimBus::new();
        let mut led = Led::new(&bus, LedId::Led2);

        assert!(led.is_set_low().unwrap());
        led.set_high().unwrap();
        assert!(led.is_set_high().unwrap());
        assert_eq!(led.level(), PinState::High);

        StatefulOutputPin::toggle(&mut led).unwrap();
        assert!(led.is_set_low().unwrap());
        assert_eq!(led.id(), LedId::Led2);
    }
}
