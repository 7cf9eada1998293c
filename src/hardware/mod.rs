//! GD32F205R-START board resources.
//!
//! The LED and key wiring is described by fixed descriptor tables indexed by
//! [`LedId`] and [`KeyId`]. [`Board`] runs the register sequences against
//! those tables; [`Led`] and [`Key`] are the same operations packaged as
//! `embedded-hal` pins.

use embedded_hal::digital::PinState;

use crate::periph::exti::Line;
use crate::periph::gpio::{self, Port};
use crate::periph::rcu::Periph;
use crate::periph::RegisterBus;
use crate::Error;

pub mod key;
pub mod led;

pub use key::{Key, KeyMode};
pub use led::Led;

/// Number of user LEDs on the board.
pub const LED_COUNT: usize = 1;

/// Number of user keys on the board.
pub const KEY_COUNT: usize = 1;

/// Pre-emption priority of the key interrupts.
pub const KEY_IRQ_PRE_PRIORITY: u8 = 2;

/// Sub-priority of the key interrupts.
pub const KEY_IRQ_SUB_PRIORITY: u8 = 0;

#[derive(Debug, Copy, PartialEq, Eq, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedId {
    Led2 = 0,
}

#[derive(Debug, Copy, PartialEq, Eq, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyId {
    User = 0,
}

/// Wiring of one LED.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LedDescriptor {
    pub port: Port,
    pub pin: u16,
    pub clock: Periph,
}

/// Wiring of one key, including its interrupt routing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    pub port: Port,
    pub pin: u16,
    pub clock: Periph,
    pub exti_line: Line,
    /// Port routed to the EXTI line.
    pub port_source: Port,
    /// Pin number routed to the EXTI line.
    pub pin_source: u8,
    /// NVIC vector of the EXTI line.
    pub irq: u8,
}

/// EXTI0 interrupt vector.
pub const EXTI0_IRQ: u8 = 6;

static LEDS: [LedDescriptor; LED_COUNT] = [
    // LED2
    LedDescriptor {
        port: Port::C,
        pin: gpio::pin(6),
        clock: Periph::GpioC,
    },
];

static KEYS: [KeyDescriptor; KEY_COUNT] = [
    // user key
    KeyDescriptor {
        port: Port::A,
        pin: gpio::pin(0),
        clock: Periph::GpioA,
        exti_line: Line::new(0),
        port_source: Port::A,
        pin_source: 0,
        irq: EXTI0_IRQ,
    },
];

impl LedId {
    pub fn descriptor(self) -> &'static LedDescriptor {
        &LEDS[self as usize]
    }
}

impl KeyId {
    pub fn descriptor(self) -> &'static KeyDescriptor {
        &KEYS[self as usize]
    }
}

impl TryFrom<u8> for LedId {
    type Error = Error;

    fn try_from(n: u8) -> Result<LedId, Error> {
        match n {
            0 => Ok(LedId::Led2),
            _ => Err(Error::InvalidLed(n)),
        }
    }
}

impl TryFrom<u8> for KeyId {
    type Error = Error;

    fn try_from(n: u8) -> Result<KeyId, Error> {
        match n {
            0 => Ok(KeyId::User),
            _ => Err(Error::InvalidKey(n)),
        }
    }
}

/// The board, seen through a register bus.
pub struct Board<B> {
    bus: B,
}

impl<B: RegisterBus> Board<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn free(self) -> B {
        self.bus
    }

    /// Clocks the LED port, makes the pin a push-pull output and switches
    /// the LED off.
    pub fn led_init(&self, id: LedId) {
        led::init(&self.bus, id)
    }

    pub fn led_on(&self, id: LedId) {
        led::on(&self.bus, id)
    }

    pub fn led_off(&self, id: LedId) {
        led::off(&self.bus, id)
    }

    /// Inverts the level currently sampled on the LED pin.
    pub fn led_toggle(&self, id: LedId) {
        led::toggle(&self.bus, id)
    }

    /// Clocks the key port and AFIO and makes the pin a floating input. In
    /// [`KeyMode::Exti`] the key also raises its EXTI interrupt on falling
    /// edges.
    pub fn key_init(&self, id: KeyId, mode: KeyMode) {
        key::init(&self.bus, id, mode)
    }

    /// Level sampled on the key pin.
    pub fn key_state(&self, id: KeyId) -> PinState {
        key::state(&self.bus, id)
    }

    /// Initializes every LED and key and hands them out as pins.
    pub fn split(&self, mode: KeyMode) -> Parts<&B> {
        info!("board: split, key mode {}", mode);
        Parts {
            led2: Led::new(&self.bus, LedId::Led2),
            user_key: Key::new(&self.bus, KeyId::User, mode),
        }
    }
}

/// Initialized board pins.
pub struct Parts<B> {
    pub led2: Led<B>,
    pub user_key: Key<B>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;

    #[test]
    fn ids_index_their_tables() {
        let led = LedId::Led2.descriptor();
        assert_eq!((led.port, led.pin, led.clock), (Port::C, 0x0040, Periph::GpioC));

        let key = KeyId::User.descriptor();
        assert_eq!((key.port, key.pin, key.clock), (Port::A, 0x0001, Periph::GpioA));
        assert_eq!(key.exti_line.number(), 0);
        assert_eq!((key.port_source, key.pin_source), (Port::A, 0));
        assert_eq!(key.irq, EXTI0_IRQ);
    }

    #[test]
    fn key_sources_match_their_pins() {
        for key in KEYS.iter() {
            assert_eq!(gpio::try_pin(key.pin_source), Ok(key.pin));
            assert_eq!(key.exti_line.number(), key.pin_source);
            assert_eq!(key.port_source, key.port);
        }
    }

    #[test]
    fn numeric_ids() {
        assert_eq!(LedId::try_from(0), Ok(LedId::Led2));
        assert_eq!(LedId::try_from(1), Err(Error::InvalidLed(1)));
        assert_eq!(KeyId::try_from(0), Ok(KeyId::User));
        assert_eq!(KeyId::try_from(3), Err(Error::InvalidKey(3)));
    }

    #[test]
    fn split_initializes_everything() {
        let bus = SimBus::new();
        let board = Board::new(&bus);
        let _parts = board.split(KeyMode::Gpio);
        assert_eq!(bus.level(Port::C, 6), PinState::Low);
        assert_eq!(gpio::config(&bus, Port::C, 6).md(), 0b11);
        assert_eq!(gpio::config(&bus, Port::A, 0).ctl(), 0b01);
    }
}
