//! User keys.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, PinState};

use super::{KeyId, KEY_IRQ_PRE_PRIORITY, KEY_IRQ_SUB_PRIORITY};
use crate::periph::gpio::{self, Mode, Speed};
use crate::periph::{afio, exti, nvic, rcu, RegisterBus};

/// How a key is used.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyMode {
    /// Plain input, read by polling.
    Gpio = 0,
    /// Input that also raises its EXTI interrupt on a falling edge.
    Exti = 1,
}

pub(crate) fn init<B: RegisterBus>(bus: &B, id: KeyId, mode: KeyMode) {
    let key = id.descriptor();
    debug!("key: init {} as {}", id, mode);

    rcu::clock_enable(bus, key.clock);
    rcu::clock_enable(bus, rcu::Periph::Af);
    gpio::init(bus, key.port, Mode::FloatingInput, Speed::Mhz50, key.pin);

    if mode == KeyMode::Exti {
        nvic::irq_enable(bus, key.irq, KEY_IRQ_PRE_PRIORITY, KEY_IRQ_SUB_PRIORITY);
        if let Err(e) = afio::exti_source_select(bus, key.port_source, key.pin_source) {
            error!("key: {} has no EXTI source: {}", id, e);
        }
        exti::init(bus, key.exti_line, exti::Mode::Interrupt, exti::Trigger::Falling);
        exti::interrupt_flag_clear(bus, key.exti_line);
    }
}

pub(crate) fn state<B: RegisterBus>(bus: &B, id: KeyId) -> PinState {
    let key = id.descriptor();
    gpio::input_bit_get(bus, key.port, key.pin)
}

/// An initialized key.
pub struct Key<B> {
    bus: B,
    id: KeyId,
    mode: KeyMode,
}

impl<B: RegisterBus> Key<B> {
    pub fn new(bus: B, id: KeyId, mode: KeyMode) -> Self {
        init(&bus, id, mode);
        Self { bus, id, mode }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    /// Level sampled on the key pin.
    pub fn state(&self) -> PinState {
        state(&self.bus, self.id)
    }

    /// Returns `true` if the key's EXTI line has fired and its interrupt is
    /// enabled. Always `false` in [`KeyMode::Gpio`].
    pub fn is_interrupt_pending(&self) -> bool {
        exti::interrupt_flag_get(&self.bus, self.id.descriptor().exti_line)
    }

    /// Acknowledges the key's EXTI line. Call from the interrupt handler.
    pub fn clear_interrupt_pending_bit(&mut self) {
        exti::interrupt_flag_clear(&self.bus, self.id.descriptor().exti_line)
    }

    pub fn free(self) -> B {
        self.bus
    }
}

impl<B> ErrorType for Key<B> {
    type Error = Infallible;
}

impl<B: RegisterBus> InputPin for Key<B> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state() == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state() == PinState::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{Board, EXTI0_IRQ};
    use crate::periph::exti::Line;
    use crate::periph::gpio::Port;
    use crate::sim::SimBus;

    const LINE0: Line = Line::new(0);

    #[test]
    fn gpio_mode_is_floating_input_without_interrupt() {
        let bus = SimBus::new();
        Board::new(&bus).key_init(KeyId::User, KeyMode::Gpio);

        assert!(rcu::clock_enabled(&bus, rcu::Periph::GpioA));
        assert!(rcu::clock_enabled(&bus, rcu::Periph::Af));
        let cfg = gpio::config(&bus, Port::A, 0);
        assert_eq!((cfg.md(), cfg.ctl()), (0b00, 0b01));

        assert_eq!(bus.read(exti::INTEN), 0);
        assert_eq!(bus.read(exti::FTEN), 0);
        assert!(!nvic::irq_enabled(&bus, EXTI0_IRQ));
        assert_eq!(nvic::priority_group(&bus), None);
    }

    #[test]
    fn exti_mode_routes_line_zero() {
        let bus = SimBus::new();
        Board::new(&bus).key_init(KeyId::User, KeyMode::Exti);

        assert!(nvic::irq_enabled(&bus, EXTI0_IRQ));
        assert_eq!(nvic::irq_priority(&bus, EXTI0_IRQ), 0x80);
        assert_eq!(afio::exti_source(&bus, 0), Ok(Port::A.index()));
        assert_eq!(bus.read(exti::INTEN) & 1, 1);
        assert_eq!(bus.read(exti::EVEN) & 1, 0);
        assert_eq!(bus.read(exti::FTEN) & 1, 1);
        assert_eq!(bus.read(exti::RTEN) & 1, 0);
    }

    #[test]
    fn exti_mode_replaces_previous_route() {
        let bus = SimBus::new();
        rcu::clock_enable(&bus, rcu::Periph::Af);
        afio::exti_source_select(&bus, Port::B, 0).unwrap();
        assert_eq!(afio::exti_source(&bus, 0), Ok(Port::B.index()));

        Board::new(&bus).key_init(KeyId::User, KeyMode::Exti);
        assert_eq!(afio::exti_source(&bus, 0), Ok(Port::A.index()));

        bus.drive(Port::A, 0, PinState::High);
        assert!(!exti::flag_get(&bus, LINE0));
        bus.drive(Port::A, 0, PinState::Low);
        assert!(exti::flag_get(&bus, LINE0));
    }

    #[test]
    fn exti_mode_clears_stale_flag() {
        let bus = SimBus::new();
        exti::init(&bus, LINE0, exti::Mode::Interrupt, exti::Trigger::None);
        exti::software_interrupt_enable(&bus, LINE0);
        assert!(exti::flag_get(&bus, LINE0));

        Board::new(&bus).key_init(KeyId::User, KeyMode::Exti);
        assert!(!exti::flag_get(&bus, LINE0));
    }

    #[test]
    fn state_follows_pin() {
        let bus = SimBus::new();
        let board = Board::new(&bus);
        board.key_init(KeyId::User, KeyMode::Gpio);

        bus.drive(Port::A, 0, PinState::High);
        assert_eq!(board.key_state(KeyId::User), PinState::High);
        bus.drive(Port::A, 0, PinState::Low);
        assert_eq!(board.key_state(KeyId::User), PinState::Low);
    }

    #[test]
    fn falling_edge_ignored_in_gpio_mode() {
        let bus = SimBus::new();
        let key = Key::new(&bus, KeyId::User, KeyMode::Gpio);
        bus.drive(Port::A, 0, PinState::High);
        bus.drive(Port::A, 0, PinState::Low);
        assert!(!key.is_interrupt_pending());
        assert!(!exti::flag_get(&bus, LINE0));
    }

    #[test]
    fn falling_edge_pends_in_exti_mode() {
        let bus = SimBus::new();
        let mut key = Key::new(&bus, KeyId::User, KeyMode::Exti);
        bus.drive(Port::A, 0, PinState::High);
        assert!(!key.is_interrupt_pending());
        bus.drive(Port::A, 0, PinState::Low);
        assert!(key.is_interrupt_pending());
        assert!(nvic::irq_pending(&bus, EXTI0_IRQ));

        key.clear_interrupt_pending_bit();
        assert!(!key.is_interrupt_pending());
        assert_eq!(key.mode(), KeyMode::Exti);
    }

    #[test]
    fn embedded_hal_pin() {
        let bus = SimBus::new();
        let mut key = Key::new(&bus, KeyId::User, KeyMode::Gpio);
        assert!(key.is_low().unwrap());
        bus.drive(Port::A, 0, PinState::High);
        assert!(key.is_high().unwrap());
        assert_eq!(key.id(), KeyId::User);
    }
}
