//! Reset and clock unit: peripheral clock gating.

use super::RegisterBus;

/// Base address of RCU.
pub const RCU_BASE: usize = 0x4002_1000;

/// APB2 enable register.
pub const APB2EN: usize = RCU_BASE + 0x18;

/// Peripherals on APB2 whose clock can be gated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Periph {
    /// Alternate function I/O, needed for EXTI source selection.
    Af,
    GpioA,
    GpioB,
    GpioC,
    GpioD,
    GpioE,
}

impl Periph {
    /// Enable register address and bit position.
    const fn reg_bit(self) -> (usize, u32) {
        match self {
            Periph::Af => (APB2EN, 0),
            Periph::GpioA => (APB2EN, 2),
            Periph::GpioB => (APB2EN, 3),
            Periph::GpioC => (APB2EN, 4),
            Periph::GpioD => (APB2EN, 5),
            Periph::GpioE => (APB2EN, 6),
        }
    }
}

/// Enables the clock of `periph`.
pub fn clock_enable<B: RegisterBus>(bus: &B, periph: Periph) {
    let (reg, bit) = periph.reg_bit();
    bus.modify(reg, |r| r | (1 << bit));
}

/// Disables the clock of `periph`.
pub fn clock_disable<B: RegisterBus>(bus: &B, periph: Periph) {
    let (reg, bit) = periph.reg_bit();
    bus.modify(reg, |r| r & !(1 << bit));
}

/// Returns `true` if the clock of `periph` is running.
pub fn clock_enabled<B: RegisterBus>(bus: &B, periph: Periph) -> bool {
    let (reg, bit) = periph.reg_bit();
    bus.read(reg) & (1 << bit) != 0
}
