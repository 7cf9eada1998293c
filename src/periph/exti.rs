//! External interrupt/event controller.

use super::RegisterBus;

/// Base address of EXTI.
pub const EXTI_BASE: usize = 0x4001_0400;

/// Interrupt enable register.
pub const INTEN: usize = EXTI_BASE + 0x00;

/// Event enable register.
pub const EVEN: usize = EXTI_BASE + 0x04;

/// Rising edge trigger enable register.
pub const RTEN: usize = EXTI_BASE + 0x08;

/// Falling edge trigger enable register.
pub const FTEN: usize = EXTI_BASE + 0x0c;

/// Software interrupt event register.
pub const SWIEV: usize = EXTI_BASE + 0x10;

/// Pending register. Write 1 to clear.
pub const PD: usize = EXTI_BASE + 0x14;

/// Number of EXTI lines.
pub const NLINES: u8 = 20;

/// EXTI line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line(u8);

impl Line {
    /// Line `n`. Lines 0..=15 are the GPIO lines.
    pub const fn new(n: u8) -> Line {
        Line(n)
    }

    /// Line number.
    pub const fn number(self) -> u8 {
        self.0
    }

    const fn mask(self) -> u32 {
        1 << self.0
    }
}

/// Whether a line raises an interrupt or only a wake-up event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Interrupt,
    Event,
}

/// Edge that triggers the line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    Rising,
    Falling,
    Both,
    None,
}

/// Configures `line`. Any previous configuration of the line is dropped.
pub fn init<B: RegisterBus>(bus: &B, line: Line, mode: Mode, trigger: Trigger) {
    let mask = line.mask();

    for reg in [INTEN, EVEN, RTEN, FTEN] {
        bus.modify(reg, |r| r & !mask);
    }

    match mode {
        Mode::Interrupt => bus.modify(INTEN, |r| r | mask),
        Mode::Event => bus.modify(EVEN, |r| r | mask),
    }

    match trigger {
        Trigger::Rising => bus.modify(RTEN, |r| r | mask),
        Trigger::Falling => bus.modify(FTEN, |r| r | mask),
        Trigger::Both => {
            bus.modify(RTEN, |r| r | mask);
            bus.modify(FTEN, |r| r | mask);
        }
        Trigger::None => {}
    }
}

/// Returns `true` if `line` has a pending trigger.
pub fn flag_get<B: RegisterBus>(bus: &B, line: Line) -> bool {
    bus.read(PD) & line.mask() != 0
}

/// Returns `true` if `line` is pending and its interrupt is enabled.
pub fn interrupt_flag_get<B: RegisterBus>(bus: &B, line: Line) -> bool {
    bus.read(PD) & line.mask() != 0 && bus.read(INTEN) & line.mask() != 0
}

/// Clears the pending flag of `line`.
pub fn interrupt_flag_clear<B: RegisterBus>(bus: &B, line: Line) {
    bus.write(PD, line.mask());
}

/// Triggers `line` from software.
pub fn software_interrupt_enable<B: RegisterBus>(bus: &B, line: Line) {
    bus.modify(SWIEV, |r| r | line.mask());
}

/// Disables `line` as interrupt source.
pub fn interrupt_disable<B: RegisterBus>(bus: &B, line: Line) {
    bus.modify(INTEN, |r| r & !line.mask());
}
