//! GPIO ports.
//!
//! The GD32F20x uses the two-register configuration layout: every pin owns a
//! 4-bit field in CTL0 (pins 0..=7) or CTL1 (pins 8..=15) holding its mode
//! (MD) and control (CTL) bits. Output levels are changed through the atomic
//! BOP (set) and BC (clear) registers.

use bitfield_struct::bitfield;
use embedded_hal::digital::PinState;

use super::rcu;
use super::RegisterBus;
use crate::{Error, Result};

/// Base address of GPIOA. Ports follow every 0x400 bytes.
pub const GPIOA_BASE: usize = 0x4001_0800;

/// Port control register 0 (pins 0..=7).
pub const CTL0: usize = 0x00;

/// Port control register 1 (pins 8..=15).
pub const CTL1: usize = 0x04;

/// Port input status register.
pub const ISTAT: usize = 0x08;

/// Port output control register.
pub const OCTL: usize = 0x0c;

/// Port bit operate register. Writing 1 to bit n sets pin n.
pub const BOP: usize = 0x10;

/// Port bit clear register. Writing 1 to bit n clears pin n.
pub const BC: usize = 0x14;

/// Number of pins per port.
pub const NPINS: u8 = 16;

/// Returns the mask of pin `n`.
///
/// `n` must be below [`NPINS`]; numbers coming from outside go through
/// [`try_pin`].
pub const fn pin(n: u8) -> u16 {
    1 << n
}

/// Returns the mask of pin `n`, checking that the pin exists.
pub fn try_pin(n: u8) -> Result<u16> {
    if n >= NPINS {
        return Err(Error::InvalidPin(n));
    }
    Ok(pin(n))
}

/// GPIO port.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
}

impl Port {
    /// Base address of the port registers.
    pub const fn base(self) -> usize {
        GPIOA_BASE + (self as usize) * 0x400
    }

    /// Clock gating the port.
    pub const fn clock(self) -> rcu::Periph {
        match self {
            Port::A => rcu::Periph::GpioA,
            Port::B => rcu::Periph::GpioB,
            Port::C => rcu::Periph::GpioC,
            Port::D => rcu::Periph::GpioD,
            Port::E => rcu::Periph::GpioE,
        }
    }

    /// Index of the port, also its EXTI source code.
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// Pin mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    AnalogInput,
    FloatingInput,
    PullDownInput,
    PullUpInput,
    PushPullOutput,
    OpenDrainOutput,
    AltPushPull,
    AltOpenDrain,
}

impl Mode {
    const fn is_output(self) -> bool {
        matches!(
            self,
            Mode::PushPullOutput | Mode::OpenDrainOutput | Mode::AltPushPull | Mode::AltOpenDrain
        )
    }

    const fn ctl(self) -> u8 {
        match self {
            Mode::AnalogInput | Mode::PushPullOutput => 0b00,
            Mode::FloatingInput | Mode::OpenDrainOutput => 0b01,
            Mode::PullDownInput | Mode::PullUpInput | Mode::AltPushPull => 0b10,
            Mode::AltOpenDrain => 0b11,
        }
    }
}

/// Maximum output slew rate. Ignored for input modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    Mhz10 = 0b01,
    Mhz2 = 0b10,
    Mhz50 = 0b11,
}

/// Configuration field of one pin inside CTL0/CTL1.
#[bitfield(u8)]
pub struct PinConfig {
    #[bits(2)]
    pub md: u8,
    #[bits(2)]
    pub ctl: u8,
    #[bits(4)]
    __: u8,
}

impl PinConfig {
    /// Field value for `mode` at `speed`.
    pub fn for_mode(mode: Mode, speed: Speed) -> PinConfig {
        let md = if mode.is_output() { speed as u8 } else { 0 };
        PinConfig::new().with_md(md).with_ctl(mode.ctl())
    }
}

/// Register and bit shift of the configuration field of pin `n`.
const fn config_field(n: u8) -> (usize, u32) {
    if n < 8 {
        (CTL0, (n as u32) * 4)
    } else {
        (CTL1, ((n - 8) as u32) * 4)
    }
}

/// Configures every pin in `pins` of `port`.
///
/// Pull-up and pull-down inputs select their resistor through the output
/// control bit, so those modes also set or clear the pin.
pub fn init<B: RegisterBus>(bus: &B, port: Port, mode: Mode, speed: Speed, pins: u16) {
    let field = u8::from(PinConfig::for_mode(mode, speed)) as u32;

    for n in (0..NPINS).filter(|&n| pins & pin(n) != 0) {
        let (reg, shift) = config_field(n);
        bus.modify(port.base() + reg, |r| (r & !(0xf << shift)) | (field << shift));

        match mode {
            Mode::PullDownInput => bus.write(port.base() + BC, pin(n) as u32),
            Mode::PullUpInput => bus.write(port.base() + BOP, pin(n) as u32),
            _ => {}
        }
    }
}

/// Reads back the configuration field of pin `n`.
pub fn config<B: RegisterBus>(bus: &B, port: Port, n: u8) -> PinConfig {
    let (reg, shift) = config_field(n);
    PinConfig::from(((bus.read(port.base() + reg) >> shift) & 0xf) as u8)
}

/// Drives every pin in `pins` high.
pub fn bit_set<B: RegisterBus>(bus: &B, port: Port, pins: u16) {
    bus.write(port.base() + BOP, pins as u32);
}

/// Drives every pin in `pins` low.
pub fn bit_reset<B: RegisterBus>(bus: &B, port: Port, pins: u16) {
    bus.write(port.base() + BC, pins as u32);
}

/// Drives every pin in `pins` to `state`.
pub fn bit_write<B: RegisterBus>(bus: &B, port: Port, pins: u16, state: PinState) {
    match state {
        PinState::High => bit_set(bus, port, pins),
        PinState::Low => bit_reset(bus, port, pins),
    }
}

/// Level sampled on `pin`.
pub fn input_bit_get<B: RegisterBus>(bus: &B, port: Port, pin: u16) -> PinState {
    PinState::from(bus.read(port.base() + ISTAT) & pin as u32 != 0)
}

/// Level the port is driving on `pin`.
pub fn output_bit_get<B: RegisterBus>(bus: &B, port: Port, pin: u16) -> PinState {
    PinState::from(bus.read(port.base() + OCTL) & pin as u32 != 0)
}

/// Levels sampled on the whole port.
pub fn input_port_get<B: RegisterBus>(bus: &B, port: Port) -> u16 {
    bus.read(port.base() + ISTAT) as u16
}
