//! Alternate-function I/O: routing of GPIO pins to EXTI lines.

use super::gpio::{self, Port};
use super::RegisterBus;
use crate::Result;

/// Base address of AFIO.
pub const AFIO_BASE: usize = 0x4001_0000;

/// EXTI source selection register 0. EXTISS1..=3 follow, four lines each.
pub const EXTISS0: usize = AFIO_BASE + 0x08;

/// Register and bit shift of the source field of EXTI line `pin`.
fn source_field(pin: u8) -> Result<(usize, u32)> {
    gpio::try_pin(pin)?;
    Ok((EXTISS0 + (pin as usize / 4) * 4, (pin as u32 % 4) * 4))
}

/// Selects `port` as the source of EXTI line `pin`. The AF clock must be
/// running.
///
/// Only lines 0..=15 have a GPIO source; other lines return
/// [`Error::InvalidPin`](crate::Error::InvalidPin) and leave AFIO untouched.
pub fn exti_source_select<B: RegisterBus>(bus: &B, port: Port, pin: u8) -> Result<()> {
    let (reg, shift) = source_field(pin)?;
    let source = port.index() as u32;
    bus.modify(reg, |r| (r & !(0xf << shift)) | (source << shift));
    Ok(())
}

/// Port currently routed to EXTI line `pin`, as its index.
pub fn exti_source<B: RegisterBus>(bus: &B, pin: u8) -> Result<u8> {
    let (reg, shift) = source_field(pin)?;
    Ok(((bus.read(reg) >> shift) & 0xf) as u8)
}
