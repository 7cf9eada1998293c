//! Interrupt enable and priority in the Cortex-M3 NVIC.
//!
//! The GD32F20x implements 4 priority bits, split between pre-emption and
//! sub-priority according to the PRIGROUP field of SCB AIRCR.

use cortex_m::peripheral::{NVIC, SCB};

use super::RegisterBus;

/// Key that must accompany every AIRCR write.
const AIRCR_VECTKEY: u32 = 0x05fa_0000;

/// PRIGROUP field of AIRCR.
const AIRCR_PRIGROUP_MASK: u32 = 0x700;

/// Implemented priority bits.
const PRIO_BITS: u32 = 4;

/// Interrupt set-enable register holding `irq`.
pub fn iser(irq: u8) -> usize {
    NVIC::PTR as usize + 4 * (irq as usize / 32)
}

/// Interrupt clear-enable register holding `irq`.
pub fn icer(irq: u8) -> usize {
    NVIC::PTR as usize + 0x80 + 4 * (irq as usize / 32)
}

/// Interrupt set-pending register holding `irq`.
pub fn ispr(irq: u8) -> usize {
    NVIC::PTR as usize + 0x100 + 4 * (irq as usize / 32)
}

/// Word of the interrupt priority registers holding the byte of `irq`.
pub fn ipr(irq: u8) -> usize {
    NVIC::PTR as usize + 0x300 + (irq as usize & !3)
}

/// Application interrupt and reset control register.
pub fn aircr() -> usize {
    SCB::PTR as usize + 0x08
}

/// Split of the priority bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PriorityGroup {
    Pre0Sub4 = 0x700,
    Pre1Sub3 = 0x600,
    Pre2Sub2 = 0x500,
    Pre3Sub1 = 0x400,
    Pre4Sub0 = 0x300,
}

impl PriorityGroup {
    fn from_aircr(aircr: u32) -> Option<PriorityGroup> {
        match aircr & AIRCR_PRIGROUP_MASK {
            0x700 => Some(PriorityGroup::Pre0Sub4),
            0x600 => Some(PriorityGroup::Pre1Sub3),
            0x500 => Some(PriorityGroup::Pre2Sub2),
            0x400 => Some(PriorityGroup::Pre3Sub1),
            0x300 => Some(PriorityGroup::Pre4Sub0),
            _ => None,
        }
    }

    /// Pre-emption bits.
    pub const fn pre_bits(self) -> u32 {
        match self {
            PriorityGroup::Pre0Sub4 => 0,
            PriorityGroup::Pre1Sub3 => 1,
            PriorityGroup::Pre2Sub2 => 2,
            PriorityGroup::Pre3Sub1 => 3,
            PriorityGroup::Pre4Sub0 => 4,
        }
    }

    /// Sub-priority bits.
    pub const fn sub_bits(self) -> u32 {
        PRIO_BITS - self.pre_bits()
    }

    /// Priority register byte for the given pre-emption and sub-priority.
    pub const fn encode(self, pre: u8, sub: u8) -> u8 {
        let prio = ((pre as u32) << (PRIO_BITS - self.pre_bits()))
            | ((sub as u32) & (0xf >> (PRIO_BITS - self.sub_bits())));
        ((prio << (8 - PRIO_BITS)) & 0xff) as u8
    }
}

/// Sets the priority split.
pub fn priority_group_set<B: RegisterBus>(bus: &B, group: PriorityGroup) {
    bus.write(aircr(), AIRCR_VECTKEY | group as u32);
}

/// Current priority split, `None` if PRIGROUP holds none of the five splits.
pub fn priority_group<B: RegisterBus>(bus: &B) -> Option<PriorityGroup> {
    PriorityGroup::from_aircr(bus.read(aircr()))
}

/// Enables `irq` with the given pre-emption and sub-priority.
///
/// An unrecognized priority split is replaced by [`PriorityGroup::Pre2Sub2`]
/// first.
pub fn irq_enable<B: RegisterBus>(bus: &B, irq: u8, pre: u8, sub: u8) {
    let group = match priority_group(bus) {
        Some(group) => group,
        None => {
            debug!("nvic: no priority group set, using PRE2_SUB2");
            priority_group_set(bus, PriorityGroup::Pre2Sub2);
            PriorityGroup::Pre2Sub2
        }
    };

    let shift = (irq as u32 % 4) * 8;
    let prio = group.encode(pre, sub) as u32;
    bus.modify(ipr(irq), |r| (r & !(0xff << shift)) | (prio << shift));

    bus.write(iser(irq), 1 << (irq % 32));
}

/// Disables `irq`.
pub fn irq_disable<B: RegisterBus>(bus: &B, irq: u8) {
    bus.write(icer(irq), 1 << (irq % 32));
}

/// Returns `true` if `irq` is enabled.
pub fn irq_enabled<B: RegisterBus>(bus: &B, irq: u8) -> bool {
    bus.read(iser(irq)) & (1 << (irq % 32)) != 0
}

/// Returns `true` if `irq` is pending.
pub fn irq_pending<B: RegisterBus>(bus: &B, irq: u8) -> bool {
    bus.read(ispr(irq)) & (1 << (irq % 32)) != 0
}

/// Priority register byte of `irq`.
pub fn irq_priority<B: RegisterBus>(bus: &B, irq: u8) -> u8 {
    (bus.read(ipr(irq)) >> ((irq as u32 % 4) * 8)) as u8
}
