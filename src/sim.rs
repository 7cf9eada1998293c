//! Register model of the parts of the GD32F20x the board touches.
//!
//! [`SimBus`] answers [`RegisterBus`] accesses for RCU APB2EN, GPIOA..=GPIOE,
//! AFIO EXTISS, EXTI, the NVIC enable/pending/priority registers and SCB
//! AIRCR. Pins can be driven from outside with [`SimBus::drive`]; edges on a
//! pin routed to an EXTI line latch the pending flag the way the chip does.
//!
//! Peripheral clocks are honoured: a GPIO port or AFIO whose clock is gated
//! reads as zero and ignores writes.

use core::cell::Cell;

use cortex_m::peripheral::{NVIC, SCB};
use embedded_hal::digital::PinState;

use crate::periph::afio::AFIO_BASE;
use crate::periph::exti::{EXTI_BASE, NLINES};
use crate::periph::gpio::{self, Port, GPIOA_BASE, NPINS};
use crate::periph::rcu::{self, RCU_BASE};
use crate::periph::RegisterBus;

const NPORTS: usize = 5;
const PORT_SIZE: usize = 0x400;

/// Reset value of CTL0/CTL1: every pin floating input.
const CTL_RESET: u32 = 0x4444_4444;

const NVIC_WORDS: usize = 8;
const NVIC_IPR_WORDS: usize = 60;

#[derive(Debug)]
struct SimPort {
    ctl0: Cell<u32>,
    ctl1: Cell<u32>,
    octl: Cell<u16>,
    /// Pins driven from outside the chip.
    driven: Cell<u16>,
    /// Level applied to the driven pins.
    external: Cell<u16>,
}

impl SimPort {
    fn new() -> SimPort {
        SimPort {
            ctl0: Cell::new(CTL_RESET),
            ctl1: Cell::new(CTL_RESET),
            octl: Cell::new(0),
            driven: Cell::new(0),
            external: Cell::new(0),
        }
    }

    fn config(&self, n: u8) -> u8 {
        let (reg, shift) = if n < 8 {
            (self.ctl0.get(), n as u32 * 4)
        } else {
            (self.ctl1.get(), (n as u32 - 8) * 4)
        };
        ((reg >> shift) & 0xf) as u8
    }

    /// Level present on every pin of the port.
    fn levels(&self) -> u16 {
        let octl = self.octl.get();
        let driven = self.driven.get();
        let external = self.external.get();

        (0..NPINS).fold(0, |acc, n| {
            let bit = gpio::pin(n);
            let cfg = self.config(n);
            let (md, ctl) = (cfg & 0b11, cfg >> 2);
            let high = if md != 0 {
                octl & bit != 0
            } else if driven & bit != 0 {
                external & bit != 0
            } else if ctl == 0b10 {
                // pull-up or pull-down, selected by OCTL
                octl & bit != 0
            } else {
                false
            };
            if high {
                acc | bit
            } else {
                acc
            }
        })
    }
}

#[derive(Debug, Default)]
struct SimExti {
    inten: Cell<u32>,
    even: Cell<u32>,
    rten: Cell<u32>,
    ften: Cell<u32>,
    swiev: Cell<u32>,
    pd: Cell<u32>,
}

/// Host-side model of the GD32F20x registers used by this crate.
#[derive(Debug)]
pub struct SimBus {
    apb2en: Cell<u32>,
    ports: [SimPort; NPORTS],
    extiss: [Cell<u32>; 4],
    exti: SimExti,
    iser: [Cell<u32>; NVIC_WORDS],
    ispr: [Cell<u32>; NVIC_WORDS],
    ipr: [Cell<u32>; NVIC_IPR_WORDS],
    aircr: Cell<u32>,
}

impl Default for SimBus {
    fn default() -> SimBus {
        SimBus::new()
    }
}

impl SimBus {
    /// Registers at their reset values, nothing driven.
    pub fn new() -> SimBus {
        SimBus {
            apb2en: Cell::new(0),
            ports: core::array::from_fn(|_| SimPort::new()),
            extiss: Default::default(),
            exti: SimExti::default(),
            iser: Default::default(),
            ispr: Default::default(),
            ipr: core::array::from_fn(|_| Cell::new(0)),
            aircr: Cell::new(0),
        }
    }

    /// Applies `level` to pin `n` of `port` from outside the chip.
    pub fn drive(&self, port: Port, n: u8, level: PinState) {
        let p = &self.ports[port.index() as usize];
        let before = p.levels();
        let bit = gpio::pin(n);
        p.driven.set(p.driven.get() | bit);
        match level {
            PinState::High => p.external.set(p.external.get() | bit),
            PinState::Low => p.external.set(p.external.get() & !bit),
        }
        self.detect_edges(port, before);
    }

    /// Stops driving pin `n` of `port`.
    pub fn release(&self, port: Port, n: u8) {
        let p = &self.ports[port.index() as usize];
        let before = p.levels();
        p.driven.set(p.driven.get() & !gpio::pin(n));
        self.detect_edges(port, before);
    }

    /// Level present on pin `n` of `port`, whatever the clock state.
    pub fn level(&self, port: Port, n: u8) -> PinState {
        PinState::from(self.ports[port.index() as usize].levels() & gpio::pin(n) != 0)
    }

    fn clocked(&self, periph: rcu::Periph) -> bool {
        rcu::clock_enabled(self, periph)
    }

    fn port_at(idx: usize) -> Port {
        match idx {
            0 => Port::A,
            1 => Port::B,
            2 => Port::C,
            3 => Port::D,
            _ => Port::E,
        }
    }

    /// Latches EXTI pending flags for the edges seen on `port` since its
    /// levels were `before`.
    fn detect_edges(&self, port: Port, before: u16) {
        let after = self.ports[port.index() as usize].levels();
        let changed = before ^ after;

        for n in (0..NPINS).filter(|&n| changed & gpio::pin(n) != 0) {
            let ss = self.extiss[n as usize / 4].get();
            let source = (ss >> ((n as u32 % 4) * 4)) & 0xf;
            if source != port.index() as u32 {
                continue;
            }

            let mask = 1u32 << n;
            let rising = after & gpio::pin(n) != 0;
            let armed = if rising {
                self.exti.rten.get() & mask != 0
            } else {
                self.exti.ften.get() & mask != 0
            };
            if armed {
                self.latch(n);
            }
        }
    }

    fn latch(&self, line: u8) {
        let mask = 1u32 << line;
        self.exti.pd.set(self.exti.pd.get() | mask);
        if self.exti.inten.get() & mask != 0 {
            if let Some(irq) = exti_irq(line) {
                let word = &self.ispr[irq as usize / 32];
                word.set(word.get() | (1 << (irq % 32)));
            }
        }
    }

    fn gpio_write(&self, idx: usize, offset: usize, value: u32) {
        let p = &self.ports[idx];
        let before = p.levels();
        match offset {
            gpio::CTL0 => p.ctl0.set(value),
            gpio::CTL1 => p.ctl1.set(value),
            gpio::OCTL => p.octl.set(value as u16),
            gpio::BOP => {
                let set = value as u16;
                let clear = (value >> 16) as u16;
                p.octl.set((p.octl.get() | set) & !clear);
            }
            gpio::BC => p.octl.set(p.octl.get() & !(value as u16)),
            _ => {}
        }
        self.detect_edges(Self::port_at(idx), before);
    }

    fn gpio_read(&self, idx: usize, offset: usize) -> u32 {
        let p = &self.ports[idx];
        match offset {
            gpio::CTL0 => p.ctl0.get(),
            gpio::CTL1 => p.ctl1.get(),
            gpio::ISTAT => p.levels() as u32,
            gpio::OCTL => p.octl.get() as u32,
            _ => 0,
        }
    }

    fn exti_write(&self, offset: usize, value: u32) {
        let value = value & ((1 << NLINES) - 1);
        let e = &self.exti;
        match offset {
            0x00 => e.inten.set(value),
            0x04 => e.even.set(value),
            0x08 => e.rten.set(value),
            0x0c => e.ften.set(value),
            0x10 => {
                let raised = value & !e.swiev.get() & e.inten.get();
                e.swiev.set(value);
                (0..NLINES)
                    .filter(|&n| raised & (1 << n) != 0)
                    .for_each(|n| self.latch(n));
            }
            0x14 => {
                e.pd.set(e.pd.get() & !value);
                e.swiev.set(e.swiev.get() & !value);
            }
            _ => {}
        }
    }

    fn exti_read(&self, offset: usize) -> u32 {
        let e = &self.exti;
        match offset {
            0x00 => e.inten.get(),
            0x04 => e.even.get(),
            0x08 => e.rten.get(),
            0x0c => e.ften.get(),
            0x10 => e.swiev.get(),
            0x14 => e.pd.get(),
            _ => 0,
        }
    }

    fn nvic_write(&self, offset: usize, value: u32) {
        let word = offset % 0x80 / 4;
        match offset {
            0x000..=0x01f => self.iser[word].set(self.iser[word].get() | value),
            0x080..=0x09f => self.iser[word].set(self.iser[word].get() & !value),
            0x100..=0x11f => self.ispr[word].set(self.ispr[word].get() | value),
            0x180..=0x19f => self.ispr[word].set(self.ispr[word].get() & !value),
            0x300..=0x3ef => self.ipr[(offset - 0x300) / 4].set(value),
            _ => {}
        }
    }

    fn nvic_read(&self, offset: usize) -> u32 {
        let word = offset % 0x80 / 4;
        match offset {
            0x000..=0x01f | 0x080..=0x09f => self.iser[word].get(),
            0x100..=0x11f | 0x180..=0x19f => self.ispr[word].get(),
            0x300..=0x3ef => self.ipr[(offset - 0x300) / 4].get(),
            _ => 0,
        }
    }
}

/// Interrupt vector of EXTI `line` on the GD32F20x.
fn exti_irq(line: u8) -> Option<u8> {
    match line {
        0..=4 => Some(6 + line),
        5..=9 => Some(23),
        10..=15 => Some(40),
        _ => None,
    }
}

impl RegisterBus for SimBus {
    fn read(&self, addr: usize) -> u32 {
        let nvic = NVIC::PTR as usize;
        let aircr = SCB::PTR as usize + 0x08;

        if addr == RCU_BASE + 0x18 {
            self.apb2en.get()
        } else if (GPIOA_BASE..GPIOA_BASE + NPORTS * PORT_SIZE).contains(&addr) {
            let idx = (addr - GPIOA_BASE) / PORT_SIZE;
            if !self.clocked(Self::port_at(idx).clock()) {
                return 0;
            }
            self.gpio_read(idx, (addr - GPIOA_BASE) % PORT_SIZE)
        } else if (AFIO_BASE + 0x08..AFIO_BASE + 0x18).contains(&addr) {
            if !self.clocked(rcu::Periph::Af) {
                return 0;
            }
            self.extiss[(addr - AFIO_BASE - 0x08) / 4].get()
        } else if (EXTI_BASE..EXTI_BASE + 0x18).contains(&addr) {
            self.exti_read(addr - EXTI_BASE)
        } else if (nvic..nvic + 0x3f0).contains(&addr) {
            self.nvic_read(addr - nvic)
        } else if addr == aircr {
            0xfa05_0000 | self.aircr.get()
        } else {
            0
        }
    }

    fn write(&self, addr: usize, value: u32) {
        let nvic = NVIC::PTR as usize;
        let aircr = SCB::PTR as usize + 0x08;

        if addr == RCU_BASE + 0x18 {
            self.apb2en.set(value);
        } else if (GPIOA_BASE..GPIOA_BASE + NPORTS * PORT_SIZE).contains(&addr) {
            let idx = (addr - GPIOA_BASE) / PORT_SIZE;
            if self.clocked(Self::port_at(idx).clock()) {
                self.gpio_write(idx, (addr - GPIOA_BASE) % PORT_SIZE, value);
            }
        } else if (AFIO_BASE + 0x08..AFIO_BASE + 0x18).contains(&addr) {
            if self.clocked(rcu::Periph::Af) {
                self.extiss[(addr - AFIO_BASE - 0x08) / 4].set(value & 0xffff);
            }
        } else if (EXTI_BASE..EXTI_BASE + 0x18).contains(&addr) {
            self.exti_write(addr - EXTI_BASE, value);
        } else if (nvic..nvic + 0x3f0).contains(&addr) {
            self.nvic_write(addr - nvic, value);
        } else if addr == aircr {
            if value >> 16 == 0x05fa {
                self.aircr.set(value & 0x700);
            }
        } else {
            warn!("sim: write to unmapped address {:#x}", addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periph::exti;

    #[test]
    fn gated_port_ignores_writes() {
        let bus = SimBus::new();
        gpio::bit_set(&bus, Port::C, gpio::pin(6));
        rcu::clock_enable(&bus, rcu::Periph::GpioC);
        assert_eq!(gpio::output_bit_get(&bus, Port::C, gpio::pin(6)), PinState::Low);
    }

    #[test]
    fn gated_port_reads_zero() {
        let bus = SimBus::new();
        assert_eq!(bus.read(Port::A.base() + gpio::CTL0), 0);
        rcu::clock_enable(&bus, rcu::Periph::GpioA);
        assert_eq!(bus.read(Port::A.base() + gpio::CTL0), CTL_RESET);
    }

    #[test]
    fn bop_upper_half_clears() {
        let bus = SimBus::new();
        rcu::clock_enable(&bus, rcu::Periph::GpioB);
        bus.write(Port::B.base() + gpio::BOP, 0x0003);
        bus.write(Port::B.base() + gpio::BOP, 0x0001_0000);
        assert_eq!(bus.read(Port::B.base() + gpio::OCTL), 0x0002);
    }

    #[test]
    fn driven_input_follows_external_level() {
        let bus = SimBus::new();
        rcu::clock_enable(&bus, rcu::Periph::GpioA);
        assert_eq!(gpio::input_bit_get(&bus, Port::A, gpio::pin(0)), PinState::Low);
        bus.drive(Port::A, 0, PinState::High);
        assert_eq!(gpio::input_bit_get(&bus, Port::A, gpio::pin(0)), PinState::High);
        bus.release(Port::A, 0);
        assert_eq!(bus.level(Port::A, 0), PinState::Low);
    }

    #[test]
    fn edge_on_unrouted_port_is_ignored() {
        let bus = SimBus::new();
        let line = exti::Line::new(0);
        exti::init(&bus, line, exti::Mode::Interrupt, exti::Trigger::Both);
        // EXTISS0 resets to port A
        bus.drive(Port::B, 0, PinState::High);
        assert!(!exti::flag_get(&bus, line));
        bus.drive(Port::A, 0, PinState::High);
        assert!(exti::flag_get(&bus, line));
    }

    #[test]
    fn exti_lines_map_to_shared_vectors() {
        assert_eq!(exti_irq(0), Some(6));
        assert_eq!(exti_irq(4), Some(10));
        assert_eq!(exti_irq(7), Some(23));
        assert_eq!(exti_irq(15), Some(40));
        assert_eq!(exti_irq(16), None);
    }
}
