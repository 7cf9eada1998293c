//! Peripheral primitives for the GD32F20x.
//!
//! Each submodule covers one peripheral and only the operations the board
//! needs. Register access goes through [`RegisterBus`] so the primitives can
//! run against the real memory map or against [`crate::sim::SimBus`].

use core::ptr::{read_volatile, write_volatile};

pub mod afio;
pub mod exti;
pub mod gpio;
pub mod nvic;
pub mod rcu;

/// 32-bit register access at absolute addresses.
pub trait RegisterBus {
    /// Reads the register at `addr`.
    fn read(&self, addr: usize) -> u32;

    /// Writes `value` into the register at `addr`.
    fn write(&self, addr: usize, value: u32);

    /// Read-modify-write of the register at `addr`.
    fn modify<F>(&self, addr: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(addr);
        self.write(addr, f(value));
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    fn read(&self, addr: usize) -> u32 {
        (**self).read(addr)
    }

    fn write(&self, addr: usize, value: u32) {
        (**self).write(addr, value)
    }
}

/// Volatile access to the memory-mapped registers of the running chip.
#[derive(Debug, Copy, Clone)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Returns a handle to the device registers.
    ///
    /// # Safety
    ///
    /// Every access through the handle touches physical addresses. The caller
    /// must be running on a GD32F20x and must not race other owners of the
    /// same registers.
    pub const unsafe fn steal() -> Mmio {
        Mmio { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read(&self, addr: usize) -> u32 {
        // SAFETY: construction of `Mmio` is unsafe and asserts that `addr`
        // belongs to the device memory map.
        unsafe { read_volatile(addr as *const u32) }
    }

    #[inline(always)]
    fn write(&self, addr: usize, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile(addr as *mut u32, value) }
    }
}
