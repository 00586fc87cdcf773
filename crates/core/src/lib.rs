// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod board;
pub mod bus;
pub mod clock;
pub mod controller;
pub mod dispatch;
pub mod indicator;
pub mod lfsr;
pub mod line;
pub mod memory;
pub mod metrics;
pub mod peripherals;
pub mod poll;
pub mod regs;
pub mod transport;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;


pub use controller::{PrbsController, PrbsMode, StatusSnapshot};
pub use dispatch::{Command, Outcome, Rejection};
pub use line::{LineBuffer, LineEvent};
pub use poll::PollLoop;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HarnessError {
    #[error("Unmapped bus access at {0:#x}")]
    Unmapped(u64),
    #[error("Misaligned register access at {0:#x}")]
    Misaligned(u64),
    #[error("Peripheral '{name}' at {base:#x} overlaps '{other}'")]
    Overlap {
        name: String,
        base: u64,
        other: String,
    },
    #[error("Peripheral '{name}' at {base:#x} (+{size:#x}) runs past the end of the address space")]
    WindowOverflow { name: String, base: u64, size: u64 },
    #[error("Address {addr:#x} is outside the {len:#x}-byte window at {base:#x}")]
    OutOfWindow { addr: u64, base: u64, len: u64 },
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Ordered, non-cached 32-bit access to physical addresses.
///
/// Accesses are treated as always succeeding; a backend that can fault
/// must absorb the fault itself.
pub trait Mmio {
    fn read_u32(&self, addr: u64) -> u32;
    fn write_u32(&mut self, addr: u64, value: u32);
}

/// Single-threaded shared handle, so the controller and the indicator can
/// sit on the same bus.
impl<T: Mmio> Mmio for Rc<RefCell<T>> {
    fn read_u32(&self, addr: u64) -> u32 {
        self.borrow().read_u32(addr)
    }

    fn write_u32(&mut self, addr: u64, value: u32) {
        self.borrow_mut().write_u32(addr, value)
    }
}

impl<T: Mmio + ?Sized> Mmio for &mut T {
    fn read_u32(&self, addr: u64) -> u32 {
        (**self).read_u32(addr)
    }

    fn write_u32(&mut self, addr: u64, value: u32) {
        (**self).write_u32(addr, value)
    }
}

/// Trait representing a memory-mapped simulated device
pub trait Peripheral: std::fmt::Debug {
    fn read(&self, offset: u64) -> HarnessResult<u32>;
    fn write(&mut self, offset: u64, value: u32) -> HarnessResult<()>;
    /// Advance the device by one heartbeat.
    fn tick(&mut self) {}
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}
