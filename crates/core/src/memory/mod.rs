// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{HarnessError, HarnessResult, Mmio};
use std::ptr;

/// An already-mapped register window accessed with volatile loads/stores.
///
/// `phys_base` is the address the rest of the harness uses for this window;
/// accesses are translated to `ptr + (addr - phys_base)`. Accesses outside
/// the window are logged and absorbed (reads return 0).
#[derive(Debug)]
pub struct VolatileWindow {
    ptr: *mut u32,
    phys_base: u64,
    len: u64,
}

impl VolatileWindow {
    /// # Safety
    /// `ptr` must be valid for volatile reads and writes of `len` bytes for
    /// the lifetime of the window, and nothing else may alias it.
    pub unsafe fn new(ptr: *mut u32, phys_base: u64, len: u64) -> HarnessResult<Self> {
        if (ptr as usize) % 4 != 0 {
            return Err(HarnessError::Misaligned(ptr as usize as u64));
        }
        if phys_base % 4 != 0 {
            return Err(HarnessError::Misaligned(phys_base));
        }
        Ok(Self {
            ptr,
            phys_base,
            len,
        })
    }

    pub fn phys_base(&self) -> u64 {
        self.phys_base
    }

    fn slot(&self, addr: u64) -> HarnessResult<*mut u32> {
        if addr % 4 != 0 {
            return Err(HarnessError::Misaligned(addr));
        }
        if addr < self.phys_base || addr + 4 > self.phys_base + self.len {
            return Err(HarnessError::OutOfWindow {
                addr,
                base: self.phys_base,
                len: self.len,
            });
        }
        let index = ((addr - self.phys_base) / 4) as usize;
        // SAFETY: index is inside the window checked above.
        Ok(unsafe { self.ptr.add(index) })
    }
}

impl Mmio for VolatileWindow {
    fn read_u32(&self, addr: u64) -> u32 {
        match self.slot(addr) {
            // SAFETY: slot() only hands out in-window aligned pointers.
            Ok(p) => unsafe { ptr::read_volatile(p) },
            Err(e) => {
                tracing::warn!("{}", e);
                0
            }
        }
    }

    fn write_u32(&mut self, addr: u64, value: u32) {
        match self.slot(addr) {
            // SAFETY: slot() only hands out in-window aligned pointers.
            Ok(p) => unsafe { ptr::write_volatile(p, value) },
            Err(e) => tracing::warn!("{}", e),
        }
    }
}
