// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Register map of the PRBS block and the indicator GPIO, plus the typed
//! base+offset accessor both drivers use.

use crate::Mmio;
use bitflags::bitflags;

/// A register that lives at a fixed offset from its device base.
pub trait RegisterOffset: Copy {
    fn offset(self) -> u64;
}

/// PRBS AXI-Lite register offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrbsReg {
    Ctrl,
    Status,
    Seed,
    FrameLen,
    ByteCount,
    BitCount,
}

impl PrbsReg {
    pub fn from_offset(offset: u64) -> Option<Self> {
        match offset {
            0x00 => Some(PrbsReg::Ctrl),
            0x04 => Some(PrbsReg::Status),
            0x08 => Some(PrbsReg::Seed),
            0x0C => Some(PrbsReg::FrameLen),
            0x18 => Some(PrbsReg::ByteCount),
            0x1C => Some(PrbsReg::BitCount),
            _ => None,
        }
    }
}

impl RegisterOffset for PrbsReg {
    fn offset(self) -> u64 {
        match self {
            PrbsReg::Ctrl => 0x00,
            PrbsReg::Status => 0x04,
            PrbsReg::Seed => 0x08,
            PrbsReg::FrameLen => 0x0C,
            PrbsReg::ByteCount => 0x18,
            PrbsReg::BitCount => 0x1C,
        }
    }
}

/// AXI GPIO channel 1 register offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioReg {
    Data,
    Tri,
}

impl RegisterOffset for GpioReg {
    fn offset(self) -> u64 {
        match self {
            GpioReg::Data => 0x0,
            GpioReg::Tri => 0x4,
        }
    }
}

bitflags! {
    /// CTRL single-bit fields. The mode selector is a 2-bit field at
    /// [`CTRL_MODE_SHIFT`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CtrlFlags: u32 {
        const ENABLE = 1 << 0;
        const SW_RESET = 1 << 2;
        const CLEAR = 1 << 15;
    }
}

bitflags! {
    /// STATUS bits. DONE is write-one-to-clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u32 {
        const RUNNING = 1 << 0;
        const DONE = 1 << 8;
    }
}

pub const CTRL_MODE_SHIFT: u32 = 4;
pub const CTRL_MODE_MASK: u32 = 0b11 << CTRL_MODE_SHIFT;

/// SEED is 31 bits wide.
pub const SEED_MASK: u32 = 0x7FFF_FFFF;

/// Typed register access over `base + offset`.
#[derive(Debug)]
pub struct RegisterBlock<M> {
    mmio: M,
    base: u64,
}

impl<M: Mmio> RegisterBlock<M> {
    pub fn new(mmio: M, base: u64) -> Self {
        Self { mmio, base }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn read<R: RegisterOffset>(&self, reg: R) -> u32 {
        self.mmio.read_u32(self.base.wrapping_add(reg.offset()))
    }

    pub fn write<R: RegisterOffset>(&mut self, reg: R, value: u32) {
        self.mmio.write_u32(self.base.wrapping_add(reg.offset()), value)
    }

    pub fn mmio(&self) -> &M {
        &self.mmio
    }
}
