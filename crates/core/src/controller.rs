// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! PRBS generator driver.
//!
//! CTRL has no bitfield-granular write, so every control change rewrites the
//! whole word from the shadow `(enable, mode)` pair plus at most one one-shot
//! pulse. The pulses are never stored in the shadow.

use crate::regs::{
    CtrlFlags, PrbsReg, RegisterBlock, StatusFlags, CTRL_MODE_MASK, CTRL_MODE_SHIFT, SEED_MASK,
};
use crate::Mmio;
use prbs_config::PrbsDefaults;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Polynomial length selector as encoded in CTRL[5:4].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrbsMode {
    Prbs7 = 0,
    Prbs15 = 1,
    Prbs23 = 2,
    Prbs31 = 3,
}

impl PrbsMode {
    /// Only the low two bits are significant.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0 => PrbsMode::Prbs7,
            1 => PrbsMode::Prbs15,
            2 => PrbsMode::Prbs23,
            _ => PrbsMode::Prbs31,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn polynomial_length(self) -> u32 {
        match self {
            PrbsMode::Prbs7 => 7,
            PrbsMode::Prbs15 => 15,
            PrbsMode::Prbs23 => 23,
            PrbsMode::Prbs31 => 31,
        }
    }
}

impl Default for PrbsMode {
    fn default() -> Self {
        PrbsMode::Prbs31
    }
}

/// One-shot bit carried by a single CTRL write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    None,
    SwReset,
    Clear,
}

/// Software copy of configuration the hardware cannot report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowConfig {
    pub mode: PrbsMode,
    pub enable: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            mode: PrbsMode::Prbs31,
            enable: true,
        }
    }
}

impl ShadowConfig {
    pub fn ctrl_word(&self, pulse: Pulse) -> u32 {
        let mut flags = CtrlFlags::empty();
        flags.set(CtrlFlags::ENABLE, self.enable);
        match pulse {
            Pulse::None => {}
            Pulse::SwReset => flags |= CtrlFlags::SW_RESET,
            Pulse::Clear => flags |= CtrlFlags::CLEAR,
        }
        flags.bits() | ((self.mode.bits() << CTRL_MODE_SHIFT) & CTRL_MODE_MASK)
    }
}

/// Point-in-time view of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub done: bool,
    pub mode: u32,
    pub enable: bool,
    pub frame_len: u32,
    pub byte_count: u32,
    pub bit_count: u32,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[PRBS] STATUS: RUNNING={} DONE={}  MODE={}  ENABLE={}  FRAME={}  BYTECNT={}  BITCNT={}",
            self.running as u8,
            self.done as u8,
            self.mode,
            self.enable as u8,
            self.frame_len,
            self.byte_count,
            self.bit_count
        )
    }
}

#[derive(Debug)]
pub struct PrbsController<M> {
    regs: RegisterBlock<M>,
    shadow: ShadowConfig,
}

impl<M: Mmio> PrbsController<M> {
    pub fn new(mmio: M, base: u64) -> Self {
        Self {
            regs: RegisterBlock::new(mmio, base),
            shadow: ShadowConfig::default(),
        }
    }

    pub fn shadow(&self) -> ShadowConfig {
        self.shadow
    }

    pub fn base(&self) -> u64 {
        self.regs.base()
    }

    pub fn registers(&self) -> &RegisterBlock<M> {
        &self.regs
    }

    /// Power-on programming: shadow state, seed, frame length, then a reset
    /// pulse and a separate counter-clear pulse.
    pub fn initialize(&mut self, defaults: &PrbsDefaults) {
        self.shadow = ShadowConfig {
            mode: PrbsMode::from_bits(defaults.mode),
            enable: defaults.enable,
        };
        self.set_seed(defaults.seed);
        self.set_frame_length(defaults.frame_len);
        self.write_ctrl(Pulse::SwReset);
        self.write_ctrl(Pulse::Clear);
    }

    fn write_ctrl(&mut self, pulse: Pulse) {
        let word = self.shadow.ctrl_word(pulse);
        debug!("CTRL <= {:#010x} ({:?})", word, pulse);
        self.regs.write(PrbsReg::Ctrl, word);
    }

    pub fn enable(&mut self, flag: bool) {
        self.shadow.enable = flag;
        self.write_ctrl(Pulse::None);
    }

    /// A polynomial change is only meaningful from a clean state, so it
    /// always carries a reset pulse.
    pub fn set_mode(&mut self, mode: u32) {
        self.shadow.mode = PrbsMode::from_bits(mode);
        self.write_ctrl(Pulse::SwReset);
    }

    /// 0 selects continuous output with no frame boundary.
    pub fn set_frame_length(&mut self, len: u32) {
        debug!("FRAME_LEN <= {}", len);
        self.regs.write(PrbsReg::FrameLen, len);
    }

    /// The device coerces a zero seed to 1, so readback may differ.
    pub fn set_seed(&mut self, seed: u32) {
        let seed = seed & SEED_MASK;
        debug!("SEED <= {:#010x}", seed);
        self.regs.write(PrbsReg::Seed, seed);
    }

    pub fn reset(&mut self) {
        self.write_ctrl(Pulse::SwReset);
    }

    pub fn clear_counters(&mut self) {
        self.write_ctrl(Pulse::Clear);
    }

    /// W1C on DONE with a fresh word, never read-modify-write.
    pub fn clear_done(&mut self) {
        debug!("STATUS <= DONE (w1c)");
        self.regs.write(PrbsReg::Status, StatusFlags::DONE.bits());
    }

    pub fn status_flags(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.regs.read(PrbsReg::Status))
    }

    pub fn byte_count(&self) -> u32 {
        self.regs.read(PrbsReg::ByteCount)
    }

    pub fn read_status(&self) -> StatusSnapshot {
        let status = self.status_flags();
        let byte_count = self.regs.read(PrbsReg::ByteCount);
        let bit_count = self.regs.read(PrbsReg::BitCount);
        StatusSnapshot {
            running: status.contains(StatusFlags::RUNNING),
            done: status.contains(StatusFlags::DONE),
            mode: self.shadow.mode.bits(),
            enable: self.shadow.enable,
            frame_len: self.regs.read(PrbsReg::FrameLen),
            byte_count,
            bit_count,
        }
    }
}
