// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::controller::PrbsMode;
use crate::lfsr::Lfsr;
use crate::regs::{CtrlFlags, PrbsReg, StatusFlags, CTRL_MODE_MASK, CTRL_MODE_SHIFT, SEED_MASK};
use crate::HarnessResult;
use std::any::Any;

/// FRAME_LEN_BYTES is a 16-bit field in hardware.
const FRAME_LEN_MASK: u32 = 0xFFFF;

/// Behavioural model of the PRBS AXI-Stream generator's AXI-Lite side.
#[derive(Debug)]
pub struct PrbsGenerator {
    enable: bool,
    mode: PrbsMode,
    status: StatusFlags,
    seed: u32,
    frame_len: u32,
    byte_count: u32,
    bit_count: u32,
    frame_bytes: u32,
    frames: u64,
    last_ctrl: u32,
    resets: u64,
    clears: u64,
    last_byte: u8,
    lfsr: Lfsr,
    bytes_per_tick: u32,
}

impl PrbsGenerator {
    pub fn new(bytes_per_tick: u32) -> Self {
        Self {
            enable: false,
            mode: PrbsMode::Prbs31,
            status: StatusFlags::empty(),
            seed: 1,
            frame_len: 0,
            byte_count: 0,
            bit_count: 0,
            frame_bytes: 0,
            frames: 0,
            last_ctrl: 0,
            resets: 0,
            clears: 0,
            last_byte: 0,
            lfsr: Lfsr::new(PrbsMode::Prbs31, 1),
            bytes_per_tick,
        }
    }

    pub fn mode(&self) -> PrbsMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enable
    }

    pub fn status(&self) -> StatusFlags {
        self.status
    }

    /// Last word written to CTRL, pulse bits included.
    pub fn last_ctrl(&self) -> u32 {
        self.last_ctrl
    }

    pub fn reset_count(&self) -> u64 {
        self.resets
    }

    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_byte(&self) -> u8 {
        self.last_byte
    }

    pub fn lfsr_state(&self) -> u32 {
        self.lfsr.state()
    }

    /// Latch DONE as the hardware would at a frame boundary.
    pub fn raise_done(&mut self) {
        self.status |= StatusFlags::DONE;
    }

    /// Preset the free-running counters, e.g. to model a long-running stream.
    pub fn set_counters(&mut self, byte_count: u32, bit_count: u32) {
        self.byte_count = byte_count;
        self.bit_count = bit_count;
    }

    fn write_ctrl(&mut self, value: u32) {
        let flags = CtrlFlags::from_bits_truncate(value);
        self.last_ctrl = value;
        self.enable = flags.contains(CtrlFlags::ENABLE);
        self.mode = PrbsMode::from_bits((value & CTRL_MODE_MASK) >> CTRL_MODE_SHIFT);

        if flags.contains(CtrlFlags::SW_RESET) {
            self.resets += 1;
            self.lfsr = Lfsr::new(self.mode, self.seed);
            self.frame_bytes = 0;
            self.status.remove(StatusFlags::RUNNING);
        }
        if flags.contains(CtrlFlags::CLEAR) {
            self.clears += 1;
            self.byte_count = 0;
            self.bit_count = 0;
            self.frame_bytes = 0;
        }
        if !self.enable {
            self.status.remove(StatusFlags::RUNNING);
        }
    }
}

impl crate::Peripheral for PrbsGenerator {
    fn read(&self, offset: u64) -> HarnessResult<u32> {
        Ok(match PrbsReg::from_offset(offset) {
            Some(PrbsReg::Ctrl) => {
                // Pulses self-clear; only the latched fields read back.
                let mut flags = CtrlFlags::empty();
                flags.set(CtrlFlags::ENABLE, self.enable);
                flags.bits() | (self.mode.bits() << CTRL_MODE_SHIFT)
            }
            Some(PrbsReg::Status) => self.status.bits(),
            Some(PrbsReg::Seed) => self.seed,
            Some(PrbsReg::FrameLen) => self.frame_len,
            Some(PrbsReg::ByteCount) => self.byte_count,
            Some(PrbsReg::BitCount) => self.bit_count,
            None => 0,
        })
    }

    fn write(&mut self, offset: u64, value: u32) -> HarnessResult<()> {
        match PrbsReg::from_offset(offset) {
            Some(PrbsReg::Ctrl) => self.write_ctrl(value),
            Some(PrbsReg::Status) => {
                // W1C on DONE; RUNNING is hardware-owned.
                if value & StatusFlags::DONE.bits() != 0 {
                    self.status.remove(StatusFlags::DONE);
                }
            }
            Some(PrbsReg::Seed) => {
                let seed = value & SEED_MASK;
                self.seed = if seed == 0 { 1 } else { seed };
            }
            Some(PrbsReg::FrameLen) => self.frame_len = value & FRAME_LEN_MASK,
            // Counters are read-only.
            Some(PrbsReg::ByteCount) | Some(PrbsReg::BitCount) | None => {}
        }
        Ok(())
    }

    fn tick(&mut self) {
        if !self.enable {
            self.status.remove(StatusFlags::RUNNING);
            return;
        }
        self.status |= StatusFlags::RUNNING;

        for _ in 0..self.bytes_per_tick {
            self.last_byte = self.lfsr.next_byte();
            self.byte_count = self.byte_count.wrapping_add(1);
            self.bit_count = self.bit_count.wrapping_add(8);

            if self.frame_len != 0 {
                self.frame_bytes += 1;
                if self.frame_bytes >= self.frame_len {
                    self.frame_bytes = 0;
                    self.frames += 1;
                    self.status |= StatusFlags::DONE;
                }
            }
        }
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Peripheral;

    const ENABLED_PRBS31: u32 = 0x31;

    #[test]
    fn test_idle_until_enabled() {
        let mut dev = PrbsGenerator::new(4);
        dev.tick();
        assert_eq!(dev.read(0x04).unwrap(), 0);
        assert_eq!(dev.read(0x18).unwrap(), 0);

        dev.write(0x00, ENABLED_PRBS31).unwrap();
        dev.tick();
        assert_eq!(dev.read(0x04).unwrap(), StatusFlags::RUNNING.bits());
        assert_eq!(dev.read(0x18).unwrap(), 4);
        assert_eq!(dev.read(0x1C).unwrap(), 32);
    }

    #[test]
    fn test_frame_boundary_latches_done() {
        let mut dev = PrbsGenerator::new(4);
        dev.write(0x0C, 6).unwrap();
        dev.write(0x00, ENABLED_PRBS31).unwrap();

        dev.tick();
        assert!(!dev.status().contains(StatusFlags::DONE));
        dev.tick();
        assert!(dev.status().contains(StatusFlags::DONE));
        assert_eq!(dev.frames(), 1);
    }

    #[test]
    fn test_continuous_mode_never_done() {
        let mut dev = PrbsGenerator::new(64);
        dev.write(0x0C, 0).unwrap();
        dev.write(0x00, ENABLED_PRBS31).unwrap();
        for _ in 0..100 {
            dev.tick();
        }
        assert!(!dev.status().contains(StatusFlags::DONE));
        assert_eq!(dev.read(0x18).unwrap(), 6400);
    }

    #[test]
    fn test_done_is_write_one_to_clear() {
        let mut dev = PrbsGenerator::new(1);
        dev.write(0x00, ENABLED_PRBS31).unwrap();
        dev.tick();
        dev.raise_done();

        dev.write(0x04, 0).unwrap();
        assert!(dev.status().contains(StatusFlags::DONE));

        dev.write(0x04, StatusFlags::DONE.bits()).unwrap();
        assert_eq!(dev.status(), StatusFlags::RUNNING);
    }

    #[test]
    fn test_ctrl_writes_do_not_touch_done() {
        let mut dev = PrbsGenerator::new(1);
        dev.raise_done();
        dev.write(0x00, ENABLED_PRBS31 | CtrlFlags::SW_RESET.bits()).unwrap();
        dev.write(0x00, ENABLED_PRBS31 | CtrlFlags::CLEAR.bits()).unwrap();
        assert!(dev.status().contains(StatusFlags::DONE));
    }

    #[test]
    fn test_seed_masked_and_zero_coerced() {
        let mut dev = PrbsGenerator::new(1);
        dev.write(0x08, 0xFFFF_FFFF).unwrap();
        assert_eq!(dev.read(0x08).unwrap(), 0x7FFF_FFFF);
        dev.write(0x08, 0).unwrap();
        assert_eq!(dev.read(0x08).unwrap(), 1);
    }

    #[test]
    fn test_frame_len_is_sixteen_bits() {
        let mut dev = PrbsGenerator::new(1);
        dev.write(0x0C, 0x1_0010).unwrap();
        assert_eq!(dev.read(0x0C).unwrap(), 0x10);
    }

    #[test]
    fn test_clear_zeroes_counters_and_reset_reseeds() {
        let mut dev = PrbsGenerator::new(8);
        dev.write(0x08, 0x1234).unwrap();
        dev.write(0x00, ENABLED_PRBS31 | CtrlFlags::SW_RESET.bits()).unwrap();
        let seeded = dev.lfsr_state();
        assert_eq!(seeded, 0x1234);
        dev.tick();
        assert_ne!(dev.lfsr_state(), seeded);

        dev.write(0x00, ENABLED_PRBS31 | CtrlFlags::CLEAR.bits()).unwrap();
        assert_eq!(dev.read(0x18).unwrap(), 0);
        assert_eq!(dev.read(0x1C).unwrap(), 0);
        assert_eq!(dev.clear_count(), 1);
        assert_eq!(dev.reset_count(), 1);
    }

    #[test]
    fn test_ctrl_readback_drops_pulses() {
        let mut dev = PrbsGenerator::new(1);
        dev.write(0x00, 0x15).unwrap();
        assert_eq!(dev.last_ctrl(), 0x15);
        assert_eq!(dev.read(0x00).unwrap(), 0x11);
        assert_eq!(dev.mode(), PrbsMode::Prbs15);
    }
}
