// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::regs::{GpioReg, RegisterBlock};
use crate::Mmio;
use prbs_config::LedPolarity;

/// Heartbeat LED on an AXI GPIO channel.
#[derive(Debug)]
pub struct Indicator<M> {
    regs: RegisterBlock<M>,
    polarity: LedPolarity,
    lit: bool,
}

impl<M: Mmio> Indicator<M> {
    /// Starts logically off; nothing is written until the first level change.
    pub fn new(mmio: M, base: u64, polarity: LedPolarity) -> Self {
        Self {
            regs: RegisterBlock::new(mmio, base),
            polarity,
            lit: false,
        }
    }

    pub fn base(&self) -> u64 {
        self.regs.base()
    }

    /// All pins to output. Done once at startup.
    pub fn configure_output(&mut self) {
        self.regs.write(GpioReg::Tri, 0x0000_0000);
    }

    pub fn set(&mut self, on: bool) {
        self.lit = on;
        let level = if on {
            self.polarity.on_level()
        } else {
            self.polarity.off_level()
        };
        self.regs.write(GpioReg::Data, level);
    }

    pub fn toggle(&mut self) -> bool {
        self.set(!self.lit);
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct LastWrite(Cell<Option<(u64, u32)>>);

    impl Mmio for LastWrite {
        fn read_u32(&self, _addr: u64) -> u32 {
            0
        }
        fn write_u32(&mut self, addr: u64, value: u32) {
            self.0.set(Some((addr, value)));
        }
    }

    #[test]
    fn test_active_high_toggle() {
        let mut led = Indicator::new(LastWrite::default(), 0x4000, LedPolarity::ActiveHigh);
        assert!(led.toggle());
        assert_eq!(led.regs.mmio().0.get(), Some((0x4000, 1)));
        assert!(!led.toggle());
        assert_eq!(led.regs.mmio().0.get(), Some((0x4000, 0)));
    }

    #[test]
    fn test_active_low_inverts_level() {
        let mut led = Indicator::new(LastWrite::default(), 0x4000, LedPolarity::ActiveLow);
        led.set(true);
        assert_eq!(led.regs.mmio().0.get(), Some((0x4000, 0)));
        led.set(false);
        assert_eq!(led.regs.mmio().0.get(), Some((0x4000, 1)));
    }

    #[test]
    fn test_configure_output_clears_tri() {
        let mut led = Indicator::new(LastWrite::default(), 0x4000, LedPolarity::ActiveHigh);
        led.configure_output();
        assert_eq!(led.regs.mmio().0.get(), Some((0x4004, 0)));
    }
}
