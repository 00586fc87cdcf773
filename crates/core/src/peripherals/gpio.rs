// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::HarnessResult;
use std::any::Any;

/// AXI GPIO single-channel peripheral (indicator LEDs).
#[derive(Debug)]
pub struct GpioPort {
    data: u32, // 0x00: channel data
    tri: u32,  // 0x04: tri-state control, 1 = input
    toggles: u64,
}

impl Default for GpioPort {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort {
    pub fn new() -> Self {
        Self {
            data: 0,
            tri: 0xFFFF_FFFF, // Reset value: all inputs
            toggles: 0,
        }
    }

    pub fn data(&self) -> u32 {
        self.data
    }

    pub fn tri(&self) -> u32 {
        self.tri
    }

    /// Number of writes that changed the driven level.
    pub fn toggles(&self) -> u64 {
        self.toggles
    }

    /// Level actually driven on pin 0, `None` while the pin is an input.
    pub fn pin0(&self) -> Option<bool> {
        if self.tri & 1 != 0 {
            None
        } else {
            Some(self.data & 1 != 0)
        }
    }
}

impl crate::Peripheral for GpioPort {
    fn read(&self, offset: u64) -> HarnessResult<u32> {
        Ok(match offset {
            0x00 => self.data,
            0x04 => self.tri,
            _ => 0,
        })
    }

    fn write(&mut self, offset: u64, value: u32) -> HarnessResult<()> {
        match offset {
            0x00 => {
                if value != self.data {
                    self.toggles += 1;
                }
                self.data = value;
            }
            0x04 => self.tri = value,
            _ => {}
        }
        Ok(())
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

    #[test]
    fn test_pin_follows_direction() {
        let mut gpio = GpioPort::new();
        gpio.write(0x00, 1).unwrap();
        assert_eq!(gpio.pin0(), None);

        gpio.write(0x04, 0).unwrap();
        assert_eq!(gpio.pin0(), Some(true));
        gpio.write(0x00, 0).unwrap();
        assert_eq!(gpio.pin0(), Some(false));
        assert_eq!(gpio.toggles(), 2);
        assert_eq!(gpio.read(0x04).unwrap(), 0);
    }
}
