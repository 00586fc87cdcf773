// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::peripherals::{gpio::GpioPort, prbs::PrbsGenerator};
use crate::{HarnessError, HarnessResult, Mmio, Peripheral};
use prbs_config::{BoardConfig, LED_WINDOW_SIZE, PRBS_WINDOW_SIZE};

#[derive(Debug)]
pub struct PeripheralEntry {
    pub name: String,
    pub base: u64,
    pub size: u64,
    pub dev: Box<dyn Peripheral>,
}

impl PeripheralEntry {
    fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}

/// Address-decoded set of simulated devices.
#[derive(Debug, Default)]
pub struct SystemBus {
    pub peripherals: Vec<PeripheralEntry>,
}

impl SystemBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// PRBS generator plus indicator GPIO at the configured addresses.
    pub fn from_config(config: &BoardConfig) -> HarnessResult<Self> {
        let mut bus = Self::new();
        bus.attach(
            "prbs",
            config.prbs_base,
            PRBS_WINDOW_SIZE,
            Box::new(PrbsGenerator::new(config.simulation.bytes_per_tick)),
        )?;
        bus.attach("led", config.led_base, LED_WINDOW_SIZE, Box::new(GpioPort::new()))?;
        Ok(bus)
    }

    pub fn attach(
        &mut self,
        name: &str,
        base: u64,
        size: u64,
        dev: Box<dyn Peripheral>,
    ) -> HarnessResult<()> {
        let end = base
            .checked_add(size)
            .ok_or_else(|| HarnessError::WindowOverflow {
                name: name.to_string(),
                base,
                size,
            })?;
        // Attached windows never wrap, so their end is representable.
        if let Some(other) = self
            .peripherals
            .iter()
            .find(|p| base < p.base + p.size && p.base < end)
        {
            return Err(HarnessError::Overlap {
                name: name.to_string(),
                base,
                other: other.name.clone(),
            });
        }
        tracing::debug!("Attached '{}' at {:#x} (+{:#x})", name, base, size);
        self.peripherals.push(PeripheralEntry {
            name: name.to_string(),
            base,
            size,
            dev,
        });
        Ok(())
    }

    fn decode(&self, addr: u64) -> HarnessResult<usize> {
        if addr % 4 != 0 {
            return Err(HarnessError::Misaligned(addr));
        }
        self.peripherals
            .iter()
            .position(|p| p.contains(addr))
            .ok_or(HarnessError::Unmapped(addr))
    }

    pub fn read(&self, addr: u64) -> HarnessResult<u32> {
        let entry = &self.peripherals[self.decode(addr)?];
        entry.dev.read(addr - entry.base)
    }

    pub fn write(&mut self, addr: u64, value: u32) -> HarnessResult<()> {
        let index = self.decode(addr)?;
        let entry = &mut self.peripherals[index];
        entry.dev.write(addr - entry.base, value)
    }

    pub fn tick_peripherals(&mut self) {
        for p in &mut self.peripherals {
            p.dev.tick();
        }
    }

    /// Downcast a named device, for inspection and fault injection.
    pub fn device<T: 'static>(&self, name: &str) -> Option<&T> {
        self.peripherals
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any())
            .and_then(|any| any.downcast_ref::<T>())
    }

    pub fn device_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.peripherals
            .iter_mut()
            .find(|p| p.name == name)
            .and_then(|p| p.dev.as_any_mut())
            .and_then(|any| any.downcast_mut::<T>())
    }
}

/// Faults are outside the register model: log and absorb.
impl Mmio for SystemBus {
    fn read_u32(&self, addr: u64) -> u32 {
        self.read(addr).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            0
        })
    }

    fn write_u32(&mut self, addr: u64, value: u32) {
        if let Err(e) = self.write(addr, value) {
            tracing::warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_to_devices() {
        let config = BoardConfig::default();
        let mut bus = SystemBus::from_config(&config).unwrap();

        bus.write(config.prbs_base + 0x0C, 128).unwrap();
        assert_eq!(bus.read(config.prbs_base + 0x0C).unwrap(), 128);

        bus.write(config.led_base + 0x4, 0).unwrap();
        let gpio = bus.device::<GpioPort>("led").unwrap();
        assert_eq!(gpio.tri(), 0);
    }

    #[test]
    fn test_unmapped_and_misaligned() {
        let mut bus = SystemBus::from_config(&BoardConfig::default()).unwrap();
        assert_eq!(bus.read(0x10), Err(HarnessError::Unmapped(0x10)));
        assert_eq!(
            bus.write(0xA000_0002, 1),
            Err(HarnessError::Misaligned(0xA000_0002))
        );
        // The Mmio view absorbs faults.
        assert_eq!(bus.read_u32(0x10), 0);
        bus.write_u32(0x10, 1);
    }

    #[test]
    fn test_overlap_rejected() {
        let mut bus = SystemBus::new();
        bus.attach("a", 0x1000, 0x20, Box::new(GpioPort::new()))
            .unwrap();
        let err = bus
            .attach("b", 0x1010, 0x8, Box::new(GpioPort::new()))
            .unwrap_err();
        assert!(matches!(err, HarnessError::Overlap { ref other, .. } if other == "a"));
    }

    #[test]
    fn test_window_overflow_rejected() {
        let mut bus = SystemBus::new();
        let err = bus
            .attach("prbs", 0xFFFF_FFFF_FFFF_FFF0, 0x20, Box::new(GpioPort::new()))
            .unwrap_err();
        assert!(matches!(err, HarnessError::WindowOverflow { ref name, .. } if name == "prbs"));
        assert!(bus.peripherals.is_empty());

        // The last window that still fits decodes up to the top word.
        bus.attach("top", 0xFFFF_FFFF_FFFF_FFF8, 0x8, Box::new(GpioPort::new()))
            .unwrap();
        assert_eq!(bus.read(0xFFFF_FFFF_FFFF_FFFC).unwrap(), 0xFFFF_FFFF);
        assert_eq!(
            bus.read(0xFFFF_FFFF_FFFF_FFF4),
            Err(HarnessError::Unmapped(0xFFFF_FFFF_FFFF_FFF4))
        );
    }

    #[test]
    fn test_device_downcast() {
        let bus = SystemBus::from_config(&BoardConfig::default()).unwrap();
        assert!(bus.device::<PrbsGenerator>("prbs").is_some());
        assert!(bus.device::<GpioPort>("prbs").is_none());
        assert!(bus.device::<GpioPort>("missing").is_none());
    }
}
