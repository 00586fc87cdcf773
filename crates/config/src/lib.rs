// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Size of the PRBS register window (CTRL..BIT_COUNT inclusive).
pub const PRBS_WINDOW_SIZE: u64 = 0x20;
/// Size of the AXI GPIO window used for the indicator (DATA + TRI).
pub const LED_WINDOW_SIZE: u64 = 0x08;

/// Electrical polarity of the heartbeat indicator.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedPolarity {
    /// Writing 1 lights the indicator.
    ActiveHigh,
    /// Writing 1 turns the indicator off.
    ActiveLow,
}

impl LedPolarity {
    /// Register level that lights the indicator.
    pub fn on_level(self) -> u32 {
        match self {
            LedPolarity::ActiveHigh => 1,
            LedPolarity::ActiveLow => 0,
        }
    }

    /// Register level that darkens the indicator.
    pub fn off_level(self) -> u32 {
        self.on_level() ^ 1
    }
}

impl Default for LedPolarity {
    fn default() -> Self {
        if cfg!(feature = "led-active-low") {
            LedPolarity::ActiveLow
        } else {
            LedPolarity::ActiveHigh
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown LED polarity '{0}' (expected 'active-high' or 'active-low')")]
pub struct ParsePolarityError(String);

impl FromStr for LedPolarity {
    type Err = ParsePolarityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active-high" | "active_high" | "high" => Ok(LedPolarity::ActiveHigh),
            "active-low" | "active_low" | "low" => Ok(LedPolarity::ActiveLow),
            other => Err(ParsePolarityError(other.to_string())),
        }
    }
}

/// Power-on programming of the generator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PrbsDefaults {
    /// Polynomial selector, 0:PRBS7 1:PRBS15 2:PRBS23 3:PRBS31
    pub mode: u32,
    pub enable: bool,
    pub seed: u32,
    /// Frame length in bytes, 0 means continuous.
    pub frame_len: u32,
}

impl Default for PrbsDefaults {
    fn default() -> Self {
        Self {
            mode: 3,
            enable: true,
            seed: 1,
            frame_len: 256,
        }
    }
}

/// Knobs for the host-side simulated generator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Bytes produced by the simulated generator per heartbeat.
    pub bytes_per_tick: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { bytes_per_tick: 64 }
    }
}

/// Board description: where the devices live and how the harness behaves.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    pub name: String,
    pub prbs_base: u64,
    pub led_base: u64,
    pub led_polarity: LedPolarity,
    pub heartbeat_ms: u64,
    /// Maximum number of characters kept per command line.
    pub line_capacity: usize,
    pub defaults: PrbsDefaults,
    pub simulation: SimulationConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "zynqmp-prbs".to_string(),
            prbs_base: 0xA000_0000,
            led_base: 0xA001_0000,
            led_polarity: LedPolarity::default(),
            heartbeat_ms: 250,
            line_capacity: 95,
            defaults: PrbsDefaults::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board config at {:?}", path.as_ref()))?;
        let config: Self =
            serde_yaml::from_reader(f).context("Failed to parse Board Config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse Board Config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prbs_base % 4 != 0 {
            anyhow::bail!("'prbs_base' {:#x} is not word aligned", self.prbs_base);
        }
        if self.led_base % 4 != 0 {
            anyhow::bail!("'led_base' {:#x} is not word aligned", self.led_base);
        }

        let Some(prbs_end) = self.prbs_base.checked_add(PRBS_WINDOW_SIZE) else {
            anyhow::bail!(
                "'prbs_base' {:#x} leaves no room for the register window",
                self.prbs_base
            );
        };
        let Some(led_end) = self.led_base.checked_add(LED_WINDOW_SIZE) else {
            anyhow::bail!(
                "'led_base' {:#x} leaves no room for the register window",
                self.led_base
            );
        };
        if self.prbs_base < led_end && self.led_base < prbs_end {
            anyhow::bail!(
                "PRBS window {:#x} and LED window {:#x} overlap",
                self.prbs_base,
                self.led_base
            );
        }

        if self.heartbeat_ms == 0 {
            anyhow::bail!("'heartbeat_ms' must be greater than zero");
        }

        if self.line_capacity == 0 {
            anyhow::bail!("'line_capacity' must be greater than zero");
        }

        if self.defaults.mode > 3 {
            anyhow::bail!(
                "'defaults.mode' {} is out of range (0..=3)",
                self.defaults.mode
            );
        }

        if self.simulation.bytes_per_tick == 0 {
            anyhow::bail!("'simulation.bytes_per_tick' must be greater than zero");
        }

        Ok(())
    }
}
