// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Fibonacci LFSR pattern source used by the simulated generator.
//!
//! Polynomials follow ITU-T O.150: x^7+x^6+1, x^15+x^14+1, x^23+x^18+1 and
//! x^31+x^28+1. Each produces a maximal-length sequence of period 2^n - 1.

use crate::controller::PrbsMode;

#[derive(Debug, Clone)]
pub struct Lfsr {
    state: u32,
    degree: u32,
    tap: u32,
    mask: u32,
}

impl Lfsr {
    /// A zero seed would lock the register, so it is coerced to 1.
    pub fn new(mode: PrbsMode, seed: u32) -> Self {
        let (degree, tap) = match mode {
            PrbsMode::Prbs7 => (7, 6),
            PrbsMode::Prbs15 => (15, 14),
            PrbsMode::Prbs23 => (23, 18),
            PrbsMode::Prbs31 => (31, 28),
        };
        let mask = (1u32 << degree) - 1;
        let mut state = seed & mask;
        if state == 0 {
            state = 1;
        }
        Self {
            state,
            degree,
            tap,
            mask,
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_bit(&mut self) -> bool {
        let bit = ((self.state >> (self.degree - 1)) ^ (self.state >> (self.tap - 1))) & 1;
        self.state = ((self.state << 1) | bit) & self.mask;
        bit != 0
    }

    /// Next eight bits, first bit out in the MSB.
    pub fn next_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.next_bit() as u8;
        }
        byte
    }
}
