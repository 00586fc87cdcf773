// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use serde::Serialize;

/// Counters kept by the poll loop over a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoopMetrics {
    pub ticks: u64,
    /// Non-blank lines handed to the dispatcher.
    pub lines: u64,
    pub rejected: u64,
    /// Input bytes discarded because the line was already full.
    pub dropped_bytes: u64,
    pub done_pulses: u64,
}
