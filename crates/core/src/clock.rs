// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::time::Duration;

/// The poll loop's only suspension point.
pub trait Clock {
    fn sleep(&mut self, period: Duration);
}

/// Virtual time: records sleeps without waiting.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    elapsed: Duration,
    sleeps: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn sleeps(&self) -> u64 {
        self.sleeps
    }
}

impl Clock for ManualClock {
    fn sleep(&mut self, period: Duration) {
        self.elapsed += period;
        self.sleeps += 1;
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn sleep(&mut self, period: Duration) {
        (**self).sleep(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_accumulates() {
        let mut clock = ManualClock::new();
        clock.sleep(Duration::from_millis(250));
        clock.sleep(Duration::from_millis(250));
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
        assert_eq!(clock.sleeps(), 2);
    }
}
