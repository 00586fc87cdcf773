// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Host-side board: the simulated bus wired up per [`BoardConfig`], with a
//! clock that advances the hardware once per heartbeat.

use crate::bus::SystemBus;
use crate::clock::Clock;
use crate::controller::PrbsController;
use crate::indicator::Indicator;
use crate::peripherals::{gpio::GpioPort, prbs::PrbsGenerator};
use crate::poll::PollLoop;
use crate::transport::Transport;
use crate::HarnessResult;
use prbs_config::BoardConfig;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub type SharedBus = Rc<RefCell<SystemBus>>;

#[derive(Debug)]
pub struct SimulatedBoard {
    bus: SharedBus,
    config: BoardConfig,
}

impl SimulatedBoard {
    pub fn new(config: BoardConfig) -> HarnessResult<Self> {
        let bus = SystemBus::from_config(&config)?;
        Ok(Self {
            bus: Rc::new(RefCell::new(bus)),
            config,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn bus(&self) -> SharedBus {
        Rc::clone(&self.bus)
    }

    pub fn controller(&self) -> PrbsController<SharedBus> {
        PrbsController::new(self.bus(), self.config.prbs_base)
    }

    pub fn indicator(&self) -> Indicator<SharedBus> {
        Indicator::new(self.bus(), self.config.led_base, self.config.led_polarity)
    }

    pub fn clock(&self, realtime: bool) -> TickingClock {
        TickingClock {
            bus: self.bus(),
            realtime,
            ticks: 0,
        }
    }

    pub fn poll_loop<T: Transport>(
        &self,
        transport: T,
        realtime: bool,
    ) -> PollLoop<SharedBus, T, TickingClock> {
        PollLoop::new(
            self.controller(),
            self.indicator(),
            transport,
            self.clock(realtime),
            &self.config,
        )
    }

    /// Run `f` against the simulated generator.
    pub fn with_generator<R>(&self, f: impl FnOnce(&mut PrbsGenerator) -> R) -> Option<R> {
        let mut bus = self.bus.borrow_mut();
        let result = bus.device_mut::<PrbsGenerator>("prbs").map(f);
        result
    }

    pub fn with_gpio<R>(&self, f: impl FnOnce(&GpioPort) -> R) -> Option<R> {
        let bus = self.bus.borrow();
        let result = bus.device::<GpioPort>("led").map(f);
        result
    }
}

/// Advances every simulated device once per sleep, optionally also waiting
/// in real time.
#[derive(Debug)]
pub struct TickingClock {
    bus: SharedBus,
    realtime: bool,
    ticks: u64,
}

impl TickingClock {
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for TickingClock {
    fn sleep(&mut self, period: Duration) {
        if self.realtime {
            std::thread::sleep(period);
        }
        self.bus.borrow_mut().tick_peripherals();
        self.ticks += 1;
    }
}
