// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The cooperative scheduler tick.
//!
//! One iteration: sleep the heartbeat period, toggle the indicator, drain
//! whatever input is ready, then sample STATUS once for the RUNNING and DONE
//! edges. The sleep is the only suspension point.

use crate::clock::Clock;
use crate::controller::PrbsController;
use crate::dispatch::{dispatch, Outcome, HELP_TEXT};
use crate::indicator::Indicator;
use crate::line::{LineBuffer, LineEvent};
use crate::metrics::LoopMetrics;
use crate::regs::StatusFlags;
use crate::transport::Transport;
use crate::Mmio;
use prbs_config::{BoardConfig, PrbsDefaults};
use std::time::Duration;
use tracing::info;

pub const PROMPT: &str = "> ";

#[derive(Debug)]
pub struct PollLoop<M, T, C> {
    controller: PrbsController<M>,
    indicator: Indicator<M>,
    line: LineBuffer,
    transport: T,
    clock: C,
    heartbeat: Duration,
    running_notified: bool,
    metrics: LoopMetrics,
}

impl<M: Mmio, T: Transport, C: Clock> PollLoop<M, T, C> {
    pub fn new(
        controller: PrbsController<M>,
        indicator: Indicator<M>,
        transport: T,
        clock: C,
        config: &BoardConfig,
    ) -> Self {
        Self {
            controller,
            indicator,
            line: LineBuffer::new(config.line_capacity),
            transport,
            clock,
            heartbeat: Duration::from_millis(config.heartbeat_ms),
            running_notified: false,
            metrics: LoopMetrics::default(),
        }
    }

    /// Banner, indicator direction, generator defaults, help and prompt.
    pub fn start(&mut self, defaults: &PrbsDefaults) {
        self.transport.write_str(&format!(
            "\r\n[Bring-up] LED + UART + PRBS (CLI)\r\n LED_BASE={:#010x}  PRBS_BASE={:#010x}\r\n",
            self.indicator.base(),
            self.controller.base()
        ));
        self.indicator.configure_output();
        self.controller.initialize(defaults);
        info!(
            "PRBS initialized: mode={} enable={} seed={:#x} frame_len={}",
            defaults.mode, defaults.enable, defaults.seed, defaults.frame_len
        );
        self.transport.write_str(HELP_TEXT);
        self.transport.write_str(PROMPT);
    }

    pub fn tick(&mut self) {
        self.clock.sleep(self.heartbeat);
        self.indicator.toggle();
        self.drain_input();
        self.poll_status();
        self.metrics.ticks += 1;
    }

    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Tick until `stop` holds after an iteration. Returns the iterations run.
    pub fn run_until(&mut self, mut stop: impl FnMut(&Self) -> bool) -> u64 {
        let mut ticks = 0;
        loop {
            self.tick();
            ticks += 1;
            if stop(&*self) {
                return ticks;
            }
        }
    }

    fn drain_input(&mut self) {
        while let Some(byte) = self.transport.try_read_byte() {
            let event = self.line.push(byte);
            event.echo(&mut self.transport);
            match event {
                LineEvent::LineComplete => {
                    let text = self.line.text();
                    let outcome = dispatch(&text, &mut self.controller, &mut self.transport);
                    match outcome {
                        Outcome::Empty => {}
                        Outcome::Rejected(_) => {
                            self.metrics.lines += 1;
                            self.metrics.rejected += 1;
                        }
                        _ => self.metrics.lines += 1,
                    }
                    self.transport.write_str(PROMPT);
                    self.line.clear();
                }
                LineEvent::Dropped => self.metrics.dropped_bytes += 1,
                LineEvent::Appended(_) | LineEvent::Backspaced | LineEvent::Ignored => {}
            }
        }
    }

    fn poll_status(&mut self) {
        let status = self.controller.status_flags();

        if status.contains(StatusFlags::RUNNING) && !self.running_notified {
            info!("PRBS running");
            self.transport
                .write_str("\r\n[PRBS] Running (first handshake observed)\r\n> ");
            self.running_notified = true;
        }

        if status.contains(StatusFlags::DONE) {
            let bytes = self.controller.byte_count();
            self.controller.clear_done();
            self.metrics.done_pulses += 1;
            info!("PRBS frame done at {} bytes", bytes);
            self.transport
                .write_str(&format!("\r\n[PRBS] DONE (frame bytes={})\r\n> ", bytes));
        }
    }

    pub fn controller(&self) -> &PrbsController<M> {
        &self.controller
    }

    pub fn indicator(&self) -> &Indicator<M> {
        &self.indicator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    pub fn running_notified(&self) -> bool {
        self.running_notified
    }

    pub fn metrics(&self) -> LoopMetrics {
        self.metrics
    }
}
