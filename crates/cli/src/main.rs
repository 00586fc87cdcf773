// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::Parser;
use prbs_config::{BoardConfig, LedPolarity};
use prbs_core::board::SimulatedBoard;
use prbs_core::metrics::LoopMetrics;
use prbs_core::transport::{ScriptedTransport, StdioTransport, Transport};
use prbs_core::StatusSnapshot;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "PRBS Bring-up Harness: command console for the PRBS pattern generator",
    long_about = None
)]
struct Args {
    /// Path to the board configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Feed this file to the console instead of stdin and exit once it is consumed
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Interactive: stop after N heartbeats (default: when stdin closes). Script: extra heartbeats after the input is consumed
    #[arg(long)]
    ticks: Option<u64>,

    /// Write a JSON report of the final generator status to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Override the indicator polarity (active-high | active-low)
    #[arg(long)]
    led_polarity: Option<LedPolarity>,

    /// Enable debug logging of register traffic
    #[arg(short, long)]
    trace: bool,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    board: &'a str,
    ticks: u64,
    status: StatusSnapshot,
    metrics: LoopMetrics,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the console transcript.
    let level = if args.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting PRBS Bring-up Harness");

    let mut config = if let Some(path) = &args.config {
        info!("Loading board config: {:?}", path);
        BoardConfig::from_file(path)?
    } else {
        info!("Using default board configuration");
        BoardConfig::default()
    };
    if let Some(polarity) = args.led_polarity {
        config.led_polarity = polarity;
    }

    info!(
        "Board '{}': PRBS at {:#x}, LED at {:#x} ({:?})",
        config.name, config.prbs_base, config.led_base, config.led_polarity
    );
    let board = SimulatedBoard::new(config).context("Failed to build simulated board")?;

    let (status, metrics) = match &args.script {
        Some(path) => run_script(&board, path, args.ticks.unwrap_or(0))?,
        None => run_interactive(&board, args.ticks),
    };

    info!(
        "Session finished: {} ticks, {} lines ({} rejected), {} DONE pulses",
        metrics.ticks, metrics.lines, metrics.rejected, metrics.done_pulses
    );

    if let Some(path) = &args.snapshot {
        let report = RunReport {
            board: &board.config().name,
            ticks: metrics.ticks,
            status,
            metrics,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot to {:?}", path))?;
        info!("Snapshot written to {:?}", path);
    }

    Ok(())
}

fn run_script(
    board: &SimulatedBoard,
    path: &Path,
    settle_ticks: u64,
) -> anyhow::Result<(StatusSnapshot, LoopMetrics)> {
    let input = std::fs::read(path)
        .with_context(|| format!("Failed to read command script at {:?}", path))?;
    info!("Running script {:?} ({} bytes)", path, input.len());

    let mut poll = board.poll_loop(ScriptedTransport::with_input(&input), false);
    poll.start(&board.config().defaults);

    // The loop drains all ready input in one tick.
    while poll.transport().pending_input() > 0 {
        poll.tick();
    }
    poll.run_for(settle_ticks);

    let transcript = poll.transport_mut().take_output();
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&transcript)?;
    stdout.flush()?;

    Ok((poll.controller().read_status(), poll.metrics()))
}

fn run_interactive(board: &SimulatedBoard, max_ticks: Option<u64>) -> (StatusSnapshot, LoopMetrics) {
    let mut poll = board.poll_loop(StdioTransport::new(), true);
    poll.start(&board.config().defaults);

    match max_ticks {
        Some(ticks) => {
            info!("Running for {} heartbeats", ticks);
            poll.run_for(ticks);
            poll.transport_mut().write_str("\r\n");
        }
        None => {
            let ticks = poll.run_until(|p| p.transport().is_closed());
            info!("stdin closed after {} heartbeats", ticks);
            poll.transport_mut().write_str("\r\n");
        }
    }

    (poll.controller().read_status(), poll.metrics())
}
