// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Duplex byte streams for the console.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// Non-blocking read, best-effort write.
pub trait Transport {
    /// Next byte if one is immediately available. Never blocks.
    fn try_read_byte(&mut self) -> Option<u8>;
    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes())
    }
}

/// In-memory transport: queued input, captured output.
#[derive(Debug, Default, Clone)]
pub struct ScriptedTransport {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let mut t = Self::new();
        t.feed(bytes);
        t
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

impl Transport for ScriptedTransport {
    fn try_read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }
}

/// Process stdin/stdout. A reader thread feeds a channel so polling never
/// blocks.
#[derive(Debug)]
pub struct StdioTransport {
    rx: Receiver<u8>,
    closed: bool,
}

impl StdioTransport {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            let mut handle = stdin.lock();
            let mut byte = [0u8; 1];
            loop {
                match handle.read(&mut byte) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.send(byte[0]).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!("stdin read failed: {}", e);
                        break;
                    }
                }
            }
        });
        Self { rx, closed: false }
    }

    /// True once stdin reached end-of-file and every byte was consumed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StdioTransport {
    fn try_read_byte(&mut self) -> Option<u8> {
        match self.rx.try_recv() {
            Ok(b) => Some(b),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.closed {
                    tracing::debug!("stdin closed");
                    self.closed = true;
                }
                None
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut stdout = io::stdout().lock();
        let result = match stdout.write_all(bytes) {
            Ok(()) => stdout.flush(),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!("stdout write failed: {}", e);
        }
    }
}
