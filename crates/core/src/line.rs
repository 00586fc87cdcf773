// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Bounded line editor for the command console.
//!
//! Overflow policy: once `capacity` bytes are held, further printable bytes
//! are dropped without error and without echo, until a terminator or a
//! backspace makes room. Already-held bytes are never disturbed.

use crate::transport::Transport;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// What a single input byte did to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    Appended(u8),
    LineComplete,
    Backspaced,
    /// Not retained because the buffer is full.
    Dropped,
    /// Backspace on an empty line.
    Ignored,
}

impl LineEvent {
    /// Echo what was retained, so the terminal mirrors the buffer.
    pub fn echo<T: Transport + ?Sized>(&self, out: &mut T) {
        match self {
            LineEvent::Appended(byte) => out.write_bytes(&[*byte]),
            LineEvent::LineComplete => out.write_bytes(b"\r\n"),
            LineEvent::Backspaced => out.write_bytes(b"\x08 \x08"),
            LineEvent::Dropped | LineEvent::Ignored => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Line contents; bytes that are not UTF-8 are replaced and will not
    /// match any command.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn push(&mut self, byte: u8) -> LineEvent {
        match byte {
            b'\r' | b'\n' => LineEvent::LineComplete,
            BACKSPACE | DELETE => {
                if self.buf.pop().is_some() {
                    LineEvent::Backspaced
                } else {
                    LineEvent::Ignored
                }
            }
            _ if self.buf.len() < self.capacity => {
                self.buf.push(byte);
                LineEvent::Appended(byte)
            }
            _ => LineEvent::Dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;

    #[test]
    fn test_accumulates_until_terminator() {
        let mut line = LineBuffer::new(16);
        for b in b"mode 7" {
            assert_eq!(line.push(*b), LineEvent::Appended(*b));
        }
        assert_eq!(line.push(b'\r'), LineEvent::LineComplete);
        assert_eq!(line.text(), "mode 7");
        line.clear();
        assert!(line.is_empty());
        assert_eq!(line.push(b'\n'), LineEvent::LineComplete);
    }

    #[test]
    fn test_overflow_keeps_first_bytes() {
        const N: usize = 8;
        let mut line = LineBuffer::new(N);
        let input: Vec<u8> = (b'a'..).take(N + 5).collect();
        let events: Vec<LineEvent> = input.iter().map(|b| line.push(*b)).collect();

        assert_eq!(line.len(), N);
        assert_eq!(line.as_bytes(), &input[..N]);
        assert!(events[N..].iter().all(|e| *e == LineEvent::Dropped));
    }

    #[test]
    fn test_backspace_makes_room() {
        let mut line = LineBuffer::new(2);
        line.push(b'a');
        line.push(b'b');
        assert_eq!(line.push(b'c'), LineEvent::Dropped);
        assert_eq!(line.push(0x7F), LineEvent::Backspaced);
        assert_eq!(line.push(b'c'), LineEvent::Appended(b'c'));
        assert_eq!(line.as_bytes(), b"ac");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut line = LineBuffer::new(4);
        assert_eq!(line.push(0x08), LineEvent::Ignored);
        assert_eq!(line.push(0x7F), LineEvent::Ignored);
        assert!(line.is_empty());
    }

    #[test]
    fn test_echo_sequences() {
        let mut out = ScriptedTransport::new();
        LineEvent::Appended(b'x').echo(&mut out);
        LineEvent::Backspaced.echo(&mut out);
        LineEvent::Dropped.echo(&mut out);
        LineEvent::Ignored.echo(&mut out);
        LineEvent::LineComplete.echo(&mut out);
        assert_eq!(out.output(), b"x\x08 \x08\r\n");
    }
}
