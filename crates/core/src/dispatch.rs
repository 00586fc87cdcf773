// PRBS Bring-up Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Line command interpreter.
//!
//! Vocabulary (exact, case-sensitive): `help`, `status`, `enable <n>`,
//! `mode <7|15|23|31|0..3>`, `frame <n>`, `seed <n>`, `reset`, `clear`,
//! `doneclr`. Lines are split on whitespace into at most four tokens; extra
//! tokens are ignored.

use crate::controller::{PrbsController, StatusSnapshot};
use crate::transport::Transport;
use crate::Mmio;
use tracing::debug;

const MAX_TOKENS: usize = 4;

pub const HELP_TEXT: &str = "\r\nCommands:\r\n\
  help                 - this help\r\n\
  status               - read STATUS/COUNTERS\r\n\
  enable 0|1           - stop/start PRBS\r\n\
  mode 7|15|23|31|0..3 - set PRBS poly (auto reset)\r\n\
  frame <N>            - set FRAME_LEN_BYTES (0=continuous)\r\n\
  seed <val>           - set SEED (31-bit; 0 coerced in HW)\r\n\
  reset                - SW_RESET one-shot\r\n\
  clear                - CLEAR counters\r\n\
  doneclr              - W1C clear DONE\r\n\r\n";

pub const REJECT_TEXT: &str = "Unknown/usage error. Type 'help'.\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Enable(bool),
    Mode(u32),
    Frame(u32),
    Seed(u32),
    Reset,
    Clear,
    DoneClear,
}

/// Why a line was not applied. Never shown to the user; the console only
/// prints [`REJECT_TEXT`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Blank line: nothing printed, nothing changed.
    Empty,
    Help,
    StatusReport(StatusSnapshot),
    Applied(Command),
    Rejected(Rejection),
}

impl Command {
    /// `Ok(None)` for a line with no tokens.
    pub fn parse(line: &str) -> Result<Option<Command>, Rejection> {
        let tokens: Vec<&str> = line.split_whitespace().take(MAX_TOKENS).collect();
        let Some((&name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let arg = |cmd: &'static str| args.first().copied().ok_or(Rejection::MissingArgument(cmd));

        let command = match name {
            "help" => Command::Help,
            "status" => Command::Status,
            "enable" => Command::Enable(parse_auto(arg("enable")?) != 0),
            "mode" => Command::Mode(parse_mode(arg("mode")?)),
            "frame" => Command::Frame(parse_auto(arg("frame")?)),
            "seed" => Command::Seed(parse_seed(arg("seed")?)),
            "reset" => Command::Reset,
            "clear" => Command::Clear,
            "doneclr" => Command::DoneClear,
            other => return Err(Rejection::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Parse, apply and answer one completed line.
pub fn dispatch<M: Mmio, T: Transport + ?Sized>(
    line: &str,
    ctl: &mut PrbsController<M>,
    out: &mut T,
) -> Outcome {
    let command = match Command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Outcome::Empty,
        Err(reason) => {
            debug!("Rejected {:?}: {}", line, reason);
            out.write_str(REJECT_TEXT);
            return Outcome::Rejected(reason);
        }
    };
    debug!("Dispatch {:?}", command);

    match command {
        Command::Help => {
            out.write_str(HELP_TEXT);
            return Outcome::Help;
        }
        Command::Status => {
            let snapshot = ctl.read_status();
            out.write_str(&format!("{}\r\n", snapshot));
            return Outcome::StatusReport(snapshot);
        }
        Command::Enable(flag) => ctl.enable(flag),
        Command::Mode(mode) => ctl.set_mode(mode),
        Command::Frame(len) => ctl.set_frame_length(len),
        Command::Seed(seed) => ctl.set_seed(seed),
        Command::Reset => {
            ctl.reset();
            out.write_str("[PRBS] SW_RESET\r\n");
            return Outcome::Applied(command);
        }
        Command::Clear => {
            ctl.clear_counters();
            out.write_str("[PRBS] CLEAR counters\r\n");
            return Outcome::Applied(command);
        }
        Command::DoneClear => {
            ctl.clear_done();
            out.write_str("[PRBS] DONE cleared\r\n");
            return Outcome::Applied(command);
        }
    }

    // Configuration changes answer with the resulting status.
    out.write_str(&format!("{}\r\n", ctl.read_status()));
    Outcome::Applied(command)
}

/// Polynomial selector: symbolic length first, then a raw selector where
/// anything above 3 clamps to 3.
pub fn parse_mode(token: &str) -> u32 {
    match token {
        "7" => 0,
        "15" => 1,
        "23" => 2,
        "31" => 3,
        _ => parse_auto(token).min(3),
    }
}

/// Unsigned with base detection: `0x` hex, leading `0` octal, else decimal.
pub fn parse_auto(token: &str) -> u32 {
    parse_unsigned(token, None)
}

/// Hex only with an explicit `0x`/`0X` prefix, otherwise decimal.
pub fn parse_seed(token: &str) -> u32 {
    let b = token.as_bytes();
    let radix = if b.len() >= 2 && b[0] == b'0' && (b[1] == b'x' || b[1] == b'X') {
        16
    } else {
        10
    };
    parse_unsigned(token, Some(radix))
}

fn has_hex_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() > 2 && b[0] == b'0' && (b[1] == b'x' || b[1] == b'X') && b[2].is_ascii_hexdigit()
}

/// Prefix parse in the manner of C `strtoul`: stops at the first invalid
/// digit, no digits yields 0, overflow saturates, a leading `-` negates
/// modulo 2^32.
fn parse_unsigned(token: &str, radix: Option<u32>) -> u32 {
    let s = token.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match radix {
        Some(16) | None if has_hex_prefix(s) => (16, &s[2..]),
        Some(radix) => (radix, s),
        None if s.starts_with('0') => (8, s),
        None => (10, s),
    };

    let mut value: u32 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        match value.checked_mul(radix).and_then(|v| v.checked_add(d)) {
            Some(v) => value = v,
            None => {
                value = u32::MAX;
                break;
            }
        }
    }

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_symbolic_lengths() {
        assert_eq!(parse_mode("7"), 0);
        assert_eq!(parse_mode("15"), 1);
        assert_eq!(parse_mode("23"), 2);
        assert_eq!(parse_mode("31"), 3);
    }

    #[test]
    fn test_mode_raw_selectors() {
        for n in 0..=3u32 {
            assert_eq!(parse_mode(&n.to_string()), n);
        }
    }

    #[test]
    fn test_mode_other_numbers_clamp() {
        for token in ["4", "6", "8", "16", "30", "32", "100", "0x10", "4294967295"] {
            assert_eq!(parse_mode(token), 3, "token {}", token);
        }
        // Non-numeric parses as 0 like strtoul.
        assert_eq!(parse_mode("abc"), 0);
    }

    #[test]
    fn test_auto_base_detection() {
        assert_eq!(parse_auto("256"), 256);
        assert_eq!(parse_auto("0x100"), 256);
        assert_eq!(parse_auto("0X1f"), 31);
        assert_eq!(parse_auto("010"), 8);
        assert_eq!(parse_auto("0"), 0);
        assert_eq!(parse_auto("12abc"), 12);
        assert_eq!(parse_auto("0x"), 0);
        assert_eq!(parse_auto("099"), 0);
        assert_eq!(parse_auto("99999999999"), u32::MAX);
        assert_eq!(parse_auto("-1"), u32::MAX);
    }

    #[test]
    fn test_seed_radix() {
        assert_eq!(parse_seed("0xDEADBEEF"), 0xDEAD_BEEF);
        assert_eq!(parse_seed("010"), 10);
        assert_eq!(parse_seed("12345"), 12345);
        assert_eq!(parse_seed("zz"), 0);
    }

    #[test]
    fn test_parse_blank_is_none() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("  \t "), Ok(None));
    }

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!(Command::parse("help"), Ok(Some(Command::Help)));
        assert_eq!(Command::parse("status"), Ok(Some(Command::Status)));
        assert_eq!(Command::parse("enable 0"), Ok(Some(Command::Enable(false))));
        assert_eq!(Command::parse("enable 2"), Ok(Some(Command::Enable(true))));
        assert_eq!(Command::parse("mode 23"), Ok(Some(Command::Mode(2))));
        assert_eq!(Command::parse("  frame\t0x40 "), Ok(Some(Command::Frame(64))));
        assert_eq!(Command::parse("seed 0x10"), Ok(Some(Command::Seed(16))));
        assert_eq!(Command::parse("reset extra"), Ok(Some(Command::Reset)));
        assert_eq!(Command::parse("clear"), Ok(Some(Command::Clear)));
        assert_eq!(Command::parse("doneclr"), Ok(Some(Command::DoneClear)));
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(
            Command::parse("Status"),
            Err(Rejection::UnknownCommand("Status".to_string()))
        );
        assert_eq!(
            Command::parse("mode"),
            Err(Rejection::MissingArgument("mode"))
        );
        assert_eq!(
            Command::parse("seed"),
            Err(Rejection::MissingArgument("seed"))
        );
    }
}
