// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-socket protocol.
//!
//! Wire format: one text line of whitespace-delimited tokens, closed by
//! newline or EOF. Two forms are recognized:
//!
//! ```text
//! <group> <runlevel>
//! stopall
//! ```

use thiserror::Error;

/// Read timeout for a directive line.
pub const READ_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// A directive received over the control socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Reconcile `group` to `runlevel`.
    Switch { group: String, runlevel: String },
    /// Terminate every supervised tag and stop the daemon.
    StopAll,
}

/// Protocol errors. Malformed input is logged and ignored by the server;
/// the connection is simply closed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty directive")]
    Empty,

    #[error("expected `<group> <runlevel>` or `stopall`, got {0} token(s)")]
    WrongArity(usize),
}

impl Directive {
    /// Parse one directive line.
    pub fn parse(line: &str) -> Result<Directive, ProtocolError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens[..] {
            [] => Err(ProtocolError::Empty),
            ["stopall"] => Ok(Directive::StopAll),
            [group, runlevel] => Ok(Directive::Switch {
                group: group.to_string(),
                runlevel: runlevel.to_string(),
            }),
            _ => Err(ProtocolError::WrongArity(tokens.len())),
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Directive::Switch { group, runlevel } => write!(f, "{} {}", group, runlevel),
            Directive::StopAll => write!(f, "stopall"),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
