// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record model for the configuration table.

use rgs_core::TagId;

/// Supervision mode of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Never run; the supervisor terminates any running instance.
    Off,
    /// Run synchronously to completion once per transition into a
    /// matching runlevel, blocking the rest of the reconciliation.
    Wait,
    /// Restart on exit, subject to throttling.
    Respawn,
    /// Start once; do not restart on exit.
    Once,
}

impl Mode {
    /// Parse a mode token. Anything that is not `off`, `wait`, or
    /// `respawn` falls through to `once`.
    pub fn parse(token: &str) -> Mode {
        match token {
            "off" => Mode::Off,
            "wait" => Mode::Wait,
            "respawn" => Mode::Respawn,
            _ => Mode::Once,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Off => "off",
            Mode::Wait => "wait",
            Mode::Respawn => "respawn",
            Mode::Once => "once",
        };
        write!(f, "{}", s)
    }
}

/// The set of runlevels a tag runs in.
///
/// Matching is strict set membership over the comma-split tokens of the
/// `levels` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Levels(Vec<String>);

impl Levels {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn contains(&self, runlevel: &str) -> bool {
        self.0.iter().any(|l| l == runlevel)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }
}

/// One line of the configuration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    /// Resource group this tag belongs to.
    pub group: String,
    /// Unique identifier of the record.
    pub tag: TagId,
    /// Runlevels in which the tag should run.
    pub levels: Levels,
    /// Supervision mode.
    pub mode: Mode,
    /// Command executed via the platform shell. May contain colons.
    pub cmd: String,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
