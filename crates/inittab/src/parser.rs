// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-grammar parser for the configuration table.

use crate::record::{Levels, Mode, TagRecord};
use rgs_core::TagId;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors from loading the configuration table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The table file could not be read. Reconciliation aborts without
    /// touching the process table.
    #[error("cannot read configuration table {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("duplicate tag '{tag}' on configuration line {line}")]
    DuplicateTag { line: usize, tag: String },
}

/// Load and parse the configuration table at `path`.
pub fn load(path: &Path) -> Result<Vec<TagRecord>, LoadError> {
    let input = std::fs::read_to_string(path).map_err(|source| LoadError::Unavailable {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&input)
}

/// Parse configuration table text into records, preserving file order.
///
/// Order matters: it defines the start/stop order during reconciliation.
pub fn parse_str(input: &str) -> Result<Vec<TagRecord>, LoadError> {
    let mut records = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() || raw.starts_with('#') {
            continue;
        }

        records.push(parse_line(raw, line, &mut seen)?);
    }

    Ok(records)
}

fn parse_line(
    raw: &str,
    line: usize,
    seen: &mut HashSet<String>,
) -> Result<TagRecord, LoadError> {
    // At most five fields, so `cmd` keeps any colons of its own.
    let fields: Vec<&str> = raw.splitn(5, ':').collect();
    if fields.len() < 5 {
        return Err(LoadError::Malformed {
            line,
            reason: format!("expected 5 colon-separated fields, found {}", fields.len()),
        });
    }

    let (group, tag, levels, mode, cmd) =
        (fields[0], fields[1], fields[2], fields[3], fields[4]);

    if group.is_empty() {
        return Err(LoadError::Malformed {
            line,
            reason: "empty group field".to_string(),
        });
    }
    if tag.is_empty() {
        return Err(LoadError::Malformed {
            line,
            reason: "empty tag field".to_string(),
        });
    }
    if !seen.insert(tag.to_string()) {
        return Err(LoadError::DuplicateTag {
            line,
            tag: tag.to_string(),
        });
    }

    Ok(TagRecord {
        group: group.to_string(),
        tag: TagId::new(tag),
        levels: parse_levels(levels, line)?,
        mode: Mode::parse(mode),
        cmd: cmd.to_string(),
    })
}

fn parse_levels(field: &str, line: usize) -> Result<Levels, LoadError> {
    let tokens: Vec<String> = field.split(',').map(str::to_string).collect();
    if tokens.iter().any(String::is_empty) {
        return Err(LoadError::Malformed {
            line,
            reason: "empty runlevel token".to_string(),
        });
    }
    Ok(Levels::new(tokens))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
