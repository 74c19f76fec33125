// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.
//!
//! The path rules mirror the daemon's so both sides agree on the socket
//! without talking to each other first.

use std::path::PathBuf;

/// Run directory: `RGS_RUN_DIR` > `/var/run/is`.
pub fn run_dir() -> PathBuf {
    match std::env::var("RGS_RUN_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from("/var/run/is"),
    }
}

/// Control socket path: `RGS_SOCKET` > `<run dir>/init.s`.
pub fn socket_path() -> PathBuf {
    match std::env::var("RGS_SOCKET") {
        Ok(path) => PathBuf::from(path),
        Err(_) => run_dir().join("init.s"),
    }
}

/// Daemon binary override (`RGS_DAEMON_BINARY`).
pub fn daemon_binary() -> Option<String> {
    std::env::var("RGS_DAEMON_BINARY").ok()
}
