// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Default configuration table path.
pub const DEFAULT_INITTAB: &str = "/etc/isinittab";

/// Default run directory (socket, pid file, log).
pub const DEFAULT_RUN_DIR: &str = "/var/run/is";

/// Configuration table path: `RGS_INITTAB` > `/etc/isinittab`.
pub fn inittab_path() -> PathBuf {
    match std::env::var("RGS_INITTAB") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from(DEFAULT_INITTAB),
    }
}

/// Run directory: `RGS_RUN_DIR` > `/var/run/is`.
pub fn run_dir() -> PathBuf {
    match std::env::var("RGS_RUN_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from(DEFAULT_RUN_DIR),
    }
}

/// Control socket path: `RGS_SOCKET` > `<run dir>/init.s`.
pub fn socket_path() -> PathBuf {
    match std::env::var("RGS_SOCKET") {
        Ok(path) => PathBuf::from(path),
        Err(_) => run_dir().join("init.s"),
    }
}
