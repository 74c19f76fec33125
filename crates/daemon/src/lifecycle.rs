// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, singleton lock, socket bind, shutdown.

use fs2::FileExt;
use std::fs::File;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the configuration table.
    pub inittab_path: PathBuf,
    /// Run directory holding socket, pid file, and log.
    pub run_dir: PathBuf,
    /// Path to the control socket.
    pub socket_path: PathBuf,
    /// Path to the lock/pid file.
    pub lock_path: PathBuf,
    /// Path to the daemon log file.
    pub log_path: PathBuf,
}

impl Config {
    /// Load configuration from the environment (see `env` module for the
    /// variables and their defaults).
    pub fn load() -> Self {
        let run_dir = crate::env::run_dir();
        Self {
            inittab_path: crate::env::inittab_path(),
            socket_path: crate::env::socket_path(),
            lock_path: run_dir.join("rgsd.pid"),
            log_path: run_dir.join("rgsd.log"),
            run_dir,
        }
    }
}

/// Lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of daemon startup.
#[derive(Debug)]
pub struct Startup {
    /// The bound control socket, ready to accept.
    pub listener: UnixListener,
    // NOTE(lifetime): Held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

/// Start the daemon: create the run directory, take the singleton lock,
/// and bind the control socket (removing any stale socket file first).
pub fn startup(config: &Config) -> Result<Startup, LifecycleError> {
    std::fs::create_dir_all(&config.run_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Lock FIRST - prevents races with a second daemon. Open without
    // truncating so a losing contender does not wipe the winner's pid.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write our pid now that we hold the lock.
    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let listener = bind_socket(&config.socket_path)?;
    Ok(Startup {
        listener,
        lock_file,
    })
}

/// Bind the control socket, unlinking a stale file at the path first and
/// retrying once after an unlink if the bind fails.
pub fn bind_socket(path: &std::path::Path) -> Result<UnixListener, LifecycleError> {
    if path.exists() {
        // We hold the singleton lock, so the file is stale.
        std::fs::remove_file(path)?;
    }
    match UnixListener::bind(path) {
        Ok(listener) => Ok(listener),
        Err(e) => {
            info!(path = %path.display(), error = %e, "bind failed, unlinking and retrying");
            let _ = std::fs::remove_file(path);
            UnixListener::bind(path).map_err(|e| LifecycleError::BindFailed(path.to_path_buf(), e))
        }
    }
}

/// Remove the socket and pid files. The lock itself is released when the
/// [`Startup`] is dropped.
pub fn shutdown(config: &Config) {
    info!("shutting down daemon");

    if config.socket_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.socket_path) {
            warn!(error = %e, "failed to remove socket file");
        }
    }
    if config.lock_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.lock_path) {
            warn!(error = %e, "failed to remove pid file");
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
