// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process management utilities.
//!
//! Functions for starting, probing, and cleaning up after the rgsd
//! daemon process.

use crate::client::ClientError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Start the daemon in the background, returning the child process handle.
pub fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let rgsd_path = find_rgsd_binary();

    Command::new(&rgsd_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Find the rgsd binary: env override, then a sibling of the current
/// executable, then whatever `PATH` resolves.
fn find_rgsd_binary() -> PathBuf {
    if let Some(path) = crate::env::daemon_binary() {
        return PathBuf::from(path);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("rgsd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("rgsd")
}

/// Get the PID from the daemon pid file, if it exists.
pub fn read_daemon_pid() -> Option<u32> {
    let pid_path = crate::env::run_dir().join("rgsd.pid");
    let content = std::fs::read_to_string(pid_path).ok()?;
    content.trim().parse::<u32>().ok()
}

/// Execute kill with the given signal argument and PID.
fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check if a process with the given PID exists.
pub fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}

/// Probe whether a Unix socket is accepting connections.
pub fn probe_socket(socket_path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(socket_path).is_ok()
}

/// Remove stale socket and pid files when the daemon is not running.
///
/// Called when the socket file exists but we can't connect to it. If the
/// pid file references a dead process (or no pid file exists), removes
/// the stale files so a fresh daemon can start.
pub fn cleanup_stale_socket() {
    let dir = crate::env::run_dir();
    let socket_path = crate::env::socket_path();
    let pid_path = dir.join("rgsd.pid");

    if !socket_path.exists() {
        return;
    }

    match read_daemon_pid() {
        Some(pid) if process_exists(pid) => {
            // A daemon seems alive; leave its files alone.
        }
        _ => {
            let _ = std::fs::remove_file(&socket_path);
            let _ = std::fs::remove_file(&pid_path);
        }
    }
}

/// Startup marker prefix that the daemon writes to its log before
/// anything else.
const STARTUP_MARKER_PREFIX: &str = "--- rgsd: starting (pid: ";

/// Read the daemon log from the latest startup marker, looking for errors.
pub fn read_startup_error() -> Option<String> {
    let log_path = crate::env::run_dir().join("rgsd.log");
    let content = std::fs::read_to_string(log_path).ok()?;
    parse_startup_error(&content)
}

/// Parse startup errors from log content (pure logic, no I/O).
fn parse_startup_error(content: &str) -> Option<String> {
    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    let error_messages: Vec<String> = errors
        .iter()
        .filter_map(|line| line.split_once(": ").map(|(_, msg)| msg.to_string()))
        .collect();

    if error_messages.is_empty() {
        Some(errors.join("\n"))
    } else {
        Some(error_messages.join("\n"))
    }
}

/// Wrap an error with startup log info if available.
pub fn wrap_with_startup_error(err: ClientError) -> ClientError {
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    if let Some(startup_error) = read_startup_error() {
        ClientError::DaemonStartFailed(startup_error)
    } else {
        err
    }
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
