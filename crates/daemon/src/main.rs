// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource Group Supervisor Daemon (rgsd)
//!
//! Background process that supervises the host's resource groups.
//!
//! Architecture:
//! - Listener Task: Spawned task handling socket I/O, emits events to the queue
//! - Engine Loop: Main task processing events sequentially against the supervisor

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;
mod listener;
mod protocol;

use rgs_core::{Event, SystemClock};
use rgs_engine::{Supervisor, UnixProcessHost};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::lifecycle::{Config, LifecycleError};
use crate::listener::Listener;

/// Daemon supervisor with concrete adapter types.
type DaemonSupervisor = Supervisor<UnixProcessHost, SystemClock>;

/// Depth of the event queue feeding the engine loop.
const EVENT_QUEUE_DEPTH: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("rgsd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("rgsd {}", env!("CARGO_PKG_VERSION"));
                println!("Resource Group Supervisor Daemon - supervises the host's resource groups");
                println!();
                println!("USAGE:");
                println!("    rgsd");
                println!();
                println!("The daemon is typically started by the `rgs` CLI and should not");
                println!("be invoked directly. It listens on a local socket for directives");
                println!("from `rgs`.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: rgsd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load();

    // Rotate log file if it has grown too large
    rotate_log_if_needed(&config.log_path);

    // Write startup marker to log (before tracing setup, so the CLI can find it)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("starting resource group supervisor daemon");

    let startup = match lifecycle::startup(&config) {
        Ok(s) => s,
        Err(LifecycleError::LockFailed(_)) => {
            // Another daemon is already running — print a human-readable
            // message instead of a raw debug error.
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("rgsd is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Events from the listener (directives) and from per-child waiter
    // tasks (exits) drain through one queue, so nothing touches the
    // supervisor concurrently.
    let (event_tx, mut event_rx) = mpsc::channel::<Event>(EVENT_QUEUE_DEPTH);

    let host = UnixProcessHost::new(event_tx.clone());
    let mut supervisor = DaemonSupervisor::new(host, SystemClock, config.inittab_path.clone());

    let listener = Listener::new(startup.listener, config.socket_path.clone(), event_tx);
    tokio::spawn(listener.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for a parent process waiting on startup
    println!("READY");

    // Engine loop - processes events sequentially
    loop {
        tokio::select! {
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(Event::Directive { group, runlevel }) => {
                        if let Err(e) = supervisor.apply_directive(&group, &runlevel).await {
                            error!(group = %group, runlevel = %runlevel, error = %e, "directive not applied");
                        }
                    }
                    Some(Event::ChildExited { pid, code }) => {
                        if let Err(e) = supervisor.handle_child_exit(pid, code).await {
                            error!(pid, error = %e, "reconciliation after child exit failed");
                        }
                    }
                    Some(Event::StopAll) => {
                        info!("stopall directive, shutting down");
                        break;
                    }
                    None => {
                        info!("event queue closed, shutting down");
                        break;
                    }
                }
            }

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    supervisor.stop_all().await;
    lifecycle::shutdown(&config);
    info!("daemon stopped");
    Ok(())
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (rgsd.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `rgsd.log` → `rgsd.log.1` → `rgsd.log.2` → `rgsd.log.3`,
/// deleting the oldest. Best-effort: rotation failures are silently
/// ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };

    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();

    // Shift older rotations: .3 is deleted, .2→.3, .1→.2
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Rotate current log → .1
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Startup marker prefix written to log before anything else.
/// The CLI uses this to find where the current startup attempt begins.
/// Full format: "--- rgsd: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- rgsd: starting (pid: ";

/// Write startup marker to the log file (appends to existing log).
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(
        file,
        "{}{}) ---\n",
        STARTUP_MARKER_PREFIX,
        std::process::id()
    )?;

    Ok(())
}

/// Write a startup error synchronously to the log file.
/// This ensures the error is visible to the CLI even if the process exits quickly.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // File appender (rotation happens at startup via rotate_log_if_needed)
    let dir = config
        .log_path
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let name = config
        .log_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(|| std::ffi::OsString::from("rgsd.log"));
    let file_appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
