// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::daemon_process::{
    cleanup_stale_socket, probe_socket, start_daemon_background, wrap_with_startup_error,
};
use rgs_daemon::Directive;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for writing a directive.
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("RGS_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for the daemon to start.
pub fn timeout_connect() -> Duration {
    parse_duration_ms("RGS_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Polling interval for connection retries.
pub fn poll_interval() -> Duration {
    parse_duration_ms("RGS_CONNECT_POLL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("timed out sending directive")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for the daemon's control socket.
pub struct SupervisorClient {
    socket_path: PathBuf,
}

impl SupervisorClient {
    /// Client for the socket configured in the environment.
    pub fn new() -> Self {
        Self {
            socket_path: crate::env::socket_path(),
        }
    }

    /// Client for an explicit socket path.
    pub fn with_socket(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Write one directive line and close. Fails with
    /// [`ClientError::DaemonNotRunning`] when nothing is listening.
    pub async fn send(&self, directive: &Directive) -> Result<(), ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|_| ClientError::DaemonNotRunning)?;

        let line = format!("{directive}\n");
        tokio::time::timeout(timeout_ipc(), async {
            stream.write_all(line.as_bytes()).await?;
            stream.shutdown().await
        })
        .await
        .map_err(|_| ClientError::Timeout)??;

        Ok(())
    }

    /// Send a directive, becoming the daemon's bootstrap if none is
    /// running: clean provably-stale files, spawn `rgsd` detached, wait
    /// for the socket to accept, then send.
    pub async fn send_or_start(&self, directive: &Directive) -> Result<(), ClientError> {
        if !probe_socket(&self.socket_path) {
            cleanup_stale_socket();
            start_daemon_background()?;
            self.wait_for_socket().await?;
        }
        self.send(directive).await
    }

    async fn wait_for_socket(&self) -> Result<(), ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout_connect() {
            if probe_socket(&self.socket_path) {
                return Ok(());
            }
            tokio::time::sleep(poll_interval()).await;
        }
        Err(wrap_with_startup_error(ClientError::DaemonStartTimeout))
    }
}

impl Default for SupervisorClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
