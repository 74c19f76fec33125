// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process host adapters.
//!
//! The supervisor talks to the operating system through [`ProcessHost`]:
//! spawning shell commands, running them synchronously, signalling, and
//! probing liveness. The real implementation forks through `/bin/sh -c`;
//! the fake records every call so reconciliation is testable without
//! creating processes.

mod unix;

pub use unix::UnixProcessHost;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessHost, HostCall};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from process operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("spawn failed: {0}")]
    SpawnFailed(String),

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("signal delivery failed for pid {pid}: {reason}")]
    SignalFailed { pid: i32, reason: String },
}

/// Signal used when stopping a supervised child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// Graceful termination (SIGTERM).
    Term,
    /// Forceful termination (SIGKILL).
    Kill,
}

impl std::fmt::Display for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopSignal::Term => write!(f, "SIGTERM"),
            StopSignal::Kill => write!(f, "SIGKILL"),
        }
    }
}

/// Adapter for creating, signalling, and observing processes.
#[async_trait]
pub trait ProcessHost: Clone + Send + Sync + 'static {
    /// Spawn `command` via the platform shell and return its pid.
    ///
    /// The child's exit is reported asynchronously as an
    /// [`rgs_core::Event::ChildExited`] on the host's event channel.
    async fn spawn_shell(&self, command: &str) -> Result<i32, HostError>;

    /// Run `command` via the platform shell and block until it completes.
    ///
    /// Returns the exit code, or `None` if the command died on a signal.
    async fn run_to_completion(&self, command: &str) -> Result<Option<i32>, HostError>;

    /// Deliver a stop signal to `pid`.
    fn send_signal(&self, pid: i32, signal: StopSignal) -> Result<(), HostError>;

    /// Whether `pid` is still signallable.
    fn is_alive(&self, pid: i32) -> bool;

    /// Sleep for `duration` (the termination back-off uses this so tests
    /// can run without real delays).
    async fn sleep(&self, duration: Duration);
}
