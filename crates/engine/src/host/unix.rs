// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real process host backed by `/bin/sh` and POSIX signals.

use super::{HostError, ProcessHost, StopSignal};
use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use rgs_core::Event;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Platform shell used to execute configured commands.
const SHELL: &str = "/bin/sh";

/// Process host that forks real children and reports their exits as
/// [`Event::ChildExited`] on the supervisor's event channel.
#[derive(Clone)]
pub struct UnixProcessHost {
    event_tx: mpsc::Sender<Event>,
}

impl UnixProcessHost {
    pub fn new(event_tx: mpsc::Sender<Event>) -> Self {
        Self { event_tx }
    }

    fn shell_command(command: &str) -> Command {
        let mut cmd = Command::new(SHELL);
        cmd.arg("-c").arg(command).stdin(Stdio::null());
        cmd
    }
}

#[async_trait]
impl ProcessHost for UnixProcessHost {
    async fn spawn_shell(&self, command: &str) -> Result<i32, HostError> {
        let mut child = Self::shell_command(command)
            .spawn()
            .map_err(|e| HostError::SpawnFailed(e.to_string()))?;

        let Some(pid) = child.id() else {
            return Err(HostError::SpawnFailed(
                "child exited before a pid was recorded".to_string(),
            ));
        };
        let pid = pid as i32;

        // Waiter task: reaps the child and funnels the exit into the
        // engine loop. Exits are never handled out-of-band.
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(pid, error = %e, "failed to await child");
                    None
                }
            };
            debug!(pid, ?code, "child exited");
            if event_tx
                .send(Event::ChildExited { pid, code })
                .await
                .is_err()
            {
                debug!(pid, "engine loop gone, dropping exit notification");
            }
        });

        Ok(pid)
    }

    async fn run_to_completion(&self, command: &str) -> Result<Option<i32>, HostError> {
        let status = Self::shell_command(command)
            .status()
            .await
            .map_err(|e| HostError::CommandFailed(e.to_string()))?;
        Ok(status.code())
    }

    fn send_signal(&self, pid: i32, signal: StopSignal) -> Result<(), HostError> {
        let sig = match signal {
            StopSignal::Term => Signal::SIGTERM,
            StopSignal::Kill => Signal::SIGKILL,
        };
        kill(Pid::from_raw(pid), sig).map_err(|errno| HostError::SignalFailed {
            pid,
            reason: errno.to_string(),
        })
    }

    fn is_alive(&self, pid: i32) -> bool {
        // Signal 0 probes existence. EPERM still means the pid exists.
        match kill(Pid::from_raw(pid), None) {
            Ok(()) => true,
            Err(errno) => errno == nix::errno::Errno::EPERM,
        }
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
#[path = "unix_tests.rs"]
mod tests;
