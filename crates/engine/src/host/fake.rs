// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process host for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{HostError, ProcessHost, StopSignal};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Recorded host call.
#[derive(Debug, Clone)]
pub enum HostCall {
    Spawn { command: String, pid: i32 },
    RunSync { command: String },
    Signal { pid: i32, signal: StopSignal },
    Sleep { duration: Duration },
}

struct FakeHostState {
    calls: Vec<HostCall>,
    alive: HashSet<i32>,
    term_resistant: HashSet<i32>,
    failing_commands: Vec<String>,
    next_pid: i32,
    sync_exit_code: Option<i32>,
}

/// Fake process host. Assigns sequential pids, keeps a liveness set, and
/// records every call for assertion.
///
/// By default a SIGTERM "kills" the fake process so termination back-off
/// exits after the first probe; [`FakeProcessHost::resist_term`] makes a
/// pid survive until SIGKILL.
#[derive(Clone)]
pub struct FakeProcessHost {
    inner: Arc<Mutex<FakeHostState>>,
}

impl Default for FakeProcessHost {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeHostState {
                calls: Vec::new(),
                alive: HashSet::new(),
                term_resistant: HashSet::new(),
                failing_commands: Vec::new(),
                next_pid: 1000,
                sync_exit_code: Some(0),
            })),
        }
    }
}

impl FakeProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.lock().calls.clone()
    }

    /// Commands passed to `spawn_shell`, in order (failed spawns excluded).
    pub fn spawned_commands(&self) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Spawn { command, .. } => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Signals delivered so far, in order.
    pub fn signals(&self) -> Vec<(i32, StopSignal)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Signal { pid, signal } => Some((*pid, *signal)),
                _ => None,
            })
            .collect()
    }

    /// Pid assigned to the most recent spawn of a command containing
    /// `fragment`.
    pub fn pid_of(&self, fragment: &str) -> Option<i32> {
        self.inner
            .lock()
            .calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HostCall::Spawn { command, pid } if command.contains(fragment) => Some(*pid),
                _ => None,
            })
    }

    /// Mark a pid dead or alive without a signal (simulates an exit the
    /// supervisor has not yet been told about).
    pub fn set_alive(&self, pid: i32, alive: bool) {
        let mut state = self.inner.lock();
        if alive {
            state.alive.insert(pid);
        } else {
            state.alive.remove(&pid);
        }
    }

    /// Make `pid` survive SIGTERM; only SIGKILL removes it.
    pub fn resist_term(&self, pid: i32) {
        self.inner.lock().term_resistant.insert(pid);
    }

    /// Fail any spawn whose command contains `fragment`.
    pub fn fail_spawns_containing(&self, fragment: &str) {
        self.inner.lock().failing_commands.push(fragment.to_string());
    }

    /// Exit code reported by `run_to_completion`.
    pub fn set_sync_exit_code(&self, code: Option<i32>) {
        self.inner.lock().sync_exit_code = code;
    }
}

#[async_trait]
impl ProcessHost for FakeProcessHost {
    async fn spawn_shell(&self, command: &str) -> Result<i32, HostError> {
        let mut state = self.inner.lock();
        if state.failing_commands.iter().any(|f| command.contains(f)) {
            return Err(HostError::SpawnFailed(format!(
                "refusing to spawn '{}'",
                command
            )));
        }
        let pid = state.next_pid;
        state.next_pid += 1;
        state.alive.insert(pid);
        state.calls.push(HostCall::Spawn {
            command: command.to_string(),
            pid,
        });
        Ok(pid)
    }

    async fn run_to_completion(&self, command: &str) -> Result<Option<i32>, HostError> {
        let mut state = self.inner.lock();
        if state.failing_commands.iter().any(|f| command.contains(f)) {
            return Err(HostError::CommandFailed(format!(
                "refusing to run '{}'",
                command
            )));
        }
        state.calls.push(HostCall::RunSync {
            command: command.to_string(),
        });
        Ok(state.sync_exit_code)
    }

    fn send_signal(&self, pid: i32, signal: StopSignal) -> Result<(), HostError> {
        let mut state = self.inner.lock();
        state.calls.push(HostCall::Signal { pid, signal });
        if !state.alive.contains(&pid) {
            return Err(HostError::SignalFailed {
                pid,
                reason: "no such process".to_string(),
            });
        }
        match signal {
            StopSignal::Term => {
                if !state.term_resistant.contains(&pid) {
                    state.alive.remove(&pid);
                }
            }
            StopSignal::Kill => {
                state.alive.remove(&pid);
            }
        }
        Ok(())
    }

    fn is_alive(&self, pid: i32) -> bool {
        self.inner.lock().alive.contains(&pid)
    }

    async fn sleep(&self, duration: Duration) {
        self.inner.lock().calls.push(HostCall::Sleep { duration });
    }
}
