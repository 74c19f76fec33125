// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor state machine.
//!
//! A [`Supervisor`] owns the process table and the current `(group,
//! runlevel)` target. Reconciliation re-reads the configuration table and
//! walks it in file order, starting and stopping tags so the running set
//! matches the target without disturbing other groups. Child exits feed
//! back in through [`Supervisor::handle_child_exit`], which re-runs
//! reconciliation so respawn tags come back up under throttle.
//!
//! All mutation happens on the single engine loop that calls these
//! methods, so there is no locking here.

use crate::host::{ProcessHost, StopSignal};
use crate::table::{ProcessTable, TagState};
use crate::throttle::RespawnThrottle;
use rgs_core::{Clock, TagId};
use rgs_inittab::{LoadError, Mode, TagRecord};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Sleeps between liveness probes while waiting for a SIGTERM'd child to
/// exit. After the full sequence (31s) the stop escalates to SIGKILL.
pub const STOP_BACKOFF: [Duration; 5] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
    Duration::from_secs(16),
];

/// The `(group, runlevel)` pair the host is being reconciled towards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub group: String,
    pub runlevel: String,
}

/// Errors from a reconciliation pass.
///
/// A failed pass mutates nothing: the configuration table is parsed in
/// full before the first start or stop is applied.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Config(#[from] LoadError),
}

/// The supervisor: process table, target, and throttle state.
pub struct Supervisor<H: ProcessHost, C: Clock> {
    host: H,
    clock: C,
    inittab_path: PathBuf,
    /// `None` until the first directive arrives: start nothing.
    target: Option<Target>,
    table: ProcessTable,
    /// Per-tag respawn throttles. Kept while the tag stays in the active
    /// set so restarts across reconciliations share one window.
    throttles: HashMap<TagId, RespawnThrottle>,
}

impl<H: ProcessHost, C: Clock> Supervisor<H, C> {
    pub fn new(host: H, clock: C, inittab_path: PathBuf) -> Self {
        Self {
            host,
            clock,
            inittab_path,
            target: None,
            table: ProcessTable::new(),
            throttles: HashMap::new(),
        }
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Apply a `(group, runlevel)` directive: adopt the new target and
    /// reconcile the process table against it.
    pub async fn apply_directive(
        &mut self,
        group: &str,
        runlevel: &str,
    ) -> Result<(), ReconcileError> {
        let records = rgs_inittab::load(&self.inittab_path)?;
        self.target = Some(Target {
            group: group.to_string(),
            runlevel: runlevel.to_string(),
        });
        info!(group, runlevel, "reconciling to target");
        self.reconcile_records(&records).await;
        Ok(())
    }

    /// Re-reconcile against the current target (used after child exits).
    /// A no-op before the first directive.
    pub async fn reconcile(&mut self) -> Result<(), ReconcileError> {
        if self.target.is_none() {
            return Ok(());
        }
        let records = rgs_inittab::load(&self.inittab_path)?;
        self.reconcile_records(&records).await;
        Ok(())
    }

    /// A supervised child exited. Respawn tags are dropped from the table
    /// so the reconciliation pass below restarts them; other tags keep a
    /// completed marker so they are not re-run within this runlevel.
    ///
    /// Exits for untracked pids are ignored, so re-delivery is harmless.
    pub async fn handle_child_exit(
        &mut self,
        pid: i32,
        code: Option<i32>,
    ) -> Result<(), ReconcileError> {
        let Some(tag) = self.table.tag_for_pid(pid).cloned() else {
            debug!(pid, "exit for untracked pid");
            return Ok(());
        };
        let mode = self.table.get(&tag).map(|s| s.mode);
        info!(tag = %tag, pid, code = ?code, "supervised child exited");

        if mode == Some(Mode::Respawn) {
            self.table.remove(&tag);
        } else {
            self.table.mark_done(&tag);
        }

        self.reconcile().await
    }

    /// Terminate every supervised tag.
    pub async fn stop_all(&mut self) {
        let tags = self.table.tags();
        info!(count = tags.len(), "stopping all supervised tags");
        for tag in tags {
            self.stop_tag(&tag).await;
        }
    }

    /// Stop one tag: SIGTERM, bounded back-off while probing liveness,
    /// SIGKILL if it is still alive, then drop it from the table.
    pub async fn stop_tag(&mut self, tag: &TagId) {
        let Some(state) = self.table.get(tag).map(|s| s.state) else {
            return;
        };
        let pid = match state {
            TagState::Done => {
                // Nothing to signal.
                self.table.remove(tag);
                return;
            }
            TagState::Running(pid) => pid,
        };

        debug!(tag = %tag, pid, "stopping");
        if let Err(e) = self.host.send_signal(pid, StopSignal::Term) {
            debug!(tag = %tag, pid, error = %e, "SIGTERM not delivered");
        }

        for delay in STOP_BACKOFF {
            self.host.sleep(delay).await;
            if !self.host.is_alive(pid) || !self.table.contains(tag) {
                break;
            }
        }

        if self.host.is_alive(pid) {
            info!(tag = %tag, pid, "graceful stop timed out, escalating to SIGKILL");
            if let Err(e) = self.host.send_signal(pid, StopSignal::Kill) {
                warn!(tag = %tag, pid, error = %e, "SIGKILL not delivered");
            }
        }

        self.table.remove(tag);
    }

    /// Walk the records in file order and apply the start/stop delta.
    async fn reconcile_records(&mut self, records: &[TagRecord]) {
        let Some(target) = self.target.clone() else {
            return;
        };

        let mut active: HashSet<TagId> = HashSet::new();
        for record in records {
            // Refresh the cached mode before anything else, so exit
            // handling acts on the configuration as last read.
            self.table.set_mode(&record.tag, record.mode);

            if record.mode == Mode::Off {
                continue;
            }
            active.insert(record.tag.clone());

            // Other groups are untouched.
            if record.group != target.group {
                continue;
            }

            if record.levels.contains(&target.runlevel) {
                self.start_tag(record).await;
            } else if self.table.contains(&record.tag) {
                self.stop_tag(&record.tag).await;
            }
        }

        // Purge tags that vanished from the configuration or turned off.
        for tag in self.table.tags() {
            if !active.contains(&tag) {
                self.stop_tag(&tag).await;
            }
        }
        self.throttles.retain(|tag, _| active.contains(tag));
    }

    async fn start_tag(&mut self, record: &TagRecord) {
        if self.table.contains(&record.tag) {
            return;
        }
        match record.mode {
            Mode::Off => {}
            Mode::Wait => {
                // Marker goes in first so records later in the file see
                // the tag as satisfied; it stays until the tag leaves the
                // active set.
                self.table.insert_done(record.tag.clone(), record.mode);
                info!(tag = %record.tag, cmd = %record.cmd, "running to completion");
                match self.host.run_to_completion(&record.cmd).await {
                    Ok(code) => debug!(tag = %record.tag, code = ?code, "command finished"),
                    Err(e) => warn!(tag = %record.tag, error = %e, "command failed"),
                }
            }
            Mode::Respawn => {
                let now = self.clock.now();
                let throttle = self
                    .throttles
                    .entry(record.tag.clone())
                    .or_insert_with(|| RespawnThrottle::new(now));
                if !throttle.admit(now) {
                    info!(tag = %record.tag, "respawn throttled, restart deferred");
                    return;
                }
                self.launch(record).await;
            }
            Mode::Once => {
                self.launch(record).await;
            }
        }
    }

    async fn launch(&mut self, record: &TagRecord) {
        match self.host.spawn_shell(&record.cmd).await {
            Ok(pid) => {
                info!(tag = %record.tag, pid, "started");
                self.table.insert_running(record.tag.clone(), pid, record.mode);
            }
            Err(e) => {
                // Per-tag failure: keep reconciling the rest.
                warn!(tag = %record.tag, error = %e, "launch failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
