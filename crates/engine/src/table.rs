// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process table: a bidirectional tag↔pid mapping.
//!
//! Both directions are updated by the same method calls, so every live pid
//! has exactly one tag and vice versa. Entries in the [`TagState::Done`]
//! state have no pid side; they exist to suppress re-runs within the
//! current runlevel.

use rgs_core::TagId;
use rgs_inittab::Mode;
use std::collections::HashMap;

/// State of one supervised tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    /// A live supervised child.
    Running(i32),
    /// The tag's command already ran to completion: either a `wait`
    /// command that finished, or a non-respawn child that exited. Kept so
    /// the tag is not re-run while the current runlevel still matches.
    Done,
}

/// One entry of the process table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supervised {
    pub state: TagState,
    /// Mode cached from the last reconciliation, so child-exit handling
    /// does not re-read the configuration file.
    pub mode: Mode,
}

/// Bidirectional mapping of supervised tags.
#[derive(Debug, Default)]
pub struct ProcessTable {
    by_tag: HashMap<TagId, Supervised>,
    by_pid: HashMap<i32, TagId>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly launched child. Replaces any previous entry for
    /// the tag, dropping its stale pid mapping.
    pub fn insert_running(&mut self, tag: TagId, pid: i32, mode: Mode) {
        self.drop_pid_of(&tag);
        self.by_pid.insert(pid, tag.clone());
        self.by_tag.insert(
            tag,
            Supervised {
                state: TagState::Running(pid),
                mode,
            },
        );
    }

    /// Place the completed marker for a tag (used by `wait` mode before
    /// the synchronous command runs).
    pub fn insert_done(&mut self, tag: TagId, mode: Mode) {
        self.drop_pid_of(&tag);
        self.by_tag.insert(
            tag,
            Supervised {
                state: TagState::Done,
                mode,
            },
        );
    }

    /// Transition a running tag to `Done`, releasing its pid mapping.
    /// No-op for tags that are absent or already done.
    pub fn mark_done(&mut self, tag: &TagId) {
        let Some(entry) = self.by_tag.get_mut(tag) else {
            return;
        };
        if let TagState::Running(pid) = entry.state {
            self.by_pid.remove(&pid);
        }
        entry.state = TagState::Done;
    }

    /// Remove a tag, dropping both sides of the mapping.
    pub fn remove(&mut self, tag: &TagId) -> Option<Supervised> {
        let entry = self.by_tag.remove(tag)?;
        if let TagState::Running(pid) = entry.state {
            self.by_pid.remove(&pid);
        }
        Some(entry)
    }

    /// Refresh the cached mode of a tracked tag.
    pub fn set_mode(&mut self, tag: &TagId, mode: Mode) {
        if let Some(entry) = self.by_tag.get_mut(tag) {
            entry.mode = mode;
        }
    }

    pub fn get(&self, tag: &TagId) -> Option<&Supervised> {
        self.by_tag.get(tag)
    }

    pub fn contains(&self, tag: &TagId) -> bool {
        self.by_tag.contains_key(tag)
    }

    pub fn tag_for_pid(&self, pid: i32) -> Option<&TagId> {
        self.by_pid.get(&pid)
    }

    /// All tracked tags (arbitrary order).
    pub fn tags(&self) -> Vec<TagId> {
        self.by_tag.keys().cloned().collect()
    }

    /// All live pids (arbitrary order).
    pub fn pids(&self) -> Vec<i32> {
        self.by_pid.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    fn drop_pid_of(&mut self, tag: &TagId) {
        if let Some(Supervised {
            state: TagState::Running(pid),
            ..
        }) = self.by_tag.get(tag)
        {
            self.by_pid.remove(pid);
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
