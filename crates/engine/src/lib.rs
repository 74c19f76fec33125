// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rgs-engine: the supervisor state machine.
//!
//! The engine owns the process table and implements reconciliation: given a
//! `(group, runlevel)` target it computes and applies the start/stop delta
//! against the configuration table, launches and terminates children through
//! a [`host::ProcessHost`], and reacts to child exits.

pub mod host;
pub mod supervisor;
pub mod table;
pub mod throttle;

pub use host::{HostError, ProcessHost, StopSignal, UnixProcessHost};
pub use supervisor::{ReconcileError, Supervisor, Target};
pub use table::{ProcessTable, Supervised, TagState};
pub use throttle::RespawnThrottle;

#[cfg(any(test, feature = "test-support"))]
pub use host::{FakeProcessHost, HostCall};
