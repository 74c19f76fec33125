// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rgs-inittab: the configuration table for the resource group supervisor.
//!
//! The table is a text file of colon-separated five-field records:
//!
//! ```text
//! <group>:<tag>:<levels>:<mode>:<cmd>
//! ```
//!
//! It is re-read on every reconciliation; there is no caching, so editing
//! the file and issuing a directive is enough to pick up changes.

mod parser;
mod record;

pub use parser::{load, parse_str, LoadError};
pub use record::{Levels, Mode, TagRecord};
