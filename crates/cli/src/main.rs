// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rgs - cluster-aware resource group supervisor CLI
//!
//! `rgs <group> <runlevel>` reconciles a resource group to a runlevel,
//! starting the host daemon first if none is running. `rgs stopall`
//! terminates every supervised process and stops the daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod daemon_process;
mod env;

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use client::{ClientError, SupervisorClient};
use rgs_daemon::Directive;

#[derive(Parser)]
#[command(
    name = "rgs",
    version,
    about = "Resource group supervisor - reconcile groups of processes to runlevels"
)]
struct Cli {
    /// Resource group to reconcile, or the `stopall` verb
    group: Option<String>,

    /// Runlevel to bring the group to
    runlevel: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match (cli.group, cli.runlevel) {
        (None, _) => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
        (Some(verb), None) if verb == "stopall" => stopall().await,
        (Some(_), None) => {
            bail!("expected `rgs <group> <runlevel>` or `rgs stopall`")
        }
        (Some(group), Some(runlevel)) => tell(&group, &runlevel).await,
    }
}

/// Send a `(group, runlevel)` directive, starting the daemon if needed.
async fn tell(group: &str, runlevel: &str) -> Result<()> {
    let client = SupervisorClient::new();
    client
        .send_or_start(&Directive::Switch {
            group: group.to_string(),
            runlevel: runlevel.to_string(),
        })
        .await?;
    Ok(())
}

/// Ask the daemon to terminate everything and exit. Idempotent: a missing
/// daemon means there is nothing to stop.
async fn stopall() -> Result<()> {
    let client = SupervisorClient::new();
    match client.send(&Directive::StopAll).await {
        Ok(()) => Ok(()),
        Err(ClientError::DaemonNotRunning) => {
            println!("no daemon running");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
