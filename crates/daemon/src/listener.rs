// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the control socket.
//!
//! Connections are handled one at a time: each carries a single directive
//! line, which is parsed and funneled onto the event channel for the
//! engine loop. Malformed lines are logged and ignored. If the listening
//! socket becomes unusable it is rebuilt (unlink + rebind).

use crate::protocol::{Directive, READ_TIMEOUT};
use rgs_core::Event;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Pause between rebind attempts when the socket cannot be rebuilt.
const REBUILD_PAUSE: Duration = Duration::from_secs(1);

/// Listener for accepting control connections.
pub struct Listener {
    socket: UnixListener,
    socket_path: PathBuf,
    event_tx: mpsc::Sender<Event>,
}

impl Listener {
    pub fn new(socket: UnixListener, socket_path: PathBuf, event_tx: mpsc::Sender<Event>) -> Self {
        Self {
            socket,
            socket_path,
            event_tx,
        }
    }

    /// Accept connections until the engine loop goes away.
    pub async fn run(mut self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    if self.handle_connection(stream).await.is_err() {
                        // Engine loop gone: daemon is shutting down.
                        return;
                    }
                }
                Err(e) => {
                    error!(error = %e, "accept failed, rebuilding control socket");
                    self.rebuild().await;
                }
            }
        }
    }

    /// Read one directive line off the connection and emit it as an
    /// event. Errs only when the event channel is closed.
    async fn handle_connection(&self, stream: UnixStream) -> Result<(), ()> {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();

        match tokio::time::timeout(READ_TIMEOUT, reader.read_line(&mut line)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "failed to read directive");
                return Ok(());
            }
            Err(_elapsed) => {
                warn!("timed out reading directive");
                return Ok(());
            }
        }

        let event = match Directive::parse(&line) {
            Ok(Directive::Switch { group, runlevel }) => {
                debug!(group = %group, runlevel = %runlevel, "directive received");
                Event::Directive { group, runlevel }
            }
            Ok(Directive::StopAll) => {
                info!("stopall received");
                Event::StopAll
            }
            Err(e) => {
                warn!(line = line.trim(), error = %e, "ignoring malformed directive");
                return Ok(());
            }
        };

        self.event_tx.send(event).await.map_err(|_| ())
    }

    /// Unlink and rebind the socket, retrying until it works.
    async fn rebuild(&mut self) {
        loop {
            let _ = std::fs::remove_file(&self.socket_path);
            match UnixListener::bind(&self.socket_path) {
                Ok(socket) => {
                    info!(path = %self.socket_path.display(), "rebuilt control socket");
                    self.socket = socket;
                    return;
                }
                Err(e) => {
                    error!(error = %e, "rebind failed, retrying");
                    tokio::time::sleep(REBUILD_PAUSE).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
