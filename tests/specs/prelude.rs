//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// Aggressive timeouts for fast tests.
const RGS_TIMEOUT_CONNECT_MS: &str = "5000";
const RGS_TIMEOUT_IPC_MS: &str = "1000";
const RGS_CONNECT_POLL_MS: &str = "10";

/// How long specs poll for an expected condition before giving up.
pub const SPEC_WAIT_MAX: Duration = Duration::from_secs(10);
pub const SPEC_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Returns the path to a binary built alongside this test executable.
/// The test binary lives at target/debug/deps/specs-<hash>, so its
/// grandparent is target/debug/ where rgs and rgsd are built.
fn binary_path(name: &str) -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let candidate = debug_dir.join(name);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    PathBuf::from(name)
}

/// Returns the path to the rgsd daemon binary.
pub fn rgsd_binary() -> PathBuf {
    binary_path("rgsd")
}

/// An rgs invocation scoped to a scratch run directory.
pub struct Rgs {
    run_dir: PathBuf,
    inittab: PathBuf,
}

impl Rgs {
    /// Scope rgs to `dir`: run directory `dir/run`, table `dir/isinittab`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            run_dir: dir.join("run"),
            inittab: dir.join("isinittab"),
        }
    }

    pub fn write_inittab(&self, content: &str) {
        std::fs::write(&self.inittab, content).unwrap();
    }

    pub fn socket_path(&self) -> PathBuf {
        self.run_dir.join("init.s")
    }

    pub fn log_path(&self) -> PathBuf {
        self.run_dir.join("rgsd.log")
    }

    pub fn daemon_pid(&self) -> Option<u32> {
        std::fs::read_to_string(self.run_dir.join("rgsd.pid"))
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Run `rgs` with the given arguments against this scratch scope.
    pub fn cmd(&self, args: &[&str]) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("rgs").unwrap();
        cmd.args(args)
            .env("RGS_RUN_DIR", &self.run_dir)
            .env("RGS_INITTAB", &self.inittab)
            .env("RGS_DAEMON_BINARY", rgsd_binary())
            .env("RGS_TIMEOUT_CONNECT_MS", RGS_TIMEOUT_CONNECT_MS)
            .env("RGS_TIMEOUT_IPC_MS", RGS_TIMEOUT_IPC_MS)
            .env("RGS_CONNECT_POLL_MS", RGS_CONNECT_POLL_MS);
        cmd
    }

    /// Best-effort teardown so a failing spec does not leak a daemon.
    pub fn stopall(&self) {
        let _ = self.cmd(&["stopall"]).output();
    }
}

impl Drop for Rgs {
    fn drop(&mut self) {
        self.stopall();
    }
}

/// Check if a process with the given PID exists.
pub fn process_exists(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Poll until `cond` holds, panicking with `what` on timeout.
pub fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let start = Instant::now();
    while start.elapsed() < SPEC_WAIT_MAX {
        if cond() {
            return;
        }
        std::thread::sleep(SPEC_POLL_INTERVAL);
    }
    panic!("timed out waiting for: {what}");
}
