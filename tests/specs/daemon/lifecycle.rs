//! Daemon lifecycle specs: bootstrap, supervision, stopall teardown.

use crate::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn directive_boots_daemon_supervises_and_stopall_tears_down() {
    let dir = tempfile::tempdir().unwrap();
    let rgs = Rgs::in_dir(dir.path());
    rgs.write_inittab("web:w1:run:respawn:sleep 30\n");

    rgs.cmd(&["web", "run"]).assert().success();

    // The bootstrap left a bound socket and a locked pid file behind.
    wait_until("daemon socket to appear", || rgs.socket_path().exists());
    let daemon_pid = rgs.daemon_pid().unwrap();
    assert!(process_exists(daemon_pid));

    // The supervised tag shows up in the daemon log once launched.
    wait_until("w1 to be started", || {
        std::fs::read_to_string(rgs.log_path())
            .map(|log| log.contains("w1") && log.contains("started"))
            .unwrap_or(false)
    });

    rgs.cmd(&["stopall"]).assert().success();

    wait_until("daemon to exit", || !process_exists(daemon_pid));
    wait_until("socket file to be removed", || !rgs.socket_path().exists());
}

#[test]
#[serial]
fn second_directive_reuses_the_running_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let rgs = Rgs::in_dir(dir.path());
    rgs.write_inittab(
        "web:w1:run:respawn:sleep 30\n\
         mail:m1:run:respawn:sleep 30\n",
    );

    rgs.cmd(&["web", "run"]).assert().success();
    wait_until("daemon socket to appear", || rgs.socket_path().exists());
    let first_pid = rgs.daemon_pid().unwrap();

    rgs.cmd(&["mail", "run"]).assert().success();

    wait_until("m1 to be started", || {
        std::fs::read_to_string(rgs.log_path())
            .map(|log| log.contains("m1"))
            .unwrap_or(false)
    });
    // Same daemon served both directives.
    assert_eq!(rgs.daemon_pid(), Some(first_pid));

    rgs.cmd(&["stopall"]).assert().success();
    wait_until("daemon to exit", || !process_exists(first_pid));
}

#[test]
#[serial]
fn missing_config_leaves_daemon_accepting() {
    let dir = tempfile::tempdir().unwrap();
    let rgs = Rgs::in_dir(dir.path());
    // No inittab written: every reconciliation fails, but the directive
    // is still accepted and the daemon keeps serving.

    rgs.cmd(&["web", "run"]).assert().success();
    wait_until("daemon socket to appear", || rgs.socket_path().exists());

    wait_until("reconcile failure to be logged", || {
        std::fs::read_to_string(rgs.log_path())
            .map(|log| log.contains("directive not applied"))
            .unwrap_or(false)
    });

    // Still alive and accepting: stopall is handled cleanly.
    let daemon_pid = rgs.daemon_pid().unwrap();
    rgs.cmd(&["stopall"]).assert().success();
    wait_until("daemon to exit", || !process_exists(daemon_pid));
}

#[test]
fn stopall_without_daemon_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let rgs = Rgs::in_dir(dir.path());

    let output = rgs.cmd(&["stopall"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("no daemon running"));
}
