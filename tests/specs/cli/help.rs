//! CLI help output specs.

use assert_cmd::Command;

fn rgs_output(args: &[&str]) -> std::process::Output {
    Command::cargo_bin("rgs").unwrap().args(args).output().unwrap()
}

fn rgsd_output(args: &[&str]) -> std::process::Output {
    std::process::Command::new(crate::prelude::rgsd_binary())
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn rgs_no_args_shows_usage_and_exits_zero() {
    let output = rgs_output(&[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn rgs_help_shows_usage() {
    let output = rgs_output(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn rgs_version_shows_version() {
    let output = rgs_output(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.1"));
}

#[test]
fn rgs_group_without_runlevel_fails() {
    let output = rgs_output(&["web"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("stopall"));
}

#[test]
fn rgsd_help_shows_usage() {
    let output = rgsd_output(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rgsd"));
    assert!(stdout.contains("USAGE"));
}

#[test]
fn rgsd_version_shows_version() {
    let output = rgsd_output(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.1"));
}

#[test]
fn rgsd_rejects_unknown_arguments() {
    let output = rgsd_output(&["--bogus"]);
    assert!(!output.status.success());
}
