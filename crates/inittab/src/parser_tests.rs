// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

#[test]
fn parses_single_record() {
    let records = parse_str("web:w1:run:respawn:/usr/bin/webd\n").unwrap();

    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.group, "web");
    assert_eq!(rec.tag, "w1");
    assert!(rec.levels.contains("run"));
    assert_eq!(rec.mode, Mode::Respawn);
    assert_eq!(rec.cmd, "/usr/bin/webd");
}

#[test]
fn preserves_file_order() {
    let input = "web:w1:run:respawn:/usr/bin/webd\n\
                 web:w2:run,runmore:respawn:/usr/bin/wd2\n\
                 mail:m1:run:wait:/usr/bin/mount-mqueue\n";
    let records = parse_str(input).unwrap();

    let tags: Vec<&str> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["w1", "w2", "m1"]);
}

#[test]
fn skips_comments_and_blank_lines() {
    let input = "# the web tier\n\
                 \n\
                 web:w1:run:respawn:/usr/bin/webd\n\
                 \t \n\
                 # done\n";
    let records = parse_str(input).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn cmd_keeps_embedded_colons() {
    let records =
        parse_str("web:w1:run:once:/usr/bin/env PATH=/bin:/usr/bin webd --listen host:80\n")
            .unwrap();
    assert_eq!(
        records[0].cmd,
        "/usr/bin/env PATH=/bin:/usr/bin webd --listen host:80"
    );
}

#[test]
fn levels_comma_list_is_split() {
    let records = parse_str("web:w2:run,runmore,maint:respawn:/usr/bin/wd2\n").unwrap();
    let levels = &records[0].levels;

    assert_eq!(levels.tokens().len(), 3);
    assert!(levels.contains("maint"));
    assert!(!levels.contains("run,runmore"));
}

#[test]
fn unknown_mode_falls_through_to_once() {
    let records = parse_str("web:w1:run:bogus:/usr/bin/webd\n").unwrap();
    assert_eq!(records[0].mode, Mode::Once);
}

#[yare::parameterized(
    four_fields = { "web:w1:run:respawn" },
    one_field   = { "just-some-text" },
    three_fields = { "web:w1:run" },
)]
fn too_few_fields_is_malformed(input: &str) {
    let err = parse_str(input).unwrap_err();
    assert!(matches!(err, LoadError::Malformed { line: 1, .. }));
}

#[test]
fn malformed_error_names_the_line() {
    let input = "web:w1:run:respawn:/usr/bin/webd\n\
                 # comment\n\
                 broken-line\n";
    let err = parse_str(input).unwrap_err();
    match err {
        LoadError::Malformed { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[yare::parameterized(
    empty_group = { ":w1:run:respawn:/usr/bin/webd", "group" },
    empty_tag   = { "web::run:respawn:/usr/bin/webd", "tag" },
    empty_level = { "web:w1:run,,maint:respawn:/usr/bin/webd", "runlevel" },
)]
fn empty_tokens_are_malformed(input: &str, what: &str) {
    let err = parse_str(input).unwrap_err();
    match err {
        LoadError::Malformed { reason, .. } => assert!(reason.contains(what)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn empty_cmd_is_accepted() {
    // Four colons and nothing after the last: five fields, empty command.
    let records = parse_str("web:w1:run:once:\n").unwrap();
    assert_eq!(records[0].cmd, "");
}

#[test]
fn duplicate_tag_is_rejected() {
    let input = "web:w1:run:respawn:/usr/bin/webd\n\
                 mail:w1:run:once:/usr/sbin/sendmail\n";
    let err = parse_str(input).unwrap_err();
    match err {
        LoadError::DuplicateTag { line, tag } => {
            assert_eq!(line, 2);
            assert_eq!(tag, "w1");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn load_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("isinittab");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "web:w1:run:respawn:/usr/bin/webd").unwrap();

    let records = load(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tag, "w1");
}

#[test]
fn load_missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("no-such-table")).unwrap_err();
    assert!(matches!(err, LoadError::Unavailable { .. }));
}
