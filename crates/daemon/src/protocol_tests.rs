// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_group_runlevel() {
    assert_eq!(
        Directive::parse("web run"),
        Ok(Directive::Switch {
            group: "web".to_string(),
            runlevel: "run".to_string(),
        })
    );
}

#[test]
fn parses_stopall() {
    assert_eq!(Directive::parse("stopall"), Ok(Directive::StopAll));
}

#[test]
fn tolerates_surrounding_whitespace() {
    assert_eq!(
        Directive::parse("  web \t runmore \n"),
        Ok(Directive::Switch {
            group: "web".to_string(),
            runlevel: "runmore".to_string(),
        })
    );
    assert_eq!(Directive::parse(" stopall \n"), Ok(Directive::StopAll));
}

#[test]
fn empty_line_is_rejected() {
    assert_eq!(Directive::parse(""), Err(ProtocolError::Empty));
    assert_eq!(Directive::parse("   \n"), Err(ProtocolError::Empty));
}

#[test]
fn wrong_arity_is_rejected() {
    assert_eq!(Directive::parse("web"), Err(ProtocolError::WrongArity(1)));
    assert_eq!(
        Directive::parse("web run extra"),
        Err(ProtocolError::WrongArity(3))
    );
}

#[test]
fn display_round_trips() {
    for directive in [
        Directive::Switch {
            group: "web".to_string(),
            runlevel: "run".to_string(),
        },
        Directive::StopAll,
    ] {
        assert_eq!(Directive::parse(&directive.to_string()), Ok(directive));
    }
}
