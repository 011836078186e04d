// Unit tests for marker parsing
// File-level behaviour is covered in integration_tests/registry.rs

use crate::registry::parse_marker;

/// **VALUE**: Accepts the exact format written by instances, with surrounding whitespace.
///
/// **WHY THIS MATTERS**: Hand-edited or editor-saved markers commonly gain a trailing
/// newline. Rejecting them would force a full range scan on every launch.
#[test]
fn given_decimal_port_with_whitespace_when_parsed_then_returns_port() {
    assert_eq!(parse_marker("5000"), Some(5000));
    assert_eq!(parse_marker("  5012\n"), Some(5012));
}

/// **VALUE**: Everything that is not a usable port reads as "no marker".
///
/// **BUG THIS CATCHES**: Would catch a parse that panics on garbage, or that lets
/// port 0 through and makes the coordinator handshake a port nothing can listen on.
#[test]
fn given_unusable_contents_when_parsed_then_returns_none() {
    // GIVEN: Contents a crashed or foreign writer could leave behind
    let cases = vec!["", "   ", "abc", "0", "-1", "70000", "5000abc", "5000 5001"];

    // WHEN/THEN: None of them yield a port
    for contents in cases {
        assert_eq!(parse_marker(contents), None, "Should reject: {contents:?}");
    }
}
