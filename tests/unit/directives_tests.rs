/*!
 * Tests for directive guarding with per-document markers
 */

use tplmin::errors::MinifyError;
use tplmin::template::DirectiveGuard;

/// Test that two documents get guards that decode each other's text unchanged
#[test]
fn test_for_document_withRandomMarker_shouldRoundTrip() {
    let script = "var a = {%$a%};\n{%foreach $items as $i%}add({%$i|json%});{%/foreach%}";
    let guard = DirectiveGuard::for_document(script).unwrap();

    let encoded = guard.encode(script);
    assert!(encoded.contains(guard.marker()));
    assert!(!encoded.contains("{%$a%};"));

    assert_eq!(guard.decode(&encoded).unwrap(), script);
}

/// Test that the keep predicate follows the guard's own marker
#[test]
fn test_keeps_comment_withForeignMarker_shouldReject() {
    let guard = DirectiveGuard::with_marker("abc123").unwrap();
    let other = DirectiveGuard::with_marker("xyz789").unwrap();

    let body = "*abc123**{%$x%}**abc123*";
    assert!(guard.keeps_comment(body));
    assert!(!other.keeps_comment(body));
}

/// Test that the assignment disguise produces a valid string literal
#[test]
fn test_disguise_assignments_withSingleQuotes_shouldEscape() {
    let guard = DirectiveGuard::with_marker("m").unwrap();
    let out = guard.disguise_assignments("x: {%$v|default:'n'%}\n");
    assert_eq!(out, "x: \"||m||{%$v|default:\\'n\\'%}||m||\"\n");
    assert_eq!(guard.decode(&out).unwrap(), "x: {%$v|default:'n'%}\n");
}

/// Test that directive text containing backslashes survives the literal stage
#[test]
fn test_decode_withBackslashes_shouldRestoreExactText() {
    let guard = DirectiveGuard::with_marker("m").unwrap();
    let script = r#"var p = {%$path|replace:"\\":"/"%};"#;
    assert_eq!(guard.decode(&guard.encode(script)).unwrap(), script);
}

/// Test that a document already containing the marker is refused
#[test]
fn test_ensure_absent_from_withMarkerInDocument_shouldFail() {
    let guard = DirectiveGuard::with_marker("taken").unwrap();
    assert!(matches!(
        guard.ensure_absent_from("/* taken */"),
        Err(MinifyError::MarkerCollision(_))
    ));
}
