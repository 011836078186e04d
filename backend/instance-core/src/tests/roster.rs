use crate::error::roster::RosterError;
use crate::roster::{MAX_NAME_CHARS, validate_name};

/// **VALUE**: Names are trimmed before they are stored.
///
/// **WHY THIS MATTERS**: " Ana" and "Ana" must be the same student, otherwise the
/// duplicate check is trivially bypassed from the UI.
#[test]
fn given_name_with_padding_when_validated_then_returns_trimmed_name() {
    let name = validate_name("  Ana María \t").expect("valid name");

    assert_eq!(name, "Ana María");
}

/// **VALUE**: Blank names are rejected.
///
/// **BUG THIS CATCHES**: Would catch whitespace-only names slipping into the roster
/// as empty entries.
#[test]
fn given_blank_name_when_validated_then_returns_validation_error() {
    for raw in ["", "   ", "\n\t"] {
        let result = validate_name(raw);
        assert!(
            matches!(result, Err(RosterError::Validation { .. })),
            "Should reject {raw:?}"
        );
    }
}

/// **VALUE**: The length limit counts characters, not bytes.
///
/// **BUG THIS CATCHES**: Would catch a `len()` check that rejects accented names well
/// under the limit because they take more than one byte per character.
#[test]
fn given_name_at_char_limit_when_validated_then_accepts_and_rejects_one_more() {
    // GIVEN: Names made of two-byte characters at and just over the limit
    let at_limit = "é".repeat(MAX_NAME_CHARS);
    let over_limit = "é".repeat(MAX_NAME_CHARS + 1);

    // WHEN/THEN: Exactly the limit is fine, one more is not
    assert!(validate_name(&at_limit).is_ok());
    assert!(matches!(
        validate_name(&over_limit),
        Err(RosterError::Validation { .. })
    ));
}
