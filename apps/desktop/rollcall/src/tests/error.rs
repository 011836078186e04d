// Unit tests for error module

use crate::error::RollcallError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: The final diagnostic is one line naming the failure and its origin.
///
/// **WHY THIS MATTERS**: This is what the user sees on the console when a launch fails.
/// Without the location, a report like "no free port" cannot be traced to the code path.
///
/// **BUG THIS CATCHES**: Would catch the Display format losing the message or location.
#[test]
fn given_launch_error_when_formatted_then_includes_message_and_location() {
    // GIVEN: A launch error
    let err = RollcallError::Launch {
        message: String::from("No available port in [5000, 5050)"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting it
    let text = err.to_string();

    // THEN: Variant, message and file are all present on one line
    assert!(text.starts_with("Launch Error: "));
    assert!(text.contains("[5000, 5050)"));
    assert!(text.contains("error.rs"));
    assert!(!text.contains('\n'));
}

/// **VALUE**: Errors serialize with their variant tag and fields.
///
/// **WHY THIS MATTERS**: Structured diagnostics keep the variant and location as
/// separate fields instead of one formatted string.
///
/// **BUG THIS CATCHES**: Would catch a non-serializable field being added to a variant.
#[test]
fn given_rollcall_error_when_serialized_then_contains_tag_and_message() {
    // GIVEN: An environment error
    let err = RollcallError::Environment {
        message: String::from("Static directory unwritable"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&err).expect("serializable");

    // THEN: Variant tag and message are present
    assert_eq!(json["type"], "Environment");
    assert_eq!(json["data"]["message"], "Static directory unwritable");
    assert!(json["data"]["location"].is_object());
}
