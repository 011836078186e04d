use rollcall::error::RollcallError;
use rollcall::logger::initialize;

use std::path::PathBuf;

use serial_test::serial;

/// **VALUE**: Verifies that the logger handles an unusable directory gracefully.
///
/// **WHY THIS MATTERS**: The launcher runs from whatever directory it was started in.
/// If that directory is read-only the user must get a clear error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` is unwrapped instead of
/// mapped into a `RollcallError`.
#[test]
#[serial]
fn given_invalid_log_dir_when_initialize_called_then_returns_error() {
    // GIVEN: A path that can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Calling initialize with it
    let result = initialize(&invalid_dir);

    // THEN: A Rollcall error naming the log file is returned
    match result {
        Err(RollcallError::Rollcall { message, .. }) => {
            assert!(message.contains("rollcall.log"), "Got: {message}");
        }
        other => panic!("Expected RollcallError::Rollcall, got {other:?}"),
    }
}
