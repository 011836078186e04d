// Unit tests for browser module private functions

use crate::browser::build_open_command;

/// **VALUE**: Verifies the platform opener receives the URL untouched.
///
/// **WHY THIS MATTERS**: The opener is the only way the user reaches the UI after
/// a launch. A mangled argument opens a blank page or nothing at all.
///
/// **BUG THIS CATCHES**: Would catch the URL being dropped or split across arguments.
#[test]
fn given_url_when_build_open_command_called_then_passes_url_as_last_argument() {
    // GIVEN: An instance URL
    let url = "http://127.0.0.1:5000/";

    // WHEN: Building the opener command
    let cmd = build_open_command(url);

    // THEN: The URL is the final argument
    let last = cmd.as_std().get_args().last();
    assert_eq!(last, Some(std::ffi::OsStr::new(url)));
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
#[test]
fn given_linux_when_build_open_command_called_then_uses_xdg_open() {
    let cmd = build_open_command("http://127.0.0.1:5000/");

    assert_eq!(cmd.as_std().get_program(), "xdg-open");
}
