use instance_core::error::CoreError;
use instance_core::error::coordinator::CoordinatorError;
use instance_core::error::roster::RosterError;
use instance_core::error::server::ServerError;
use models::{ErrorLocation, PortRange};

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

/// **VALUE**: The exhaustion diagnostic names the range and where it was raised.
///
/// **WHY THIS MATTERS**: This is the message a user sees when every port is taken.
/// Without the range they cannot tell which ports to free.
#[test]
fn given_ports_exhausted_error_when_formatted_then_includes_message_and_location() {
    // GIVEN: An exhaustion error for the default range
    let range = PortRange::default();
    let err = CoordinatorError::PortsExhausted {
        message: format!("No available port in {range}"),
        range,
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting it
    let error_string = err.to_string();

    // THEN: Type, range and file location are all present
    assert!(error_string.contains("Ports Exhausted Error"));
    assert!(error_string.contains("[5000, 5050)"));
    assert!(error_string.contains("error.rs"));
}

/// **VALUE**: A failed bind keeps the OS error reachable through the source chain.
///
/// **BUG THIS CATCHES**: Would catch a lost `#[source]`, which hides "address in use"
/// versus "permission denied" from the final diagnostic.
#[test]
fn given_bind_failed_error_when_inspected_then_preserves_chain() {
    // GIVEN: A bind failure wrapped by the coordinator
    let bind = ServerError::Bind {
        message: "Failed to bind 127.0.0.1:5000".to_string(),
        port: 5000,
        location: ErrorLocation::from(Location::caller()),
        source: IoError::new(ErrorKind::AddrInUse, "address in use"),
    };
    let err = CoordinatorError::BindFailed {
        message: "Failed to bind port 5000 after 2 attempt(s)".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: bind,
    };

    // WHEN: Walking the source chain
    let server = err.source().expect("Should have server error source");
    let io = server.source().expect("Should have IO error source");

    // THEN: Both layers are preserved
    assert!(server.to_string().contains("Failed to bind 127.0.0.1:5000"));
    assert!(io.to_string().contains("address in use"));
}

/// **VALUE**: Client-facing roster messages never leak source locations.
#[test]
fn given_roster_error_when_message_taken_then_excludes_location() {
    let err = RosterError::Duplicate {
        message: "Student 'Ana' already exists".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    assert_eq!(err.message(), "Student 'Ana' already exists");
    assert!(err.to_string().contains("error.rs"), "Display keeps the location");
}

#[test]
fn given_module_error_when_converted_to_core_error_then_display_is_transparent() {
    let err = RosterError::Empty {
        message: "There are no students to pick from".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };
    let expected = err.to_string();

    let core: CoreError = err.into();

    assert_eq!(core.to_string(), expected);
}
