use crate::{InstanceInfoBuilder, ModelError};

fn assert_validation_message(result: Result<crate::InstanceInfo, ModelError>, expected: &str) {
    match result {
        Err(ModelError::Validation { message, .. }) => assert_eq!(message, expected),
        other => panic!("Expected validation error '{expected}', got {other:?}"),
    }
}

/// **VALUE**: Verifies that builder validation rejects port zero.
///
/// **WHY THIS MATTERS**: Port 0 means "let the OS choose" when binding. An instance
/// description carrying it could never be handed to the browser or the marker.
///
/// **BUG THIS CATCHES**: Would catch if the non-zero check is removed during refactoring.
#[test]
fn given_zero_port_when_building_instance_info_then_returns_validation_error() {
    // GIVEN: Builder with port set to zero
    let builder = InstanceInfoBuilder::default()
        .with_port(0)
        .with_base_url("http://127.0.0.1:0")
        .with_owned(true);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    assert_validation_message(result, "Port must be non-zero");
}

/// **VALUE**: Verifies that a missing port is rejected.
#[test]
fn given_missing_port_when_building_then_returns_validation_error() {
    // GIVEN: Builder without port
    let builder = InstanceInfoBuilder::default()
        .with_base_url("http://127.0.0.1:5000")
        .with_owned(true);

    // WHEN / THEN
    assert_validation_message(builder.build(), "Port is required");
}

/// **VALUE**: Verifies that only plain http base URLs are accepted.
///
/// **WHY THIS MATTERS**: Instances only ever listen on loopback without TLS, so an
/// https or ftp URL means the value was assembled from the wrong source.
#[test]
fn given_non_http_scheme_when_building_then_returns_validation_error() {
    // GIVEN: Builder with an ftp URL
    let builder = InstanceInfoBuilder::default()
        .with_port(5000)
        .with_base_url("ftp://127.0.0.1:5000")
        .with_owned(true);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error naming the URL
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert!(message.starts_with("Invalid base URL format:"));
            assert!(message.contains("ftp://"));
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies that the base URL has to agree with the port.
///
/// **BUG THIS CATCHES**: Would catch a delegation that reports port 5007 but opens
/// the browser on a URL built from a different port.
#[test]
fn given_base_url_for_other_port_when_building_then_returns_validation_error() {
    // GIVEN: Port and URL that disagree
    let builder = InstanceInfoBuilder::default()
        .with_port(5007)
        .with_base_url("http://127.0.0.1:5000")
        .with_owned(false);

    // WHEN / THEN
    assert_validation_message(
        builder.build(),
        "Base URL http://127.0.0.1:5000 does not match port 5007",
    );
}

#[test]
fn given_empty_base_url_when_building_then_returns_validation_error() {
    let builder = InstanceInfoBuilder::default()
        .with_port(5000)
        .with_base_url("")
        .with_owned(true);

    assert_validation_message(builder.build(), "Base URL cannot be empty");
}

#[test]
fn given_missing_owned_flag_when_building_then_returns_validation_error() {
    let builder = InstanceInfoBuilder::default()
        .with_port(5000)
        .with_base_url("http://127.0.0.1:5000");

    assert_validation_message(builder.build(), "Owned is required");
}

/// **VALUE**: Happy path for both owned (served) and delegated instances.
#[test]
fn given_all_valid_fields_when_building_then_returns_instance_info() {
    // GIVEN: A served and a delegated description
    let served = InstanceInfoBuilder::default()
        .with_port(5000)
        .with_base_url("http://127.0.0.1:5000")
        .with_owned(true)
        .build();
    let delegated = InstanceInfoBuilder::default()
        .with_port(65535)
        .with_base_url("http://127.0.0.1:65535")
        .with_owned(false)
        .build();

    // THEN: Both build with the fields preserved
    let served = served.expect("served instance should build");
    assert_eq!(served.port, 5000);
    assert_eq!(served.base_url, "http://127.0.0.1:5000");
    assert!(served.owned);

    let delegated = delegated.expect("delegated instance should build");
    assert_eq!(delegated.port, 65535);
    assert!(!delegated.owned);
}
