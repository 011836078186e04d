use crate::{ModelError, PortRange};

/// **VALUE**: The default range is the documented `[5000, 5050)`.
///
/// **WHY THIS MATTERS**: Every launcher on the machine must scan the same ports,
/// otherwise a second launch could miss a running instance and start a duplicate.
#[test]
fn given_default_range_when_inspected_then_covers_5000_to_5049() {
    let range = PortRange::default();

    assert_eq!(range.start(), 5000);
    assert_eq!(range.end(), 5050);
    assert_eq!(range.len(), 50);
    assert!(range.contains(5049));
    assert!(!range.contains(5050), "End is exclusive");
    assert_eq!(range.ports().next(), Some(5000), "Scan starts at the lowest port");
}

/// **VALUE**: Rejects ranges that cannot be scanned.
///
/// **BUG THIS CATCHES**: Would catch a config file with `end <= start` silently
/// producing an empty scan and a misleading "no free port" diagnostic.
#[test]
fn given_inverted_or_zero_range_when_created_then_returns_error() {
    assert!(matches!(
        PortRange::new(5050, 5000),
        Err(ModelError::PortRange { .. })
    ));
    assert!(matches!(
        PortRange::new(5000, 5000),
        Err(ModelError::PortRange { .. })
    ));
    assert!(matches!(
        PortRange::new(0, 10),
        Err(ModelError::PortRange { .. })
    ));
}

#[test]
fn given_range_when_displayed_then_shows_half_open_interval() {
    let range = PortRange::new(6000, 6010).expect("valid range");

    assert_eq!(range.to_string(), "[6000, 6010)");
}

/// **VALUE**: Ranges round-trip through the config file shape.
#[test]
fn given_json_range_when_deserialized_then_fields_are_kept() {
    let range: PortRange =
        serde_json::from_str(r#"{"start": 7000, "end": 7003}"#).expect("valid json");

    assert_eq!(range.ports().collect::<Vec<_>>(), vec![7000, 7001, 7002]);
}
