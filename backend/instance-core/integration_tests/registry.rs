use instance_core::registry::PortMarker;

use tempfile::TempDir;

fn marker_in(dir: &TempDir) -> PortMarker {
    PortMarker::new(dir.path().join("rollcall.port"))
}

/// **VALUE**: A written marker reads back as the same port, stored as bare decimal text.
///
/// **WHY THIS MATTERS**: Other launches (and people debugging) read this file. Any
/// framing beyond the decimal port would break the format older launchers expect.
#[test]
fn given_written_marker_when_read_then_returns_port_and_plain_contents() {
    // GIVEN: An empty data directory
    let dir = TempDir::new().expect("tempdir");
    let marker = marker_in(&dir);

    // WHEN: Writing a port
    marker.write(5007).expect("write marker");

    // THEN: It reads back and the file holds only the digits
    assert_eq!(marker.read(), Some(5007));
    let contents = std::fs::read_to_string(marker.path()).expect("read file");
    assert_eq!(contents, "5007");
}

/// **VALUE**: Writing replaces the previous marker and leaves no temp files behind.
#[test]
fn given_existing_marker_when_rewritten_then_replaced_without_leftovers() {
    let dir = TempDir::new().expect("tempdir");
    let marker = marker_in(&dir);

    marker.write(5000).expect("first write");
    marker.write(5001).expect("second write");

    assert_eq!(marker.read(), Some(5001));
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("list dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(entries, vec!["rollcall.port".to_string()]);
}

#[test]
fn given_no_marker_when_read_then_returns_none() {
    let dir = TempDir::new().expect("tempdir");

    assert_eq!(marker_in(&dir).read(), None);
}

/// **VALUE**: A corrupted marker reads as absent instead of failing the launch.
///
/// **BUG THIS CATCHES**: Would catch a parse failure propagating out of `read()` and
/// turning a half-written file into a fatal startup error.
#[test]
fn given_garbage_marker_when_read_then_returns_none() {
    let dir = TempDir::new().expect("tempdir");
    let marker = marker_in(&dir);
    std::fs::write(marker.path(), "not-a-port").expect("write garbage");

    assert_eq!(marker.read(), None);
}

/// **VALUE**: Removing twice is fine.
///
/// **WHY THIS MATTERS**: Both the stale-marker path and shutdown cleanup remove the
/// marker; either may run after the other already did.
#[test]
fn given_marker_when_removed_twice_then_both_succeed() {
    let dir = TempDir::new().expect("tempdir");
    let marker = marker_in(&dir);
    marker.write(5000).expect("write marker");

    assert!(marker.remove().is_ok());
    assert!(marker.remove().is_ok());
    assert!(!marker.path().exists());
}

#[test]
fn given_missing_directory_when_written_then_returns_write_error() {
    let dir = TempDir::new().expect("tempdir");
    let marker = PortMarker::new(dir.path().join("missing").join("rollcall.port"));

    let result = marker.write(5000);

    assert!(result.is_err(), "Writing into a missing directory should fail");
}
