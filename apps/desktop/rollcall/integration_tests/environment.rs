use rollcall::environment::{AUDIO_FILES, check};

use instance_core::config::AppConfig;

use tempfile::TempDir;

/// **VALUE**: A fresh data directory is prepared for the server.
///
/// **WHY THIS MATTERS**: The first launch on a new machine starts from an empty
/// directory. The server expects the roster file and static directory to exist.
///
/// **BUG THIS CATCHES**: Would catch the check only logging instead of creating, which
/// would surface later as 404s on audio and a broken roster list.
#[tokio::test]
async fn given_empty_data_dir_when_checked_then_creates_static_dir_and_roster() {
    // GIVEN: An empty data directory and default config
    let dir = TempDir::new().expect("tempdir");
    let config = AppConfig::default();

    // WHEN: Running the environment check
    let report = check(&config, dir.path()).await.expect("check succeeds");

    // THEN: Static dir and an empty roster exist, audio is reported missing
    assert!(report.static_dir_created);
    assert!(report.static_dir.is_dir());
    assert!(report.roster_created);
    let roster = std::fs::read_to_string(&report.roster_path).expect("roster file");
    assert_eq!(roster.trim(), "[]");
    assert_eq!(report.missing_audio.len(), AUDIO_FILES.len());
}

/// **VALUE**: Existing data is left alone.
#[tokio::test]
async fn given_prepared_data_dir_when_checked_then_keeps_roster_and_finds_audio() {
    // GIVEN: A directory with a roster and all audio files
    let dir = TempDir::new().expect("tempdir");
    let config = AppConfig::default();
    let static_dir = config.static_dir(dir.path());
    std::fs::create_dir_all(&static_dir).expect("static dir");
    for name in AUDIO_FILES {
        std::fs::write(static_dir.join(name), b"ID3").expect("audio file");
    }
    std::fs::write(config.roster_path(dir.path()), r#"["Ana", "Luis"]"#).expect("roster");

    // WHEN: Running the check
    let report = check(&config, dir.path()).await.expect("check succeeds");

    // THEN: Nothing is created or overwritten
    assert!(!report.static_dir_created);
    assert!(!report.roster_created);
    assert!(report.missing_audio.is_empty());
    let roster = std::fs::read_to_string(config.roster_path(dir.path())).expect("roster");
    assert_eq!(roster, r#"["Ana", "Luis"]"#);
}
