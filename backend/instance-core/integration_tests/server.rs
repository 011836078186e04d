//! HTTP surface of the application server, exercised over real loopback sockets.

use crate::helpers::{http_client, start_server};

use instance_core::server::{ErrorBody, ServerHandle};
use models::PingResponse;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tempfile::TempDir;

struct TestInstance {
    dir: TempDir,
    handle: ServerHandle,
}

impl TestInstance {
    async fn start() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let handle = start_server(dir.path()).await;
        Self { dir, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.handle.port())
    }

    async fn stop(mut self) {
        self.handle.shutdown();
        self.handle.stopped().await.expect("Clean shutdown");
    }
}

/// **VALUE**: `/ping` answers with the exact identity payload.
///
/// **WHY THIS MATTERS**: Launchers of every version compare this body. Any change in
/// field names or identifier makes new launches start duplicates.
#[tokio::test]
async fn given_running_server_when_ping_requested_then_returns_identity() {
    let instance = TestInstance::start().await;

    let response = http_client()
        .get(instance.url("/ping"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body, json!({"app": "RollCallPy", "status": "ok"}));
    assert!(serde_json::from_value::<PingResponse>(body).is_ok());

    instance.stop().await;
}

#[tokio::test]
async fn given_running_server_when_index_requested_then_returns_html() {
    let instance = TestInstance::start().await;

    let response = http_client()
        .get(instance.url("/"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    assert!(content_type.starts_with("text/html"));
    let body = response.text().await.expect("body");
    assert!(body.contains("/api/students"), "UI should drive the roster API");

    instance.stop().await;
}

/// **VALUE**: Full roster lifecycle through the HTTP API.
///
/// **WHY THIS MATTERS**: This is the whole user-facing feature: add, list, pick,
/// remove. Each step must persist so a restarted instance sees the same roster.
#[tokio::test]
async fn given_empty_roster_when_students_added_and_removed_then_api_reflects_changes() {
    // GIVEN: A fresh instance with no roster file
    let instance = TestInstance::start().await;
    let client = http_client();

    // WHEN: Listing the empty roster
    let students: Vec<String> = client
        .get(instance.url("/api/students"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("json");

    // THEN: It is empty
    assert!(students.is_empty());

    // WHEN: Adding a padded name
    let response = client
        .post(instance.url("/api/students"))
        .json(&json!({"name": "  Ana  "}))
        .send()
        .await
        .expect("add");

    // THEN: The trimmed name is stored and persisted
    assert_eq!(response.status(), StatusCode::OK);
    let students: Vec<String> = response.json().await.expect("json");
    assert_eq!(students, vec!["Ana".to_string()]);
    let on_disk = std::fs::read_to_string(instance.dir.path().join("students.json"))
        .expect("roster file");
    assert_eq!(
        serde_json::from_str::<Vec<String>>(&on_disk).expect("roster json"),
        vec!["Ana".to_string()]
    );

    // WHEN: Picking at random from a single-name roster
    let picked: Value = client
        .get(instance.url("/api/random"))
        .send()
        .await
        .expect("random")
        .json()
        .await
        .expect("json");

    // THEN: That name is picked
    assert_eq!(picked, json!({"name": "Ana"}));

    // WHEN: Removing the student
    let response = client
        .delete(instance.url("/api/students/Ana"))
        .send()
        .await
        .expect("delete");

    // THEN: The roster is empty again
    assert_eq!(response.status(), StatusCode::OK);
    let students: Vec<String> = response.json().await.expect("json");
    assert!(students.is_empty());

    instance.stop().await;
}

/// **VALUE**: Roster rule violations come back as 4xx with an `error` message.
///
/// **BUG THIS CATCHES**: Would catch validation failures surfacing as 500s, or error
/// bodies the UI cannot display.
#[tokio::test]
async fn given_invalid_roster_requests_when_sent_then_returns_client_errors() {
    let instance = TestInstance::start().await;
    let client = http_client();

    // Missing name field
    let response = client
        .post(instance.url("/api/students"))
        .json(&json!({"nombre": "Ana"}))
        .send()
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("error body");
    assert_eq!(body.error, "Invalid request data, missing name field");

    // Blank name
    let response = client
        .post(instance.url("/api/students"))
        .json(&json!({"name": "   "}))
        .send()
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Duplicate name
    client
        .post(instance.url("/api/students"))
        .json(&json!({"name": "Ana"}))
        .send()
        .await
        .expect("add");
    let response = client
        .post(instance.url("/api/students"))
        .json(&json!({"name": "Ana"}))
        .send()
        .await
        .expect("add duplicate");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("error body");
    assert!(body.error.contains("already exists"));

    // Unknown student
    let response = client
        .delete(instance.url("/api/students/Nobody"))
        .send()
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    instance.stop().await;
}

#[tokio::test]
async fn given_empty_roster_when_random_requested_then_returns_bad_request() {
    let instance = TestInstance::start().await;

    let response = http_client()
        .get(instance.url("/api/random"))
        .send()
        .await
        .expect("random");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.expect("error body");
    assert!(!body.error.is_empty());

    instance.stop().await;
}

/// **VALUE**: Audio cues are served from the static directory with their media type.
#[tokio::test]
async fn given_static_file_when_requested_then_served_with_content_type() {
    // GIVEN: An instance with a sound file in its static directory
    let instance = TestInstance::start().await;
    let static_dir = instance.dir.path().join("static");
    std::fs::create_dir_all(&static_dir).expect("static dir");
    std::fs::write(static_dir.join("roll.mp3"), b"ID3fake").expect("write audio");
    let client = http_client();

    // WHEN: Requesting it
    let response = client
        .get(instance.url("/static/roll.mp3"))
        .send()
        .await
        .expect("static");

    // THEN: Bytes and content type match
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("audio/mpeg")
    );
    assert_eq!(response.bytes().await.expect("bytes").as_ref(), b"ID3fake");

    // WHEN: Requesting a missing file
    let response = client
        .get(instance.url("/static/missing.mp3"))
        .send()
        .await
        .expect("static");

    // THEN: 404 with the JSON error body
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = response.json().await.expect("error body");
    assert_eq!(body.error, "Resource not found");

    // WHEN: Trying to climb out of the static directory
    std::fs::write(instance.dir.path().join("secret.txt"), b"secret").expect("write secret");
    let response = client
        .get(instance.url("/static/..%2Fsecret.txt"))
        .send()
        .await
        .expect("static");

    // THEN: Nothing outside the directory is served
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    instance.stop().await;
}

/// **VALUE**: Audio cues honour byte-range requests.
///
/// **WHY THIS MATTERS**: Browsers fetch `<audio>` sources with `Range` headers and
/// rely on `206 Partial Content` to seek and replay the roll and select sounds.
///
/// **BUG THIS CATCHES**: Would catch static files being served whole with a 200,
/// which breaks replaying a cue in some browsers.
#[tokio::test]
async fn given_audio_file_when_range_requested_then_returns_partial_content() {
    // GIVEN: A 100-byte sound file
    let instance = TestInstance::start().await;
    let static_dir = instance.dir.path().join("static");
    std::fs::create_dir_all(&static_dir).expect("static dir");
    let audio: Vec<u8> = (0..100u8).collect();
    std::fs::write(static_dir.join("roll.mp3"), &audio).expect("write audio");

    // WHEN: Requesting its first ten bytes
    let response = http_client()
        .get(instance.url("/static/roll.mp3"))
        .header(reqwest::header::RANGE, "bytes=0-9")
        .send()
        .await
        .expect("range request");

    // THEN: Only that slice comes back, marked as partial
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok()),
        Some("bytes 0-9/100")
    );
    assert_eq!(response.bytes().await.expect("bytes").as_ref(), &audio[..10]);

    instance.stop().await;
}

#[tokio::test]
async fn given_unknown_path_when_requested_then_returns_json_not_found() {
    let instance = TestInstance::start().await;

    let response = http_client()
        .get(instance.url("/definitely/not/here"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = response.json().await.expect("error body");
    assert_eq!(body.error, "Resource not found");

    instance.stop().await;
}

/// **VALUE**: Shutdown through the handle stops the listener and frees the port.
///
/// **WHY THIS MATTERS**: After shutdown the port must be reusable by the next launch.
#[tokio::test]
async fn given_running_server_when_shut_down_then_port_stops_answering() {
    let instance = TestInstance::start().await;
    let port = instance.handle.port();

    instance.stop().await;

    let result = http_client()
        .get(format!("http://127.0.0.1:{port}/ping"))
        .send()
        .await;
    assert!(result.is_err(), "Port should no longer accept requests");
}
