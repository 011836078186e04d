use crate::{APP_IDENTIFIER, PingResponse};

/// **VALUE**: The served payload has exactly the wire shape clients expect.
///
/// **WHY THIS MATTERS**: Older launchers and the server must agree on
/// `{"app": "RollCallPy", "status": "ok"}` or every launch would start a duplicate.
#[test]
fn given_ok_payload_when_serialized_then_matches_wire_format() {
    let json = serde_json::to_value(PingResponse::ok()).expect("serializable");

    assert_eq!(
        json,
        serde_json::json!({"app": "RollCallPy", "status": "ok"})
    );
}

/// **VALUE**: Identifier comparison is exact.
///
/// **BUG THIS CATCHES**: Would catch a relaxed comparison (prefix, case-insensitive)
/// that lets an unrelated service be mistaken for a running instance.
#[test]
fn given_foreign_identifiers_when_checked_then_not_from_this_application() {
    for app in ["rollcallpy", "RollCallPy2", "", "OtherApp"] {
        let payload = PingResponse {
            app: app.to_string(),
            status: "ok".to_string(),
        };
        assert!(
            !payload.is_from_this_application(),
            "'{app}' must not match {APP_IDENTIFIER}"
        );
    }

    assert!(PingResponse::ok().is_from_this_application());
}
