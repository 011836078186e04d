use crate::error::roster::RosterError;
use crate::server::ServerState;

use models::{HANDSHAKE_PATH, PingResponse};

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::handler::HandlerWithoutStateExt;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Registered routes, logged by the launcher's start-up check.
pub const ROUTES: &[&str] = &[
    "/ (GET)",
    "/ping (GET)",
    "/api/students (GET, POST)",
    "/api/students/:name (DELETE)",
    "/api/random (GET)",
    "/static/* (GET, HEAD, Range)",
];

type SharedState = Arc<ServerState>;

pub(crate) fn build_router(state: SharedState) -> Router {
    let static_files = ServeDir::new(&state.static_dir)
        .append_index_html_on_directories(false)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/", get(index))
        .route(HANDSHAKE_PATH, get(ping))
        .route("/api/students", get(list_students).post(add_student))
        .route("/api/students/:name", delete(delete_student))
        .route("/api/random", get(random_student))
        .nest_service("/static", static_files)
        .fallback(not_found)
        .with_state(state)
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    fn response(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorBody {
                error: message.into(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct AddStudentRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct PickedStudent {
    name: String,
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RosterError::Validation { .. }
            | RosterError::Duplicate { .. }
            | RosterError::Capacity { .. }
            | RosterError::Empty { .. } => StatusCode::BAD_REQUEST,
            RosterError::NotFound { .. } => StatusCode::NOT_FOUND,
            RosterError::Persist { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{self}");
        } else {
            debug!("{self}");
        }

        ErrorBody::response(status, self.message())
    }
}

async fn index() -> Html<&'static str> {
    info!("Serving index page");
    Html(INDEX_HTML)
}

// No state extractor: must answer even while roster requests are queued.
async fn ping() -> Json<PingResponse> {
    Json(PingResponse::ok())
}

async fn list_students(State(state): State<SharedState>) -> Json<Vec<String>> {
    let students = state.roster.load().await;
    info!("Listing {} students", students.len());
    Json(students)
}

async fn add_student(
    State(state): State<SharedState>,
    payload: Result<Json<AddStudentRequest>, JsonRejection>,
) -> Result<Json<Vec<String>>, Response> {
    let Json(request) = payload.map_err(|e| {
        debug!("Rejected add-student body: {e}");
        ErrorBody::response(
            StatusCode::BAD_REQUEST,
            "Invalid request data, missing name field",
        )
    })?;

    state
        .roster
        .add(&request.name)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

async fn delete_student(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, RosterError> {
    state.roster.remove(&name).await.map(Json)
}

async fn random_student(
    State(state): State<SharedState>,
) -> Result<Json<PickedStudent>, RosterError> {
    let name = state.roster.pick_random().await?;
    Ok(Json(PickedStudent { name }))
}

async fn not_found(uri: Uri) -> Response {
    warn!("404: {}", uri.path());
    ErrorBody::response(StatusCode::NOT_FOUND, "Resource not found")
}
