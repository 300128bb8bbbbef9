use axum::{
    Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{Next, from_fn},
    response::{Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tire_flow::{FlowError, FlowRunner, InMemorySessionStorage, Session, SessionStorage, tire_wear_dialog};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::models::{ExecuteRequest, ExecuteResponse};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn flow_error(err: FlowError, session_id: &str) -> ApiError {
    match err {
        FlowError::SessionNotFound(_) => not_found_error("Session not found", session_id),
        other => {
            error!(session_id = %session_id, error = %other, "Failed to handle message");
            internal_error("Failed to handle message", &other.to_string())
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_storage: Arc<dyn SessionStorage>,
    pub flow_runner: FlowRunner,
}

impl AppState {
    pub fn new(session_storage: Arc<dyn SessionStorage>) -> Self {
        let flow_runner = FlowRunner::new(Arc::new(tire_wear_dialog()), session_storage.clone());
        Self {
            session_storage,
            flow_runner,
        }
    }
}

/// Application with in-memory sessions; conversations do not survive a restart
pub fn create_app() -> Router {
    build_router(AppState::new(Arc::new(InMemorySessionStorage::new())))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/execute", post(execute))
        .route("/session/{id}", get(get_session))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tag every request with a correlation id and run it inside a span carrying it
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert("x-correlation-id", value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Tire Wear Analysis Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Step-by-step tire measurement dialog with a heuristic wear report",
        "commands": ["/start", "/cancel"],
        "endpoints": {
            "POST /execute": "Send one message to a conversation (omit session_id to open one)",
            "GET /session/{id}": "Get conversation state and collected answers",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> ApiResult<ExecuteResponse> {
    info!(
        session_id = ?request.session_id,
        content_length = %request.content.len(),
        "Processing execute request"
    );

    let session_id = match request.session_id {
        Some(session_id) => {
            if Uuid::parse_str(&session_id).is_err() {
                error!(session_id = %session_id, "Invalid session ID format");
                return Err(bad_request_error("Invalid session ID format"));
            }
            session_id
        }
        None => {
            let session_id = Uuid::new_v4().to_string();
            state
                .flow_runner
                .open(&session_id)
                .await
                .map_err(|e| flow_error(e, &session_id))?;
            session_id
        }
    };

    let transition = state
        .flow_runner
        .run(&session_id, &request.content)
        .await
        .map_err(|e| flow_error(e, &session_id))?;

    Ok(Json(ExecuteResponse::from_transition(session_id, transition)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Session> {
    info!(session_id = %session_id, "Getting session");

    match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => Err(not_found_error("Session not found", &session_id)),
        Err(e) => Err(flow_error(e, &session_id)),
    }
}
