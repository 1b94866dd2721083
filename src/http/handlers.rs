use super::state::AppState;
use crate::error::RecorderError;
use crate::session::{SessionId, SessionStats};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StartRecordingResponse {
    pub id: SessionId,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRecordingRequest {
    /// Output file, relative to the recordings directory
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRecordingResponse {
    pub id: SessionId,
    pub path: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: SessionId,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelResponse {
    pub level: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DurationResponse {
    pub id: SessionId,
    pub duration_ms: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: RecorderError) -> Response {
    let status = match &err {
        RecorderError::NotFound(_) => StatusCode::NOT_FOUND,
        RecorderError::DeviceOpen(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecorderError::Io { .. } | RecorderError::CaptureTaskFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status != StatusCode::NOT_FOUND {
        error!("{}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recordings
/// Start a new recording session
pub async fn start_recording(State(state): State<AppState>) -> Response {
    match state.registry.start().await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(StartRecordingResponse {
                id,
                status: "recording".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/:id/stop
/// Stop capturing; waits for the capture task to exit
pub async fn stop_recording(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    match state.registry.stop(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                id,
                status: "stopped".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /recordings/:id/save
/// Write the captured audio to a WAV file and remove the session
pub async fn save_recording(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(req): Json<SaveRecordingRequest>,
) -> Response {
    let Some(path) = state.output_path(&req.path) else {
        warn!("Rejected save path {:?} for recording {}", req.path, id);
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("save path must stay inside the recordings directory: {}", req.path),
            }),
        )
            .into_response();
    };
    info!("Save requested for recording {} -> {}", id, path.display());

    match state.registry.save(id, &path).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SaveRecordingResponse {
                id,
                path: path.display().to_string(),
                status: "saved".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /recordings/:id
/// Stop and drop a session without saving
pub async fn discard_recording(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Response {
    match state.registry.discard(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                id,
                status: "discarded".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /recordings
pub async fn list_recordings(State(state): State<AppState>) -> Json<Vec<SessionStats>> {
    Json(state.registry.list().await)
}

/// GET /recordings/:id
pub async fn get_recording(State(state): State<AppState>, Path(id): Path<SessionId>) -> Response {
    match state.registry.stats(id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /recordings/:id/level
pub async fn get_recording_level(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Response {
    match state.registry.session_level(id).await {
        Ok(level) => (StatusCode::OK, Json(LevelResponse { level })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /recordings/:id/duration
pub async fn get_recording_duration(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Response {
    match state.registry.duration_ms(id).await {
        Ok(duration_ms) => (StatusCode::OK, Json(DurationResponse { id, duration_ms })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /level
/// Level of one running session (0.0 when nothing is recording)
pub async fn get_current_level(State(state): State<AppState>) -> Json<LevelResponse> {
    Json(LevelResponse {
        level: state.registry.current_level().await,
    })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
