//! # Room Web Server
//!
//! Axum router exposing the room to browsers.
//!
//! | Path | Description |
//! |------|-------------|
//! | `/ws` | WebSocket for the room protocol (session required) |
//! | `/api/recordings` | JSON list of archived recordings |
//! | `/api/status` | Who is online and whether someone is recording |
//! | `/audios/<name>` | Download an archived recording |
//! | `/session` | Identity behind the caller's session |
//! | `/healthz` | Liveness probe |

pub mod socket;

use crate::archive::RecordingEntry;
use crate::recorder::{RoomCoordinator, RoomSnapshot};
use crate::room::Identity;
use crate::session::{Handshake, SessionDirectory};
use crate::utils::{AppError, ErrorResponse};
use axum::{
    extract::{RawQuery, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state passed to all request handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: RoomCoordinator,
    pub sessions: Arc<dyn SessionDirectory>,
}

impl AppState {
    pub fn new(coordinator: RoomCoordinator, sessions: Arc<dyn SessionDirectory>) -> Self {
        Self {
            coordinator,
            sessions,
        }
    }

    async fn identify(&self, headers: &HeaderMap, query: Option<&str>) -> Option<Identity> {
        let handshake = Handshake::from_request(headers, query);
        self.sessions.resolve_identity(&handshake).await
    }
}

/// Body of `/session`
#[derive(Debug, Serialize)]
struct SessionInfo {
    username: Identity,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Build the router serving archived audio from `audio_dir`
pub fn router(state: AppState, audio_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(handle_websocket))
        .route("/api/recordings", get(handle_list_recordings))
        .route("/api/status", get(handle_status))
        .route("/session", get(handle_session))
        .route("/healthz", get(|| async { "ok" }))
        .nest_service("/audios", ServeDir::new(audio_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handles WebSocket upgrade requests to `/ws`.
///
/// The identity is resolved before upgrading; unauthenticated requests get
/// `401` and never touch room state.
async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(identity) = state.identify(&headers, query.as_deref()).await else {
        tracing::info!("User not authenticated, refusing connection");
        return AppError::Unauthenticated.into_response();
    };

    let coordinator = state.coordinator.clone();
    ws.on_upgrade(move |upgraded| socket::run_connection(upgraded, coordinator, identity))
}

async fn handle_list_recordings(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordingEntry>>, AppError> {
    let recordings = state.coordinator.list_recordings().await.map_err(|e| {
        tracing::error!("Error reading audio directory: {}", e);
        e
    })?;
    Ok(Json(recordings))
}

async fn handle_status(State(state): State<AppState>) -> Json<RoomSnapshot> {
    Json(state.coordinator.snapshot())
}

async fn handle_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<SessionInfo>, AppError> {
    let username = state
        .identify(&headers, query.as_deref())
        .await
        .ok_or(AppError::Unauthenticated)?;
    Ok(Json(SessionInfo { username }))
}
