use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use streaming::protocol::{PredictRequest, PredictResponse, ResultsResponse};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::grid::tile_grid;
use crate::sessions::{ResultsError, SessionStore};

/// Largest accepted `radius_km`.
pub const MAX_RADIUS_KM: f64 = 50.0;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/predict", post(predict))
        .route("/progress/:session_id", get(progress))
        .route("/results/:session_id", get(results))
        .route("/tiles/:file", get(tile_image))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically drops sessions older than the configured maximum age.
pub fn spawn_cleanup(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(state.config.cleanup_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = state.sessions.cleanup(state.config.session_max_age);
            if removed == 0 {
                info!("session cleanup: nothing to remove");
            } else {
                info!("session cleanup: removed {removed} expired sessions");
            }
        }
    })
}

async fn root() -> Response {
    Json(json!({ "message": "TerraBite API is running" })).into_response()
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn predict(State(state): State<AppState>, Json(req): Json<PredictRequest>) -> Response {
    if !req.latitude.is_finite()
        || !req.longitude.is_finite()
        || req.latitude.abs() > 90.0
        || !(req.radius_km > 0.0 && req.radius_km <= MAX_RADIUS_KM)
    {
        warn!(
            "rejecting predict request ({}, {}) radius {}",
            req.latitude, req.longitude, req.radius_km
        );
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("latitude, longitude and radius_km in (0, {MAX_RADIUS_KM}] are required"),
        );
    }

    let grid = tile_grid(req.latitude, req.longitude, req.radius_km);
    let session_id = state.sessions.create(grid);
    Json(PredictResponse::Session { session_id }).into_response()
}

async fn progress(
    State(state): State<AppState>,
    AxumPath(session_id): AxumPath<String>,
) -> Response {
    match state
        .sessions
        .poll(&session_id, state.config.tiles_per_poll)
    {
        Some(progress) => Json(progress).into_response(),
        None => detail(StatusCode::NOT_FOUND, "session not found"),
    }
}

async fn results(
    State(state): State<AppState>,
    AxumPath(session_id): AxumPath<String>,
) -> Response {
    match state.sessions.results(&session_id) {
        Ok(tiles) => Json(ResultsResponse { tiles }).into_response(),
        Err(ResultsError::UnknownSession) => detail(StatusCode::NOT_FOUND, "session not found"),
        Err(ResultsError::NotReady(p)) => detail(
            StatusCode::CONFLICT,
            &format!("results not ready: {} of {}", p.completed, p.total),
        ),
    }
}

async fn tile_image(
    State(state): State<AppState>,
    AxumPath(file): AxumPath<String>,
) -> Response {
    let Some(stem) = file.strip_suffix(".png") else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };
    if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    serve_file(&state.config.tile_image_root.join(&file), "image/png").await
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            warn!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
