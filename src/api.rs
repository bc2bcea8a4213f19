use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tower_http::cors::CorsLayer;

use crate::timeline::{DashboardSnapshot, SnapshotPresenter};

#[derive(Clone)]
pub struct AppState {
    pub presenter: SnapshotPresenter,
    pub refresh: mpsc::Sender<()>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/dashboard", get(dashboard))
        .route("/api/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.presenter.snapshot())
}

#[derive(serde::Serialize)]
struct RefreshResp {
    accepted: bool,
}

/// Explicit poll trigger. A trigger that arrives while a fetch is in flight
/// is dropped by the scheduler; a full queue is dropped here.
async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshResp>) {
    match state.refresh.try_send(()) {
        Ok(()) => (StatusCode::ACCEPTED, Json(RefreshResp { accepted: true })),
        Err(TrySendError::Full(())) => {
            tracing::debug!(target: "feed", "refresh queue full; trigger dropped");
            (StatusCode::ACCEPTED, Json(RefreshResp { accepted: false }))
        }
        Err(TrySendError::Closed(())) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(RefreshResp { accepted: false }),
        ),
    }
}
