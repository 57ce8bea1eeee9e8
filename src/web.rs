use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router};
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use crate::app::AppState;
use crate::error::AppError;
use crate::model::ParkingEvent;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", axum::routing::get(root))
        .route("/log", axum::routing::post(log_event))
        .route("/health/live", axum::routing::get(health_live))
        .route("/health/ready", axum::routing::get(health_ready))
        .with_state(state)
}

#[derive(Serialize)]
struct SavedBody {
    message: &'static str,
}

async fn root() -> &'static str {
    "Parking log server running"
}

async fn log_event(
    State(state): State<AppState>,
    Json(event): Json<ParkingEvent>,
) -> Result<Json<SavedBody>, AppError> {
    event.validate().map_err(AppError::Validation)?;
    if let Err(err) = state.repo.insert_event(&event).await {
        error!(slot = event.slot, "failed to insert parking event: {}", err);
        return Err(err);
    }
    Ok(Json(SavedBody { message: "Saved" }))
}

async fn health_live() -> StatusCode {
    StatusCode::OK
}

async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.repo.ping()).await {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_returns_stable_confirmation_text() {
        assert_eq!(root().await, "Parking log server running");
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(health_live().await, StatusCode::OK);
    }

    #[test]
    fn saved_body_matches_wire_format() {
        let body = serde_json::to_string(&SavedBody { message: "Saved" }).expect("serialize");
        assert_eq!(body, r#"{"message":"Saved"}"#);
    }
}
