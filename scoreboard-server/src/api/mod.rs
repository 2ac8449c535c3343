//! HTTP API.
//!
//! # Endpoints
//!
//! Public (`/api/v1`):
//! - `GET /stats`, `GET /leaderboard` – latest published artifacts
//! - `GET /matches`, `GET /matches/{id}` – raw match state
//! - `GET /ws` – live feed
//!
//! Admin (`/api/v1/admin`): match mutations, university and player upserts,
//! manual recompute.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use scoreboard_core::live::MatchError;
use scoreboard_core::processors::RecomputeFailure;
use scoreboard_core::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;

mod admin;
mod public;
mod ws;

/// Build the `/api/v1` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .route("/ws", get(ws::live_ws))
        .nest("/admin", admin::router())
}

/// Errors that can occur in API handlers.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Recompute(#[from] RecomputeFailure),

    #[error("match not found: {0}")]
    MatchNotFound(Uuid),

    #[error("unknown university: {0}")]
    UnknownUniversity(Uuid),

    /// No pass has completed yet.
    #[error("standings are not computed yet")]
    NotReady,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Match(e) => match e {
                MatchError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                MatchError::NotFound(_) => StatusCode::NOT_FOUND,
                MatchError::InvalidState { .. }
                | MatchError::InvalidTransition { .. }
                | MatchError::Conflict(_) => StatusCode::CONFLICT,
                MatchError::Store(e) => store_status(e),
            },
            ApiError::Store(e) => store_status(e),
            ApiError::Recompute(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownUniversity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Database(_) | StoreError::Corrupt { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        // Internal details stay in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "API request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
