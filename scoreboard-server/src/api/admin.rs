//! Admin API handlers.
//!
//! Called by the tournament organiser's backoffice. Match mutations go
//! through the live match service; university and player records are
//! upserted directly. Handlers return as soon as the store accepted the
//! write; standings catch up through the change listener.
//!
//! # Endpoints
//!
//! - `POST /matches`                 – schedule a match
//! - `POST /matches/{id}/score`      – set both scores
//! - `POST /matches/{id}/status`     – lifecycle transition
//! - `POST /matches/{id}/reopen`     – completed back to paused
//! - `PUT  /universities/{id}`       – create or replace a university
//! - `PUT  /players/{id}`            – create or replace a player
//! - `POST /recompute`               – force a recomputation pass

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};
use scoreboard_core::entities::{Player, University};
use scoreboard_core::store::EntityStore;
use scoreboard_sdk::objects::{
    CreateMatchRequest, MatchView, PlayerUpsert, RecomputeResponse, TransitionRequest,
    UniversityUpsert, UpdateScoreRequest,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/matches", post(create_match))
        .route("/matches/{id}/score", post(update_score))
        .route("/matches/{id}/status", post(transition))
        .route("/matches/{id}/reopen", post(reopen))
        .route("/universities/{id}", put(put_university))
        .route("/players/{id}", put(put_player))
        .route("/recompute", post(recompute))
}

async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .live
        .create_match(request.team_a, request.team_b, &request.sport, &request.zone)
        .await?;
    Ok((StatusCode::CREATED, Json(MatchView::from(&record))))
}

async fn update_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateScoreRequest>,
) -> Result<Json<MatchView>, ApiError> {
    let record = state
        .live
        .update_score(id, request.score_a, request.score_b)
        .await?;
    Ok(Json(MatchView::from(&record)))
}

async fn transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<MatchView>, ApiError> {
    let record = state.live.transition(id, request.status.into()).await?;
    Ok(Json(MatchView::from(&record)))
}

async fn reopen(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchView>, ApiError> {
    let record = state.live.reopen(id).await?;
    tracing::info!(match_id = %id, "Match reopened by admin");
    Ok(Json(MatchView::from(&record)))
}

async fn put_university(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(upsert): Json<UniversityUpsert>,
) -> Result<StatusCode, ApiError> {
    let university = University::from_upsert(id, upsert, OffsetDateTime::now_utc());
    tracing::info!(university_id = %id, status = ?university.status, "Upserting university");
    state.store.put_university(university).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn put_player(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(upsert): Json<PlayerUpsert>,
) -> Result<StatusCode, ApiError> {
    if state.store.get_university(upsert.university_id).await?.is_none() {
        return Err(ApiError::UnknownUniversity(upsert.university_id));
    }
    let player = Player::from_upsert(id, upsert, OffsetDateTime::now_utc());
    state.store.put_player(player).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Runs outside the debounce window and waits for the pass to finish.
async fn recompute(State(state): State<AppState>) -> Result<Json<RecomputeResponse>, ApiError> {
    let report = state.trigger.trigger().await?;
    Ok(Json(report.into()))
}
