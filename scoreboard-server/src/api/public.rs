//! Read API for viewers.
//!
//! Standings are served from the latest publication and never computed on
//! request.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use scoreboard_core::store::EntityStore;
use scoreboard_sdk::objects::{Leaderboard, MatchView, StatsSummary};
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/leaderboard", get(leaderboard))
        .route("/matches", get(list_matches))
        .route("/matches/{id}", get(get_match))
}

/// `GET /stats`
async fn stats(State(state): State<AppState>) -> Result<Json<StatsSummary>, ApiError> {
    let published = state.published.current().ok_or(ApiError::NotReady)?;
    Ok(Json(published.stats.clone()))
}

/// `GET /leaderboard`
async fn leaderboard(State(state): State<AppState>) -> Result<Json<Leaderboard>, ApiError> {
    let published = state.published.current().ok_or(ApiError::NotReady)?;
    Ok(Json(published.leaderboard.clone()))
}

/// `GET /matches`: every match, unstarted ones last.
async fn list_matches(State(state): State<AppState>) -> Result<Json<Vec<MatchView>>, ApiError> {
    let matches = state.store.list_matches().await?;
    Ok(Json(matches.iter().map(MatchView::from).collect()))
}

/// `GET /matches/{id}`
async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchView>, ApiError> {
    let record = state
        .store
        .get_match(id)
        .await?
        .ok_or(ApiError::MatchNotFound(id))?;
    Ok(Json(MatchView::from(&record)))
}
