//! Admin API request bodies.
//!
//! These are sent by the admin-mutation collaborator (the tournament
//! organiser's backoffice) to the admin endpoints of the server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::matches::{CompetingStatus, MatchStatus, PlayerStatus};
use super::zone::Zone;

/// Body of `POST /api/v1/admin/matches`.
///
/// `zone` is kept as a raw string so that an unknown zone surfaces as a
/// validation error from the state machine rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub team_a: Uuid,
    pub team_b: Uuid,
    pub sport: String,
    pub zone: String,
}

/// Body of `POST /api/v1/admin/matches/{id}/score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreRequest {
    pub score_a: u32,
    pub score_b: u32,
}

/// Body of `POST /api/v1/admin/matches/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: MatchStatus,
}

/// Body of `PUT /api/v1/admin/universities/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityUpsert {
    pub name: String,
    pub zone: Zone,
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub points: i64,
    pub status: CompetingStatus,
}

/// Body of `PUT /api/v1/admin/players/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpsert {
    pub university_id: Uuid,
    pub status: PlayerStatus,
    #[serde(default)]
    pub sports: Vec<String>,
}
