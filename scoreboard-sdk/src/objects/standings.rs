//! Derived artifacts: the aggregate statistics and the ranked leaderboard.
//!
//! Both are recomputed from a full entity snapshot and replaced wholesale;
//! clients must never expect partial updates to these objects.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::zone::Zone;

/// Which mechanism produced a published artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculatedBy {
    /// Reactive pass armed by the change listener.
    ScheduledTrigger,
    /// Pass forced through the manual trigger entrypoint.
    ManualTrigger,
}

impl std::fmt::Display for CalculatedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculatedBy::ScheduledTrigger => f.write_str("scheduled-trigger"),
            CalculatedBy::ManualTrigger => f.write_str("manual-trigger"),
        }
    }
}

/// Tournament-wide counters over competing universities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_universities: u32,
    pub competing_universities: u32,
    pub total_points: i64,
    pub total_wins: u64,
    pub total_losses: u64,
    pub total_draws: u64,
    /// Completed matches between two competing universities.
    pub total_matches: u32,
    pub completed_matches: u32,
    pub live_matches: u32,
    pub upcoming_matches: u32,
    pub active_players: u32,
    pub inactive_players: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub last_calculated: OffsetDateTime,
    pub calculated_by: CalculatedBy,
}

impl StatsSummary {
    /// Compare every field except `last_calculated`.
    pub fn same_figures(&self, other: &StatsSummary) -> bool {
        let mut a = self.clone();
        a.last_calculated = other.last_calculated;
        &a == other
    }
}

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub name: String,
    pub zone: Zone,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: i64,
    pub total_matches: u32,
    /// 1-based, contiguous over the whole board.
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    /// True while at least one match between competing universities is live.
    pub is_live: bool,
}

/// Response of the manual recompute endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeResponse {
    /// Publication counter after the pass.
    pub version: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub calculated_at: OffsetDateTime,
    pub calculated_by: CalculatedBy,
}
