use scoreboard_sdk::objects::{MatchView, Zone};
use time::OffsetDateTime;
use uuid::Uuid;

use super::MatchStatus;

/// A match between two universities.
///
/// Only [`crate::live::LiveMatchService`] mutates matches. `revision` starts at
/// 1 and increases by one with every accepted mutation; stores use it for
/// compare-and-swap writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub id: Uuid,
    pub team_a: Uuid,
    pub team_b: Uuid,
    pub score_a: u32,
    pub score_b: u32,
    pub sport: String,
    pub zone: Zone,
    pub status: MatchStatus,
    pub start_time: Option<OffsetDateTime>,
    pub end_time: Option<OffsetDateTime>,
    pub last_updated: OffsetDateTime,
    pub revision: u64,
}

impl From<&MatchRecord> for MatchView {
    fn from(record: &MatchRecord) -> Self {
        MatchView {
            id: record.id,
            team_a: record.team_a,
            team_b: record.team_b,
            score_a: record.score_a,
            score_b: record.score_b,
            sport: record.sport.clone(),
            zone: record.zone,
            status: record.status.into(),
            start_time: record.start_time,
            end_time: record.end_time,
            last_updated: record.last_updated,
            revision: record.revision,
        }
    }
}
