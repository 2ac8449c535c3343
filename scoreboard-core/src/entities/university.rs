use scoreboard_sdk::objects::{UniversityUpsert, Zone};
use smallvec::SmallVec;
use time::OffsetDateTime;
use uuid::Uuid;

use super::CompetingStatus;

/// A registered university.
///
/// Record counters and `points` are owned by the admin-mutation paths; the
/// engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct University {
    pub id: Uuid,
    pub name: String,
    pub zone: Zone,
    pub sports: SmallVec<[String; 4]>,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: i64,
    pub status: CompetingStatus,
    pub last_updated: OffsetDateTime,
}

impl University {
    pub fn is_competing(&self) -> bool {
        self.status.is_competing()
    }

    pub fn from_upsert(id: Uuid, upsert: UniversityUpsert, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: upsert.name,
            zone: upsert.zone,
            sports: upsert.sports.into_iter().collect(),
            wins: upsert.wins,
            losses: upsert.losses,
            draws: upsert.draws,
            points: upsert.points,
            status: upsert.status.into(),
            last_updated: now,
        }
    }
}
