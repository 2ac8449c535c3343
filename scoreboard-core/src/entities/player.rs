use scoreboard_sdk::objects::PlayerUpsert;
use smallvec::SmallVec;
use time::OffsetDateTime;
use uuid::Uuid;

use super::PlayerStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub university_id: Uuid,
    pub status: PlayerStatus,
    pub sports: SmallVec<[String; 4]>,
    pub last_updated: OffsetDateTime,
}

impl Player {
    pub fn from_upsert(id: Uuid, upsert: PlayerUpsert, now: OffsetDateTime) -> Self {
        Self {
            id,
            university_id: upsert.university_id,
            status: upsert.status.into(),
            sports: upsert.sports.into_iter().collect(),
            last_updated: now,
        }
    }
}
