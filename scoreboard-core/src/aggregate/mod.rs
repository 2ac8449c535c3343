//! Derived artifacts computed from a full entity snapshot.
//!
//! Everything here is a pure function of its inputs: the same snapshot always
//! yields the same figures, so a pass can be repeated any number of times.

mod leaderboard;
mod stats;

pub use leaderboard::rank;
pub use stats::compute_stats;

#[cfg(test)]
pub(crate) mod fixtures {
    use scoreboard_sdk::objects::Zone;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::entities::{
        CompetingStatus, MatchRecord, MatchStatus, Player, PlayerStatus, University,
    };

    pub fn university(id: u128, name: &str, points: i64, status: CompetingStatus) -> University {
        University {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            zone: Zone::North,
            sports: Default::default(),
            wins: 0,
            losses: 0,
            draws: 0,
            points,
            status,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }

    pub fn match_between(id: u128, a: u128, b: u128, status: MatchStatus) -> MatchRecord {
        MatchRecord {
            id: Uuid::from_u128(id),
            team_a: Uuid::from_u128(a),
            team_b: Uuid::from_u128(b),
            score_a: 0,
            score_b: 0,
            sport: "football".to_string(),
            zone: Zone::North,
            status,
            start_time: None,
            end_time: None,
            last_updated: OffsetDateTime::UNIX_EPOCH,
            revision: 1,
        }
    }

    pub fn player(id: u128, university: u128, status: PlayerStatus) -> Player {
        Player {
            id: Uuid::from_u128(id),
            university_id: Uuid::from_u128(university),
            status,
            sports: Default::default(),
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }
}
