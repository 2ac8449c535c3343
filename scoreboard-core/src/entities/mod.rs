pub mod match_record;
pub mod player;
pub mod snapshot;
pub mod university;

pub use match_record::MatchRecord;
pub use player::Player;
pub use snapshot::Snapshot;
pub use university::University;

use scoreboard_sdk::objects::{
    CompetingStatus as SdkCompetingStatus, MatchStatus as SdkMatchStatus,
    PlayerStatus as SdkPlayerStatus,
};
use uuid::Uuid;

/// Match status for storage and the state machine.
///
/// This is the sqlx::Type version. For API/DTO use, see `scoreboard_sdk::objects::MatchStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "match_status")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Paused,
    Completed,
}

impl From<MatchStatus> for SdkMatchStatus {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Scheduled => SdkMatchStatus::Scheduled,
            MatchStatus::Live => SdkMatchStatus::Live,
            MatchStatus::Paused => SdkMatchStatus::Paused,
            MatchStatus::Completed => SdkMatchStatus::Completed,
        }
    }
}

impl From<SdkMatchStatus> for MatchStatus {
    fn from(value: SdkMatchStatus) -> Self {
        match value {
            SdkMatchStatus::Scheduled => MatchStatus::Scheduled,
            SdkMatchStatus::Live => MatchStatus::Live,
            SdkMatchStatus::Paused => MatchStatus::Paused,
            SdkMatchStatus::Completed => MatchStatus::Completed,
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        SdkMatchStatus::from(*self).fmt(f)
    }
}

/// Participation status of a university.
///
/// `is_competing` is the only place that decides leaderboard and stats
/// eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "competing_status")]
pub enum CompetingStatus {
    Competing,
    Affiliated,
    NotCompeting,
}

impl CompetingStatus {
    pub fn is_competing(self) -> bool {
        matches!(self, CompetingStatus::Competing)
    }
}

impl From<CompetingStatus> for SdkCompetingStatus {
    fn from(value: CompetingStatus) -> Self {
        match value {
            CompetingStatus::Competing => SdkCompetingStatus::Competing,
            CompetingStatus::Affiliated => SdkCompetingStatus::Affiliated,
            CompetingStatus::NotCompeting => SdkCompetingStatus::NotCompeting,
        }
    }
}

impl From<SdkCompetingStatus> for CompetingStatus {
    fn from(value: SdkCompetingStatus) -> Self {
        match value {
            SdkCompetingStatus::Competing => CompetingStatus::Competing,
            SdkCompetingStatus::Affiliated => CompetingStatus::Affiliated,
            SdkCompetingStatus::NotCompeting => CompetingStatus::NotCompeting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "player_status")]
pub enum PlayerStatus {
    Active,
    Inactive,
}

impl From<PlayerStatus> for SdkPlayerStatus {
    fn from(value: PlayerStatus) -> Self {
        match value {
            PlayerStatus::Active => SdkPlayerStatus::Active,
            PlayerStatus::Inactive => SdkPlayerStatus::Inactive,
        }
    }
}

impl From<SdkPlayerStatus> for PlayerStatus {
    fn from(value: SdkPlayerStatus) -> Self {
        match value {
            SdkPlayerStatus::Active => PlayerStatus::Active,
            SdkPlayerStatus::Inactive => PlayerStatus::Inactive,
        }
    }
}

/// Address of a single raw entity, as carried by change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPath {
    University(Uuid),
    Match(Uuid),
    Player(Uuid),
}

impl EntityPath {
    /// Parse the `kind:uuid` form used by the database notification channel.
    pub fn parse(s: &str) -> Option<Self> {
        let (kind, id) = s.split_once(':')?;
        let id = Uuid::parse_str(id).ok()?;
        match kind {
            "university" => Some(EntityPath::University(id)),
            "match" => Some(EntityPath::Match(id)),
            "player" => Some(EntityPath::Player(id)),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityPath::University(id) => write!(f, "university:{id}"),
            EntityPath::Match(id) => write!(f, "match:{id}"),
            EntityPath::Player(id) => write!(f, "player:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_competing_is_competing() {
        assert!(CompetingStatus::Competing.is_competing());
        assert!(!CompetingStatus::Affiliated.is_competing());
        assert!(!CompetingStatus::NotCompeting.is_competing());
    }

    #[test]
    fn test_entity_path_round_trips_through_notify_payload() {
        let path = EntityPath::Match(Uuid::from_u128(42));
        assert_eq!(EntityPath::parse(&path.to_string()), Some(path));
        assert_eq!(EntityPath::parse("team:not-a-uuid"), None);
        assert_eq!(EntityPath::parse("garbage"), None);
    }
}
