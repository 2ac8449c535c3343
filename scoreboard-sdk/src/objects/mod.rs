pub mod admin;
pub mod matches;
pub mod standings;
pub mod ws;
pub mod zone;

pub use admin::{CreateMatchRequest, PlayerUpsert, TransitionRequest, UniversityUpsert, UpdateScoreRequest};
pub use matches::{CompetingStatus, MatchStatus, MatchView, PlayerStatus};
pub use standings::{CalculatedBy, Leaderboard, LeaderboardEntry, RecomputeResponse, StatsSummary};
pub use ws::{WsCloseCode, WsServerMessage};
pub use zone::{UnknownZone, Zone};
