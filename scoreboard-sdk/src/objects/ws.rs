//! WebSocket message types for the live feed.
//!
//! The `GET /api/v1/ws` endpoint upgrades to a WebSocket connection and
//! pushes [`WsServerMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. The server sends a [`WsServerMessage::Snapshot`] with every match and
//!    the current standings immediately after the upgrade.
//! 2. [`WsServerMessage::MatchUpdate`] frames follow every accepted match
//!    mutation. When the change is noteworthy for viewers, a
//!    [`WsServerMessage::Notification`] frame is sent right after it.
//! 3. [`WsServerMessage::Standings`] frames carry each new publication of
//!    the stats and leaderboard. Frames whose `lastCalculated` is older than
//!    one already delivered are never sent, but clients should apply the
//!    same rule across reconnects (see [`crate::sync::FreshnessGuard`]).
//! 4. If the subscriber falls too far behind, the server sends a fresh
//!    [`WsServerMessage::Snapshot`] instead of the missed frames.

use serde::{Deserialize, Serialize};

use super::matches::MatchView;
use super::standings::{Leaderboard, StatsSummary};
use crate::sync::MatchNotification;

/// Server-to-client WebSocket message.
///
/// Serialized as an internally-tagged JSON object:
///
/// ```json
/// {"type":"match_update","match":{ ... }}
/// {"type":"notification","notification":{"type":"match_start", ... }}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// Full state, sent first and after a resync.
    Snapshot {
        matches: Vec<MatchView>,
        stats: Option<StatsSummary>,
        leaderboard: Option<Leaderboard>,
    },

    /// A single match changed.
    MatchUpdate {
        #[serde(rename = "match")]
        match_view: MatchView,
    },

    /// A notification derived from the preceding match update.
    Notification { notification: MatchNotification },

    /// A new publication of the derived artifacts.
    Standings {
        stats: StatsSummary,
        leaderboard: Leaderboard,
    },

    /// A server-side error. The server may send a close frame afterwards.
    Error { code: u16, reason: String },
}

/// Well-known WebSocket close codes used by the live feed.
pub struct WsCloseCode;

impl WsCloseCode {
    /// The feed ended normally.
    pub const NORMAL: u16 = 1000;

    /// The server is shutting down.
    pub const GOING_AWAY: u16 = 1001;

    pub const INTERNAL_ERROR: u16 = 1011;
}
