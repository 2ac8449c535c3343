//! Per-subscriber sync state.
//!
//! Every subscriber owns one [`MatchTracker`] and one [`FreshnessGuard`].
//! Neither is shared: two subscribers observing the same change derive the
//! same notification independently, each from its own previous snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::objects::{MatchStatus, MatchView};

/// A viewer-facing event derived by diffing two views of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchNotification {
    MatchStart {
        match_id: Uuid,
        team_a: Uuid,
        team_b: Uuid,
        sport: String,
    },
    ScoreUpdate {
        match_id: Uuid,
        score_a: u32,
        score_b: u32,
    },
    MatchEnd {
        match_id: Uuid,
        final_score_a: u32,
        final_score_b: u32,
    },
}

/// Derive the notification for a transition from `previous` to `next`.
///
/// - entering `live` from anything else (or from no state) starts a match;
/// - a score change while `live` on both sides is a score update;
/// - `live` to `completed` ends the match with the final score.
pub fn diff(previous: Option<&MatchView>, next: &MatchView) -> Option<MatchNotification> {
    let previous_status = previous.map(|p| p.status);
    match (previous_status, next.status) {
        (Some(MatchStatus::Live), MatchStatus::Live) => {
            let previous = previous?;
            if previous.score() != next.score() {
                Some(MatchNotification::ScoreUpdate {
                    match_id: next.id,
                    score_a: next.score_a,
                    score_b: next.score_b,
                })
            } else {
                None
            }
        }
        (_, MatchStatus::Live) => Some(MatchNotification::MatchStart {
            match_id: next.id,
            team_a: next.team_a,
            team_b: next.team_b,
            sport: next.sport.clone(),
        }),
        (Some(MatchStatus::Live), MatchStatus::Completed) => Some(MatchNotification::MatchEnd {
            match_id: next.id,
            final_score_a: next.score_a,
            final_score_b: next.score_b,
        }),
        _ => None,
    }
}

/// Last-seen view of every match, keyed by match id.
#[derive(Debug, Default)]
pub struct MatchTracker {
    seen: HashMap<Uuid, MatchView>,
}

impl MatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole state without emitting anything.
    ///
    /// Used for the initial snapshot and after a resync, where the viewer has
    /// no basis for "what changed".
    pub fn prime(&mut self, matches: impl IntoIterator<Item = MatchView>) {
        self.seen = matches.into_iter().map(|m| (m.id, m)).collect();
    }

    /// Record `next` and return the notification it implies, if any.
    ///
    /// A view whose revision is not newer than the one already held is a
    /// duplicate or out-of-order delivery; it is ignored and the held state is
    /// kept.
    pub fn observe(&mut self, next: MatchView) -> Option<MatchNotification> {
        let previous = self.seen.get(&next.id);
        if let Some(previous) = previous {
            if next.revision <= previous.revision {
                return None;
            }
        }
        let notification = diff(previous, &next);
        self.seen.insert(next.id, next);
        notification
    }

    pub fn get(&self, id: &Uuid) -> Option<&MatchView> {
        self.seen.get(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Rejects derived artifacts older than the newest one already accepted.
///
/// Equal timestamps are accepted: artifact times are non-decreasing, not
/// strictly increasing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreshnessGuard {
    latest: Option<OffsetDateTime>,
}

impl FreshnessGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and remembers `calculated_at` if it is not stale.
    pub fn accept(&mut self, calculated_at: OffsetDateTime) -> bool {
        match self.latest {
            Some(latest) if calculated_at < latest => false,
            _ => {
                self.latest = Some(calculated_at);
                true
            }
        }
    }
}
