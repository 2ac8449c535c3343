use std::collections::HashSet;

use uuid::Uuid;

use super::{MatchRecord, Player, University};

/// A full, point-in-time copy of every raw entity.
///
/// Aggregation always works on a whole snapshot, never on individual
/// change notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub universities: Vec<University>,
    pub matches: Vec<MatchRecord>,
    pub players: Vec<Player>,
}

impl Snapshot {
    pub fn competing(&self) -> impl Iterator<Item = &University> {
        self.universities.iter().filter(|u| u.is_competing())
    }

    pub fn competing_ids(&self) -> HashSet<Uuid> {
        self.competing().map(|u| u.id).collect()
    }

    /// Matches whose both participants are competing universities.
    pub fn eligible_matches<'a>(
        &'a self,
        competing: &'a HashSet<Uuid>,
    ) -> impl Iterator<Item = &'a MatchRecord> + 'a {
        self.matches
            .iter()
            .filter(|m| competing.contains(&m.team_a) && competing.contains(&m.team_b))
    }
}
