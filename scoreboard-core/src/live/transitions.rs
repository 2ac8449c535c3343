use crate::entities::MatchStatus;

impl MatchStatus {
    /// Edge table of the match lifecycle.
    ///
    /// `Completed` is terminal here; leaving it requires the explicit reopen
    /// override, which does not go through this table.
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        matches!(
            (self, next),
            (Scheduled, Live) | (Live, Paused) | (Paused, Live) | (Live, Completed)
        )
    }

    /// Scores may only be edited while a match is under way.
    pub fn accepts_score(self) -> bool {
        matches!(self, MatchStatus::Live | MatchStatus::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchStatus::*;

    const ALL: [MatchStatus; 4] = [Scheduled, Live, Paused, Completed];

    #[test]
    fn test_edge_table() {
        let allowed: Vec<(MatchStatus, MatchStatus)> = ALL
            .iter()
            .flat_map(|from| ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (Scheduled, Live),
                (Live, Paused),
                (Live, Completed),
                (Paused, Live),
            ]
        );
    }

    #[test]
    fn test_scores_frozen_outside_play() {
        assert!(!Scheduled.accepts_score());
        assert!(Live.accepts_score());
        assert!(Paused.accepts_score());
        assert!(!Completed.accepts_score());
    }
}
