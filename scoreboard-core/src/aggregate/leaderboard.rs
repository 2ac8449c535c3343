use std::cmp::{Ordering, Reverse};

use itertools::Itertools;
use scoreboard_sdk::objects::{Leaderboard, LeaderboardEntry};
use time::OffsetDateTime;

use crate::entities::{MatchStatus, Snapshot, University};

/// Rank competing universities.
///
/// Order: points descending, then name ascending ignoring case, then id. The
/// id tie-break makes the order total, so positions are always exactly
/// `1..=N`.
pub fn rank(snapshot: &Snapshot, last_updated: OffsetDateTime) -> Leaderboard {
    let competing = snapshot.competing_ids();
    let is_live = snapshot
        .eligible_matches(&competing)
        .any(|m| m.status == MatchStatus::Live);

    let entries = snapshot
        .competing()
        .sorted_by(|a, b| ranking_order(a, b))
        .enumerate()
        .map(|(index, u)| LeaderboardEntry {
            id: u.id,
            name: u.name.clone(),
            zone: u.zone,
            wins: u.wins,
            losses: u.losses,
            draws: u.draws,
            points: u.points,
            total_matches: u.wins.saturating_add(u.losses).saturating_add(u.draws),
            position: index as u32 + 1,
        })
        .collect();

    Leaderboard {
        entries,
        last_updated,
        is_live,
    }
}

fn ranking_order(a: &University, b: &University) -> Ordering {
    Reverse(a.points)
        .cmp(&Reverse(b.points))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{match_between, university};
    use crate::entities::CompetingStatus::*;
    use uuid::Uuid;

    fn positions(board: &Leaderboard) -> Vec<(Uuid, u32, i64)> {
        board
            .entries
            .iter()
            .map(|e| (e.id, e.position, e.points))
            .collect()
    }

    #[test]
    fn test_tie_broken_alphabetically() {
        let snapshot = Snapshot {
            universities: vec![
                university(3, "Gamma", 3, Affiliated),
                university(2, "Beta", 9, Competing),
                university(1, "Alpha", 9, Competing),
            ],
            ..Default::default()
        };
        let board = rank(&snapshot, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(
            positions(&board),
            vec![(Uuid::from_u128(1), 1, 9), (Uuid::from_u128(2), 2, 9)]
        );
        assert!(!board.is_live);
    }

    #[test]
    fn test_name_comparison_ignores_case_and_id_breaks_collisions() {
        let snapshot = Snapshot {
            universities: vec![
                university(7, "delta", 5, Competing),
                university(5, "Delta", 5, Competing),
                university(6, "charlie", 5, Competing),
                university(8, "Echo", 6, Competing),
            ],
            ..Default::default()
        };
        let ids: Vec<u128> = rank(&snapshot, OffsetDateTime::UNIX_EPOCH)
            .entries
            .iter()
            .map(|e| e.id.as_u128())
            .collect();
        assert_eq!(ids, vec![8, 6, 5, 7]);
    }

    #[test]
    fn test_ranking_is_deterministic_and_contiguous() {
        let universities: Vec<_> = (0..40u128)
            .map(|i| university(i, &format!("Uni {}", i % 7), (i % 5) as i64, Competing))
            .collect();
        let forward = Snapshot {
            universities: universities.clone(),
            ..Default::default()
        };
        let backward = Snapshot {
            universities: universities.into_iter().rev().collect(),
            ..Default::default()
        };

        let a = rank(&forward, OffsetDateTime::UNIX_EPOCH);
        let b = rank(&backward, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(a, b);
        let positions: Vec<u32> = a.entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, (1..=40).collect::<Vec<u32>>());
    }

    #[test]
    fn test_total_matches_and_live_flag() {
        let mut alpha = university(1, "Alpha", 4, Competing);
        alpha.wins = 2;
        alpha.losses = 1;
        alpha.draws = 1;
        let snapshot = Snapshot {
            universities: vec![
                alpha,
                university(2, "Beta", 0, Competing),
                university(3, "Gamma", 0, NotCompeting),
            ],
            matches: vec![match_between(10, 1, 3, MatchStatus::Live)],
            ..Default::default()
        };
        let board = rank(&snapshot, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(board.entries[0].total_matches, 4);
        // Gamma is not competing, so its live match does not make the board live.
        assert!(!board.is_live);

        let mut snapshot = snapshot;
        snapshot
            .matches
            .push(match_between(11, 1, 2, MatchStatus::Live));
        assert!(rank(&snapshot, OffsetDateTime::UNIX_EPOCH).is_live);
    }

    #[test]
    fn test_total_matches_saturates() {
        let mut alpha = university(1, "Alpha", 0, Competing);
        alpha.wins = u32::MAX;
        alpha.losses = 1;
        alpha.draws = 1;
        let snapshot = Snapshot {
            universities: vec![alpha],
            ..Default::default()
        };
        let board = rank(&snapshot, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(board.entries[0].total_matches, u32::MAX);
        assert_eq!(board.entries[0].wins, u32::MAX);
    }

    #[test]
    fn test_no_competing_universities() {
        let snapshot = Snapshot {
            universities: vec![university(1, "Alpha", 3, Affiliated)],
            ..Default::default()
        };
        assert!(rank(&snapshot, OffsetDateTime::UNIX_EPOCH).entries.is_empty());
    }
}
