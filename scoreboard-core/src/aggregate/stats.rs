use scoreboard_sdk::objects::{CalculatedBy, StatsSummary};
use time::OffsetDateTime;

use crate::entities::{MatchStatus, PlayerStatus, Snapshot};

/// Tournament-wide counters over competing universities.
///
/// Matches and players are only counted when every university they refer to
/// is competing.
pub fn compute_stats(
    snapshot: &Snapshot,
    calculated_at: OffsetDateTime,
    calculated_by: CalculatedBy,
) -> StatsSummary {
    let competing = snapshot.competing_ids();

    // Summed in i128, clamped to i64 once at the end.
    let mut total_points = 0i128;
    let (mut wins, mut losses, mut draws) = (0u64, 0u64, 0u64);
    for university in snapshot.competing() {
        total_points += i128::from(university.points);
        wins += u64::from(university.wins);
        losses += u64::from(university.losses);
        draws += u64::from(university.draws);
    }

    let (mut completed, mut live, mut upcoming) = (0u32, 0u32, 0u32);
    for m in snapshot.eligible_matches(&competing) {
        match m.status {
            MatchStatus::Completed => completed += 1,
            MatchStatus::Live => live += 1,
            MatchStatus::Scheduled => upcoming += 1,
            MatchStatus::Paused => {}
        }
    }

    let (mut active, mut inactive) = (0u32, 0u32);
    for player in snapshot
        .players
        .iter()
        .filter(|p| competing.contains(&p.university_id))
    {
        match player.status {
            PlayerStatus::Active => active += 1,
            PlayerStatus::Inactive => inactive += 1,
        }
    }

    let total_points =
        i64::try_from(total_points).unwrap_or(if total_points < 0 { i64::MIN } else { i64::MAX });

    let competing_count = competing.len() as u32;
    StatsSummary {
        total_universities: competing_count,
        competing_universities: competing_count,
        total_points,
        total_wins: wins,
        total_losses: losses,
        total_draws: draws,
        total_matches: completed,
        completed_matches: completed,
        live_matches: live,
        upcoming_matches: upcoming,
        active_players: active,
        inactive_players: inactive,
        last_calculated: calculated_at,
        calculated_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{match_between, player, university};
    use crate::entities::CompetingStatus::*;
    use time::Duration;

    fn tournament() -> Snapshot {
        let mut alpha = university(1, "Alpha", 9, Competing);
        alpha.wins = 3;
        alpha.losses = 1;
        let mut beta = university(2, "Beta", 9, Competing);
        beta.draws = 2;
        let gamma = university(3, "Gamma", 3, Affiliated);

        Snapshot {
            universities: vec![alpha, beta, gamma],
            matches: vec![
                match_between(10, 1, 2, MatchStatus::Completed),
                match_between(11, 1, 2, MatchStatus::Live),
                match_between(12, 2, 1, MatchStatus::Scheduled),
                match_between(13, 1, 3, MatchStatus::Completed),
                match_between(14, 3, 2, MatchStatus::Live),
                match_between(15, 1, 2, MatchStatus::Paused),
            ],
            players: vec![
                player(20, 1, PlayerStatus::Active),
                player(21, 2, PlayerStatus::Active),
                player(22, 2, PlayerStatus::Inactive),
                player(23, 3, PlayerStatus::Active),
            ],
        }
    }

    #[test]
    fn test_only_competing_universities_count() {
        let stats = compute_stats(
            &tournament(),
            OffsetDateTime::UNIX_EPOCH,
            CalculatedBy::ScheduledTrigger,
        );
        assert_eq!(stats.total_universities, 2);
        assert_eq!(stats.competing_universities, 2);
        assert_eq!(stats.total_points, 18);
        assert_eq!(stats.total_wins, 3);
        assert_eq!(stats.total_losses, 1);
        assert_eq!(stats.total_draws, 2);
        assert_eq!(stats.total_matches, 1);
        assert_eq!(stats.completed_matches, 1);
        assert_eq!(stats.live_matches, 1);
        assert_eq!(stats.upcoming_matches, 1);
        assert_eq!(stats.active_players, 2);
        assert_eq!(stats.inactive_players, 1);
    }

    #[test]
    fn test_same_snapshot_same_figures() {
        let snapshot = tournament();
        let first = compute_stats(
            &snapshot,
            OffsetDateTime::UNIX_EPOCH,
            CalculatedBy::ScheduledTrigger,
        );
        let second = compute_stats(
            &snapshot,
            OffsetDateTime::UNIX_EPOCH + Duration::minutes(5),
            CalculatedBy::ScheduledTrigger,
        );
        assert_ne!(first, second);
        assert!(first.same_figures(&second));
    }

    #[test]
    fn test_extreme_points_saturate() {
        let snapshot = Snapshot {
            universities: vec![
                university(1, "Alpha", i64::MAX, Competing),
                university(2, "Beta", 1, Competing),
                university(3, "Gamma", 5, Competing),
            ],
            ..Default::default()
        };
        let stats = compute_stats(
            &snapshot,
            OffsetDateTime::UNIX_EPOCH,
            CalculatedBy::ScheduledTrigger,
        );
        assert_eq!(stats.total_points, i64::MAX);

        let snapshot = Snapshot {
            universities: vec![
                university(1, "Alpha", i64::MIN, Competing),
                university(2, "Beta", -1, Competing),
            ],
            ..Default::default()
        };
        let stats = compute_stats(
            &snapshot,
            OffsetDateTime::UNIX_EPOCH,
            CalculatedBy::ScheduledTrigger,
        );
        assert_eq!(stats.total_points, i64::MIN);

        let snapshot = Snapshot {
            universities: vec![
                university(1, "Alpha", i64::MAX, Competing),
                university(2, "Beta", 1, Competing),
                university(3, "Gamma", -1, Competing),
            ],
            ..Default::default()
        };
        let stats = compute_stats(
            &snapshot,
            OffsetDateTime::UNIX_EPOCH,
            CalculatedBy::ScheduledTrigger,
        );
        assert_eq!(stats.total_points, i64::MAX);
    }

    #[test]
    fn test_empty_tournament() {
        let stats = compute_stats(
            &Snapshot::default(),
            OffsetDateTime::UNIX_EPOCH,
            CalculatedBy::ManualTrigger,
        );
        assert_eq!(stats.total_universities, 0);
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.calculated_by, CalculatedBy::ManualTrigger);
    }
}
