//! Live match state machine.
//!
//! [`LiveMatchService`] is the only writer of matches. Every operation
//! validates against the current stored state and writes with a
//! compare-and-swap on the match revision, so a rejected precondition never
//! leaves a partial write and two concurrent edits cannot overwrite each
//! other.
//!
//! Callers never wait for recomputation: an operation returns as soon as the
//! store has accepted the write. The store's change notification is what
//! eventually drives the leaderboard.

mod transitions;

use scoreboard_sdk::objects::{UnknownZone, Zone};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigStore, EngineConfig};
use crate::entities::{MatchRecord, MatchStatus};
use crate::store::{EntityStore, SharedStore, StoreError, SwapOutcome};

/// Malformed input to `create_match`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("a match needs two different teams")]
    SameTeam,

    #[error(transparent)]
    UnknownZone(#[from] UnknownZone),

    #[error("sport must not be blank")]
    BlankSport,

    #[error("unknown university: {0}")]
    UnknownTeam(Uuid),
}

/// Errors returned synchronously to the mutation caller.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid match: {0}")]
    Validation(#[from] ValidationError),

    #[error("match not found: {0}")]
    NotFound(Uuid),

    #[error("cannot {operation} match {match_id} while it is {status}")]
    InvalidState {
        match_id: Uuid,
        status: MatchStatus,
        operation: &'static str,
    },

    #[error("match {match_id} cannot go from {from} to {to}")]
    InvalidTransition {
        match_id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
    },

    /// The match kept changing underneath us.
    #[error("match {0} was modified concurrently too many times")]
    Conflict(Uuid),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct LiveMatchService {
    store: SharedStore,
    config: ConfigStore<EngineConfig>,
}

impl LiveMatchService {
    pub fn new(store: SharedStore, config: ConfigStore<EngineConfig>) -> Self {
        Self { store, config }
    }

    /// Schedule a new match between two existing universities.
    pub async fn create_match(
        &self,
        team_a: Uuid,
        team_b: Uuid,
        sport: &str,
        zone: &str,
    ) -> Result<MatchRecord, MatchError> {
        if team_a == team_b {
            return Err(ValidationError::SameTeam.into());
        }
        let zone: Zone = zone.parse().map_err(ValidationError::from)?;
        let sport = sport.trim();
        if sport.is_empty() {
            return Err(ValidationError::BlankSport.into());
        }
        for team in [team_a, team_b] {
            if self.store.get_university(team).await?.is_none() {
                return Err(ValidationError::UnknownTeam(team).into());
            }
        }

        let record = MatchRecord {
            id: Uuid::now_v7(),
            team_a,
            team_b,
            score_a: 0,
            score_b: 0,
            sport: sport.to_owned(),
            zone,
            status: MatchStatus::Scheduled,
            start_time: None,
            end_time: None,
            last_updated: OffsetDateTime::now_utc(),
            revision: 1,
        };
        self.store.insert_match(record.clone()).await?;
        info!(
            match_id = %record.id,
            %team_a,
            %team_b,
            sport = %record.sport,
            %zone,
            "Match scheduled"
        );
        Ok(record)
    }

    /// Set both scores of a live or paused match.
    pub async fn update_score(
        &self,
        match_id: Uuid,
        score_a: u32,
        score_b: u32,
    ) -> Result<MatchRecord, MatchError> {
        self.mutate(match_id, "update score", |current| {
            if !current.status.accepts_score() {
                return Err(MatchError::InvalidState {
                    match_id,
                    status: current.status,
                    operation: "update score",
                });
            }
            Ok(MatchRecord {
                score_a,
                score_b,
                ..current.clone()
            })
        })
        .await
    }

    /// Move a match along one edge of the lifecycle.
    pub async fn transition(
        &self,
        match_id: Uuid,
        to: MatchStatus,
    ) -> Result<MatchRecord, MatchError> {
        self.mutate(match_id, "transition", |current| {
            if !current.status.can_transition_to(to) {
                return Err(MatchError::InvalidTransition {
                    match_id,
                    from: current.status,
                    to,
                });
            }
            let now = OffsetDateTime::now_utc();
            let mut next = current.clone();
            next.status = to;
            match to {
                MatchStatus::Live if next.start_time.is_none() => next.start_time = Some(now),
                MatchStatus::Completed => next.end_time = Some(now),
                _ => {}
            }
            Ok(next)
        })
        .await
    }

    /// Admin override: bring a completed match back to `Paused` so its score
    /// can be corrected. The end time is cleared; the start time is kept.
    pub async fn reopen(&self, match_id: Uuid) -> Result<MatchRecord, MatchError> {
        self.mutate(match_id, "reopen", |current| {
            if current.status != MatchStatus::Completed {
                return Err(MatchError::InvalidState {
                    match_id,
                    status: current.status,
                    operation: "reopen",
                });
            }
            Ok(MatchRecord {
                status: MatchStatus::Paused,
                end_time: None,
                ..current.clone()
            })
        })
        .await
    }

    /// Read, validate and compare-and-swap, retrying when another writer got
    /// in between. `apply` sees the freshly read state on every attempt.
    async fn mutate<F>(
        &self,
        match_id: Uuid,
        operation: &'static str,
        apply: F,
    ) -> Result<MatchRecord, MatchError>
    where
        F: Fn(&MatchRecord) -> Result<MatchRecord, MatchError> + Send + Sync,
    {
        let max_retries = self.config.read().await.max_swap_retries;

        for attempt in 0..=max_retries {
            let current = self
                .store
                .get_match(match_id)
                .await?
                .ok_or(MatchError::NotFound(match_id))?;

            let mut next = apply(&current)?;
            next.revision = current.revision + 1;
            next.last_updated = OffsetDateTime::now_utc().max(current.last_updated);

            match self.store.swap_match(current.revision, next.clone()).await? {
                SwapOutcome::Swapped => {
                    info!(
                        %match_id,
                        operation,
                        status = %next.status,
                        score_a = next.score_a,
                        score_b = next.score_b,
                        revision = next.revision,
                        "Match updated"
                    );
                    return Ok(next);
                }
                SwapOutcome::Stale => {
                    debug!(%match_id, operation, attempt, "Lost write race, retrying");
                }
                SwapOutcome::Missing => return Err(MatchError::NotFound(match_id)),
            }
        }

        warn!(%match_id, operation, max_retries, "Giving up after repeated write conflicts");
        Err(MatchError::Conflict(match_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CompetingStatus, University};
    use crate::store::{EntityStore, MemoryStore};
    use std::sync::Arc;

    fn university(id: u128, name: &str) -> University {
        University {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            zone: Zone::North,
            sports: Default::default(),
            wins: 0,
            losses: 0,
            draws: 0,
            points: 0,
            status: CompetingStatus::Competing,
            last_updated: OffsetDateTime::UNIX_EPOCH,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, LiveMatchService) {
        let store = Arc::new(MemoryStore::new());
        store.put_university(university(1, "Alpha")).await.unwrap();
        store.put_university(university(2, "Beta")).await.unwrap();
        let service = LiveMatchService::new(store.clone(), ConfigStore::new(EngineConfig::default()));
        (store, service)
    }

    async fn scheduled(service: &LiveMatchService) -> MatchRecord {
        service
            .create_match(Uuid::from_u128(1), Uuid::from_u128(2), "football", "north")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_match_validation() {
        let (_, service) = setup().await;
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);

        let err = service.create_match(a, a, "football", "north").await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(ValidationError::SameTeam)));

        let err = service.create_match(a, b, "football", "atlantis").await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(ValidationError::UnknownZone(_))));

        let err = service.create_match(a, b, "  ", "north").await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(ValidationError::BlankSport)));

        let ghost = Uuid::from_u128(99);
        let err = service.create_match(a, ghost, "football", "north").await.unwrap_err();
        assert!(matches!(err, MatchError::Validation(ValidationError::UnknownTeam(id)) if id == ghost));

        let created = service.create_match(a, b, " football ", "North-East").await.unwrap();
        assert_eq!(created.status, MatchStatus::Scheduled);
        assert_eq!(created.zone, Zone::NorthEast);
        assert_eq!(created.sport, "football");
        assert_eq!(created.revision, 1);
    }

    #[tokio::test]
    async fn test_scheduled_cannot_jump_to_completed() {
        let (store, service) = setup().await;
        let m = scheduled(&service).await;

        let err = service.transition(m.id, MatchStatus::Completed).await.unwrap_err();
        assert!(matches!(
            err,
            MatchError::InvalidTransition {
                from: MatchStatus::Scheduled,
                to: MatchStatus::Completed,
                ..
            }
        ));
        let stored = store.get_match(m.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MatchStatus::Scheduled);
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn test_lifecycle_stamps_times() {
        let (_, service) = setup().await;
        let m = scheduled(&service).await;

        let live = service.transition(m.id, MatchStatus::Live).await.unwrap();
        let started = live.start_time.unwrap();
        assert!(live.last_updated >= m.last_updated);

        let paused = service.transition(m.id, MatchStatus::Paused).await.unwrap();
        let resumed = service.transition(m.id, MatchStatus::Live).await.unwrap();
        assert_eq!(resumed.start_time, Some(started));
        assert_eq!(paused.end_time, None);

        let scored = service.update_score(m.id, 2, 1).await.unwrap();
        assert_eq!((scored.score_a, scored.score_b), (2, 1));

        let done = service.transition(m.id, MatchStatus::Completed).await.unwrap();
        assert!(done.end_time.is_some());
        assert_eq!(done.revision, 6);
    }

    #[tokio::test]
    async fn test_completed_scores_are_frozen() {
        let (store, service) = setup().await;
        let m = scheduled(&service).await;
        service.transition(m.id, MatchStatus::Live).await.unwrap();
        service.update_score(m.id, 3, 0).await.unwrap();
        let done = service.transition(m.id, MatchStatus::Completed).await.unwrap();

        let err = service.update_score(m.id, 4, 0).await.unwrap_err();
        assert!(matches!(
            err,
            MatchError::InvalidState {
                status: MatchStatus::Completed,
                ..
            }
        ));
        assert_eq!(store.get_match(m.id).await.unwrap().unwrap(), done);
    }

    #[tokio::test]
    async fn test_score_rejected_before_kickoff() {
        let (_, service) = setup().await;
        let m = scheduled(&service).await;
        let err = service.update_score(m.id, 1, 0).await.unwrap_err();
        assert!(matches!(
            err,
            MatchError::InvalidState {
                status: MatchStatus::Scheduled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_match() {
        let (_, service) = setup().await;
        let ghost = Uuid::from_u128(404);
        assert!(matches!(
            service.update_score(ghost, 1, 1).await,
            Err(MatchError::NotFound(id)) if id == ghost
        ));
        assert!(matches!(
            service.transition(ghost, MatchStatus::Live).await,
            Err(MatchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reopen_is_the_only_way_out_of_completed() {
        let (_, service) = setup().await;
        let m = scheduled(&service).await;

        assert!(matches!(
            service.reopen(m.id).await,
            Err(MatchError::InvalidState { .. })
        ));

        service.transition(m.id, MatchStatus::Live).await.unwrap();
        service.transition(m.id, MatchStatus::Completed).await.unwrap();
        for to in [MatchStatus::Live, MatchStatus::Paused, MatchStatus::Scheduled] {
            assert!(matches!(
                service.transition(m.id, to).await,
                Err(MatchError::InvalidTransition { .. })
            ));
        }

        let reopened = service.reopen(m.id).await.unwrap();
        assert_eq!(reopened.status, MatchStatus::Paused);
        assert_eq!(reopened.end_time, None);
        let corrected = service.update_score(m.id, 1, 1).await.unwrap();
        assert_eq!((corrected.score_a, corrected.score_b), (1, 1));
    }

    #[tokio::test]
    async fn test_concurrent_score_updates_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        store.put_university(university(1, "Alpha")).await.unwrap();
        store.put_university(university(2, "Beta")).await.unwrap();
        let config = ConfigStore::new(EngineConfig {
            max_swap_retries: 50,
            ..EngineConfig::default()
        });
        let service = LiveMatchService::new(store.clone(), config);
        let m = scheduled(&service).await;
        service.transition(m.id, MatchStatus::Live).await.unwrap();

        let handles: Vec<_> = (1..=10)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.update_score(m.id, i, 0).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get_match(m.id).await.unwrap().unwrap();
        assert_eq!(stored.revision, 12);
    }
}
