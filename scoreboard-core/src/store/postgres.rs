//! PostgreSQL entity store.
//!
//! Each query is a small struct processed by [`PgStore`] through the
//! `Processor` trait; the [`EntityStore`] impl only composes them.
//!
//! Change notifications come from the `entity_changed` NOTIFY channel fed by
//! row triggers (see `migrations/`), so writes made by other processes are
//! observed the same way as our own.

use async_trait::async_trait;
use kanau::processor::Processor;
use scoreboard_sdk::objects::Zone;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{EntityStore, StoreError, SwapOutcome};
use crate::entities::{
    CompetingStatus, EntityPath, MatchRecord, MatchStatus, Player, PlayerStatus, Snapshot,
    University,
};
use crate::events::{EntityChanged, EntityChangedReceiver, EntityChangedSender, entity_changed_channel};

/// NOTIFY channel written by the row triggers.
pub const NOTIFY_CHANNEL: &str = "entity_changed";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    changed_tx: EntityChangedSender,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        let (changed_tx, _) = entity_changed_channel();
        Self { pool, changed_tx }
    }

    /// Spawn the task relaying database notifications to subscribers.
    ///
    /// The relay keeps reconnecting with exponential backoff until shutdown.
    /// Notifications sent while it is disconnected are lost, so every
    /// successful LISTEN announces [`EntityChanged::Everything`] and consumers
    /// re-read all state.
    pub fn spawn_listener(&self, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let pool = self.pool.clone();
        let changed_tx = self.changed_tx.clone();

        tokio::spawn(async move {
            let mut backoff = RELAY_BACKOFF_MIN;
            loop {
                let opened = tokio::select! {
                    biased;
                    _ = shutdown_requested(&mut shutdown_rx) => break,
                    opened = open_listener(&pool) => opened,
                };
                match opened {
                    Ok(listener) => {
                        info!(channel = NOTIFY_CHANNEL, "Entity change listener started");
                        backoff = RELAY_BACKOFF_MIN;
                        let _ = changed_tx.send(EntityChanged::Everything);
                        if relay(listener, &changed_tx, &mut shutdown_rx).await == RelayExit::Shutdown {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, retry_in = ?backoff, "Failed to open notification listener");
                    }
                }

                tokio::select! {
                    biased;
                    _ = shutdown_requested(&mut shutdown_rx) => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(RELAY_BACKOFF_MAX);
            }
            info!("Entity change listener stopped");
        })
    }
}

const RELAY_BACKOFF_MIN: Duration = Duration::from_millis(500);
const RELAY_BACKOFF_MAX: Duration = Duration::from_secs(30);

#[derive(Debug, PartialEq, Eq)]
enum RelayExit {
    Shutdown,
    ListenerFailed,
}

async fn open_listener(pool: &PgPool) -> Result<PgListener, sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(NOTIFY_CHANNEL).await?;
    Ok(listener)
}

/// Resolves once shutdown is signaled. A dropped sender counts as shutdown.
async fn shutdown_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    while !*shutdown_rx.borrow_and_update() {
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

async fn relay(
    mut listener: PgListener,
    changed_tx: &EntityChangedSender,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> RelayExit {
    loop {
        tokio::select! {
            biased;

            _ = shutdown_requested(shutdown_rx) => {
                info!("Entity change listener received shutdown signal");
                return RelayExit::Shutdown;
            }

            received = listener.try_recv() => {
                match received {
                    Ok(Some(notification)) => {
                        let payload = notification.payload();
                        match EntityPath::parse(payload) {
                            Some(path) => {
                                debug!(%path, "Entity changed");
                                let _ = changed_tx.send(EntityChanged::Entity(path));
                            }
                            None => {
                                warn!(payload, "Unrecognised entity notification");
                                let _ = changed_tx.send(EntityChanged::Everything);
                            }
                        }
                    }
                    Ok(None) => {
                        warn!("Notification listener reconnected, notifications may have been lost");
                        let _ = changed_tx.send(EntityChanged::Everything);
                    }
                    Err(e) => {
                        error!(error = %e, "Notification listener failed");
                        let _ = changed_tx.send(EntityChanged::Everything);
                        return RelayExit::ListenerFailed;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct UniversityRow {
    id: Uuid,
    name: String,
    zone: String,
    sports: Vec<String>,
    wins: i32,
    losses: i32,
    draws: i32,
    points: i64,
    status: CompetingStatus,
    last_updated: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: Uuid,
    team_a: Uuid,
    team_b: Uuid,
    score_a: i32,
    score_b: i32,
    sport: String,
    zone: String,
    status: MatchStatus,
    start_time: Option<OffsetDateTime>,
    end_time: Option<OffsetDateTime>,
    last_updated: OffsetDateTime,
    revision: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PlayerRow {
    id: Uuid,
    university_id: Uuid,
    status: PlayerStatus,
    sports: Vec<String>,
    last_updated: OffsetDateTime,
}

fn corrupt(path: EntityPath, reason: impl ToString) -> StoreError {
    StoreError::Corrupt {
        path,
        reason: reason.to_string(),
    }
}

fn unsigned(path: EntityPath, column: &str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| corrupt(path, format!("negative {column}: {value}")))
}

fn signed(path: EntityPath, column: &str, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| corrupt(path, format!("{column} out of range: {value}")))
}

impl TryFrom<UniversityRow> for University {
    type Error = StoreError;

    fn try_from(row: UniversityRow) -> Result<Self, StoreError> {
        let path = EntityPath::University(row.id);
        Ok(University {
            id: row.id,
            zone: row.zone.parse::<Zone>().map_err(|e| corrupt(path, e))?,
            name: row.name,
            sports: row.sports.into_iter().collect(),
            wins: unsigned(path, "wins", row.wins)?,
            losses: unsigned(path, "losses", row.losses)?,
            draws: unsigned(path, "draws", row.draws)?,
            points: row.points,
            status: row.status,
            last_updated: row.last_updated,
        })
    }
}

impl TryFrom<MatchRow> for MatchRecord {
    type Error = StoreError;

    fn try_from(row: MatchRow) -> Result<Self, StoreError> {
        let path = EntityPath::Match(row.id);
        Ok(MatchRecord {
            id: row.id,
            team_a: row.team_a,
            team_b: row.team_b,
            score_a: unsigned(path, "score_a", row.score_a)?,
            score_b: unsigned(path, "score_b", row.score_b)?,
            zone: row.zone.parse::<Zone>().map_err(|e| corrupt(path, e))?,
            sport: row.sport,
            status: row.status,
            start_time: row.start_time,
            end_time: row.end_time,
            last_updated: row.last_updated,
            revision: u64::try_from(row.revision)
                .map_err(|_| corrupt(path, format!("negative revision: {}", row.revision)))?,
        })
    }
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            university_id: row.university_id,
            status: row.status,
            sports: row.sports.into_iter().collect(),
            last_updated: row.last_updated,
        }
    }
}

const UNIVERSITY_COLUMNS: &str =
    "id, name, zone, sports, wins, losses, draws, points, status, last_updated";
const MATCH_COLUMNS: &str = "id, team_a, team_b, score_a, score_b, sport, zone, status, \
     start_time, end_time, last_updated, revision";
const PLAYER_COLUMNS: &str = "id, university_id, status, sports, last_updated";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
/// Read every university, match and player inside one repeatable-read
/// transaction so the three lists agree with each other.
pub struct LoadSnapshot;

impl Processor<LoadSnapshot> for PgStore {
    type Output = Snapshot;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:LoadSnapshot")]
    async fn process(&self, _query: LoadSnapshot) -> Result<Snapshot, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let universities = sqlx::query_as::<_, UniversityRow>(&format!(
            "SELECT {UNIVERSITY_COLUMNS} FROM universities ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let matches = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        let players = sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Snapshot {
            universities: universities
                .into_iter()
                .map(University::try_from)
                .collect::<Result<_, _>>()?,
            matches: matches
                .into_iter()
                .map(MatchRecord::try_from)
                .collect::<Result<_, _>>()?,
            players: players.into_iter().map(Player::from).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GetUniversityById {
    pub id: Uuid,
}

impl Processor<GetUniversityById> for PgStore {
    type Output = Option<University>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:GetUniversityById")]
    async fn process(&self, query: GetUniversityById) -> Result<Option<University>, StoreError> {
        let row = sqlx::query_as::<_, UniversityRow>(&format!(
            "SELECT {UNIVERSITY_COLUMNS} FROM universities WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(University::try_from).transpose()
    }
}

#[derive(Debug, Clone)]
pub struct GetMatchById {
    pub id: Uuid,
}

impl Processor<GetMatchById> for PgStore {
    type Output = Option<MatchRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:GetMatchById")]
    async fn process(&self, query: GetMatchById) -> Result<Option<MatchRecord>, StoreError> {
        let row = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(MatchRecord::try_from).transpose()
    }
}

#[derive(Debug, Clone)]
/// All matches, earliest start first; unstarted matches last.
pub struct ListMatches;

impl Processor<ListMatches> for PgStore {
    type Output = Vec<MatchRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:ListMatches")]
    async fn process(&self, _query: ListMatches) -> Result<Vec<MatchRecord>, StoreError> {
        let rows = sqlx::query_as::<_, MatchRow>(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches ORDER BY start_time NULLS LAST, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MatchRecord::try_from).collect()
    }
}

#[derive(Debug, Clone)]
pub struct InsertMatch {
    pub record: MatchRecord,
}

impl Processor<InsertMatch> for PgStore {
    type Output = ();
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertMatch")]
    async fn process(&self, insert: InsertMatch) -> Result<(), StoreError> {
        let r = insert.record;
        let path = EntityPath::Match(r.id);
        let result = sqlx::query(
            r#"
            INSERT INTO matches
                (id, team_a, team_b, score_a, score_b, sport, zone, status,
                 start_time, end_time, last_updated, revision)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(r.id)
        .bind(r.team_a)
        .bind(r.team_b)
        .bind(signed(path, "score_a", r.score_a)?)
        .bind(signed(path, "score_b", r.score_b)?)
        .bind(&r.sport)
        .bind(r.zone.as_str())
        .bind(r.status)
        .bind(r.start_time)
        .bind(r.end_time)
        .bind(r.last_updated)
        .bind(r.revision as i64)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(path));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Conditional update keyed on `(id, revision)`.
pub struct SwapMatch {
    pub expected_revision: u64,
    pub record: MatchRecord,
}

impl Processor<SwapMatch> for PgStore {
    type Output = SwapOutcome;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:SwapMatch")]
    async fn process(&self, swap: SwapMatch) -> Result<SwapOutcome, StoreError> {
        let r = swap.record;
        let path = EntityPath::Match(r.id);
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET score_a = $3, score_b = $4, status = $5, start_time = $6,
                end_time = $7, last_updated = $8, revision = $9
            WHERE id = $1 AND revision = $2
            "#,
        )
        .bind(r.id)
        .bind(swap.expected_revision as i64)
        .bind(signed(path, "score_a", r.score_a)?)
        .bind(signed(path, "score_b", r.score_b)?)
        .bind(r.status)
        .bind(r.start_time)
        .bind(r.end_time)
        .bind(r.last_updated)
        .bind(r.revision as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(SwapOutcome::Swapped);
        }
        let exists: Option<i64> = sqlx::query_scalar("SELECT revision FROM matches WHERE id = $1")
            .bind(r.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match exists {
            Some(_) => SwapOutcome::Stale,
            None => SwapOutcome::Missing,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpsertUniversity {
    pub university: University,
}

impl Processor<UpsertUniversity> for PgStore {
    type Output = ();
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertUniversity")]
    async fn process(&self, upsert: UpsertUniversity) -> Result<(), StoreError> {
        let u = upsert.university;
        let path = EntityPath::University(u.id);
        sqlx::query(
            r#"
            INSERT INTO universities
                (id, name, zone, sports, wins, losses, draws, points, status, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name, zone = EXCLUDED.zone, sports = EXCLUDED.sports,
                wins = EXCLUDED.wins, losses = EXCLUDED.losses, draws = EXCLUDED.draws,
                points = EXCLUDED.points, status = EXCLUDED.status,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(u.id)
        .bind(&u.name)
        .bind(u.zone.as_str())
        .bind(u.sports.to_vec())
        .bind(signed(path, "wins", u.wins)?)
        .bind(signed(path, "losses", u.losses)?)
        .bind(signed(path, "draws", u.draws)?)
        .bind(u.points)
        .bind(u.status)
        .bind(u.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UpsertPlayer {
    pub player: Player,
}

impl Processor<UpsertPlayer> for PgStore {
    type Output = ();
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertPlayer")]
    async fn process(&self, upsert: UpsertPlayer) -> Result<(), StoreError> {
        let p = upsert.player;
        sqlx::query(
            r#"
            INSERT INTO players (id, university_id, status, sports, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                university_id = EXCLUDED.university_id, status = EXCLUDED.status,
                sports = EXCLUDED.sports, last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(p.id)
        .bind(p.university_id)
        .bind(p.status)
        .bind(p.sports.to_vec())
        .bind(p.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

#[async_trait]
impl EntityStore for PgStore {
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        self.process(LoadSnapshot).await
    }

    async fn get_university(&self, id: Uuid) -> Result<Option<University>, StoreError> {
        self.process(GetUniversityById { id }).await
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<MatchRecord>, StoreError> {
        self.process(GetMatchById { id }).await
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, StoreError> {
        self.process(ListMatches).await
    }

    async fn insert_match(&self, record: MatchRecord) -> Result<(), StoreError> {
        self.process(InsertMatch { record }).await
    }

    async fn swap_match(
        &self,
        expected_revision: u64,
        record: MatchRecord,
    ) -> Result<SwapOutcome, StoreError> {
        self.process(SwapMatch {
            expected_revision,
            record,
        })
        .await
    }

    async fn put_university(&self, university: University) -> Result<(), StoreError> {
        self.process(UpsertUniversity { university }).await
    }

    async fn put_player(&self, player: Player) -> Result<(), StoreError> {
        self.process(UpsertPlayer { player }).await
    }

    fn subscribe(&self) -> EntityChangedReceiver {
        self.changed_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn unreachable_store() -> PgStore {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://scoreboard@127.0.0.1:1/scoreboard?sslmode=disable")
            .unwrap();
        PgStore::new(pool)
    }

    #[tokio::test]
    async fn test_relay_keeps_retrying_until_shutdown() {
        let store = unreachable_store();
        let mut changes = store.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = store.spawn_listener(shutdown_rx);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!handle.is_finished());
        assert!(changes.try_recv().is_err());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_relay_stops_when_shutdown_sender_dropped() {
        let store = unreachable_store();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = store.spawn_listener(shutdown_rx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(shutdown_tx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_already_signaled() {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), shutdown_requested(&mut shutdown_rx))
            .await
            .unwrap();
    }
}
