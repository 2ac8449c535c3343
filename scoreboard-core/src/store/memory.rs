//! In-process entity store.
//!
//! Used for single-node deployments and tests. State lives behind one
//! `RwLock`, so a snapshot is always consistent across the three entity
//! kinds.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityStore, StoreError, SwapOutcome};
use crate::entities::{EntityPath, MatchRecord, Player, Snapshot, University};
use crate::events::{EntityChanged, EntityChangedReceiver, EntityChangedSender, entity_changed_channel};

#[derive(Default)]
struct Tables {
    universities: HashMap<Uuid, University>,
    matches: HashMap<Uuid, MatchRecord>,
    players: HashMap<Uuid, Player>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    changed_tx: EntityChangedSender,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changed_tx, _) = entity_changed_channel();
        Self {
            tables: RwLock::new(Tables::default()),
            changed_tx,
        }
    }

    fn announce(&self, path: EntityPath) {
        // No subscriber yet is fine: the first pass reads a full snapshot.
        let _ = self.changed_tx.send(EntityChanged::Entity(path));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let tables = self.tables.read().await;
        let mut universities: Vec<University> = tables.universities.values().cloned().collect();
        let mut matches: Vec<MatchRecord> = tables.matches.values().cloned().collect();
        let mut players: Vec<Player> = tables.players.values().cloned().collect();
        drop(tables);

        // HashMap iteration order is arbitrary; keep snapshots reproducible.
        universities.sort_by_key(|u| u.id);
        matches.sort_by_key(|m| m.id);
        players.sort_by_key(|p| p.id);

        Ok(Snapshot {
            universities,
            matches,
            players,
        })
    }

    async fn get_university(&self, id: Uuid) -> Result<Option<University>, StoreError> {
        Ok(self.tables.read().await.universities.get(&id).cloned())
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<MatchRecord>, StoreError> {
        Ok(self.tables.read().await.matches.get(&id).cloned())
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, StoreError> {
        let mut matches: Vec<MatchRecord> =
            self.tables.read().await.matches.values().cloned().collect();
        // Unstarted matches last, like `NULLS LAST` in the postgres store.
        matches.sort_by_key(|m| (m.start_time.is_none(), m.start_time, m.id));
        Ok(matches)
    }

    async fn insert_match(&self, record: MatchRecord) -> Result<(), StoreError> {
        let id = record.id;
        {
            let mut tables = self.tables.write().await;
            if tables.matches.contains_key(&id) {
                return Err(StoreError::AlreadyExists(EntityPath::Match(id)));
            }
            tables.matches.insert(id, record);
        }
        self.announce(EntityPath::Match(id));
        Ok(())
    }

    async fn swap_match(
        &self,
        expected_revision: u64,
        record: MatchRecord,
    ) -> Result<SwapOutcome, StoreError> {
        let id = record.id;
        {
            let mut tables = self.tables.write().await;
            let Some(current) = tables.matches.get_mut(&id) else {
                return Ok(SwapOutcome::Missing);
            };
            if current.revision != expected_revision {
                return Ok(SwapOutcome::Stale);
            }
            *current = record;
        }
        self.announce(EntityPath::Match(id));
        Ok(SwapOutcome::Swapped)
    }

    async fn put_university(&self, university: University) -> Result<(), StoreError> {
        let id = university.id;
        self.tables.write().await.universities.insert(id, university);
        self.announce(EntityPath::University(id));
        Ok(())
    }

    async fn put_player(&self, player: Player) -> Result<(), StoreError> {
        let id = player.id;
        self.tables.write().await.players.insert(id, player);
        self.announce(EntityPath::Player(id));
        Ok(())
    }

    fn subscribe(&self) -> EntityChangedReceiver {
        self.changed_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MatchStatus;
    use scoreboard_sdk::objects::Zone;
    use time::OffsetDateTime;

    fn record(id: u128, revision: u64) -> MatchRecord {
        MatchRecord {
            id: Uuid::from_u128(id),
            team_a: Uuid::from_u128(1),
            team_b: Uuid::from_u128(2),
            score_a: 0,
            score_b: 0,
            sport: "basketball".to_string(),
            zone: Zone::East,
            status: MatchStatus::Scheduled,
            start_time: None,
            end_time: None,
            last_updated: OffsetDateTime::UNIX_EPOCH,
            revision,
        }
    }

    #[tokio::test]
    async fn test_swap_requires_matching_revision() {
        let store = MemoryStore::new();
        store.insert_match(record(10, 1)).await.unwrap();

        let mut next = record(10, 2);
        next.score_a = 3;
        assert_eq!(store.swap_match(2, next.clone()).await.unwrap(), SwapOutcome::Stale);
        assert_eq!(store.swap_match(1, next).await.unwrap(), SwapOutcome::Swapped);
        assert_eq!(
            store.swap_match(1, record(99, 2)).await.unwrap(),
            SwapOutcome::Missing
        );

        let stored = store.get_match(Uuid::from_u128(10)).await.unwrap().unwrap();
        assert_eq!((stored.score_a, stored.revision), (3, 2));
    }

    #[tokio::test]
    async fn test_writes_are_announced() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.insert_match(record(10, 1)).await.unwrap();
        assert!(matches!(
            rx.recv().await,
            Ok(EntityChanged::Entity(EntityPath::Match(id))) if id == Uuid::from_u128(10)
        ));
        assert!(matches!(
            store.insert_match(record(10, 1)).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }
}
