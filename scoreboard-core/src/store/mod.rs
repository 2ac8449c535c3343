//! Durable keyed storage for raw entities.
//!
//! The store is the single shared mutable resource of the engine. Writers go
//! through [`EntityStore`]; every accepted write is announced on the store's
//! change channel, which feeds the change listener and the sync hub.
//!
//! Delivery on the change channel is at-least-once and carries only the
//! address of the changed entity. Consumers re-read current state.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{EntityPath, MatchRecord, Player, Snapshot, University};
use crate::events::EntityChangedReceiver;

/// Errors that can occur while reading or writing entities.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row cannot be mapped back to an entity.
    #[error("corrupt record {path}: {reason}")]
    Corrupt { path: EntityPath, reason: String },

    /// An insert collided with an existing entity.
    #[error("entity already exists: {0}")]
    AlreadyExists(EntityPath),

    /// The backing store is temporarily unable to serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The store handle shared by every component of the engine.
pub type SharedStore = Arc<dyn EntityStore>;

/// Result of a compare-and-swap write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Swapped,
    /// The stored revision differs from the expected one.
    Stale,
    Missing,
}

#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    /// Read every university, match and player.
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError>;

    async fn get_university(&self, id: Uuid) -> Result<Option<University>, StoreError>;

    async fn get_match(&self, id: Uuid) -> Result<Option<MatchRecord>, StoreError>;

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, StoreError>;

    async fn insert_match(&self, record: MatchRecord) -> Result<(), StoreError>;

    /// Replace a match only if its stored revision equals `expected_revision`.
    async fn swap_match(
        &self,
        expected_revision: u64,
        record: MatchRecord,
    ) -> Result<SwapOutcome, StoreError>;

    async fn put_university(&self, university: University) -> Result<(), StoreError>;

    async fn put_player(&self, player: Player) -> Result<(), StoreError>;

    /// Subscribe to change notifications. Only writes accepted after this call
    /// are guaranteed to be delivered.
    fn subscribe(&self) -> EntityChangedReceiver;
}
