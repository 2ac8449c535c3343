//! Event channel factories and handles.
//!
//! Provides factory functions for creating event channels with appropriate
//! buffer sizes for the recomputation and sync pipeline.

use super::types::{EntityChanged, RecomputeRequest, SyncUpdate};
use tokio::sync::{broadcast, mpsc};

/// Default buffer size for point-to-point event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Buffer size for the store's change broadcast.
///
/// A receiver that falls further behind than this gets `Lagged`, which the
/// change listener treats as "something changed".
pub const ENTITY_CHANGED_BUFFER: usize = 1024;

/// Buffer size for the subscriber fan-out.
pub const SYNC_UPDATE_BUFFER: usize = 512;

/// Sender handle for EntityChanged events.
pub type EntityChangedSender = broadcast::Sender<EntityChanged>;
/// Receiver handle for EntityChanged events.
pub type EntityChangedReceiver = broadcast::Receiver<EntityChanged>;

/// Sender handle for RecomputeRequest events.
pub type RecomputeRequestSender = mpsc::Sender<RecomputeRequest>;
/// Receiver handle for RecomputeRequest events.
pub type RecomputeRequestReceiver = mpsc::Receiver<RecomputeRequest>;

/// Sender handle for SyncUpdate events.
pub type SyncUpdateSender = broadcast::Sender<SyncUpdate>;
/// Receiver handle for SyncUpdate events.
pub type SyncUpdateReceiver = broadcast::Receiver<SyncUpdate>;

/// Create a new EntityChanged broadcast channel.
///
/// Stores keep the sender; every consumer calls `subscribe()` on it.
pub fn entity_changed_channel() -> (EntityChangedSender, EntityChangedReceiver) {
    broadcast::channel(ENTITY_CHANGED_BUFFER)
}

/// Create a new RecomputeRequest channel.
///
/// Returns a (sender, receiver) pair. The receiver belongs to the single
/// change listener; senders can be cloned freely.
pub fn recompute_request_channel() -> (RecomputeRequestSender, RecomputeRequestReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new SyncUpdate broadcast channel.
pub fn sync_update_channel() -> (SyncUpdateSender, SyncUpdateReceiver) {
    broadcast::channel(SYNC_UPDATE_BUFFER)
}
