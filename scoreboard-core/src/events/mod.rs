//! Event system for the recomputation and sync pipeline.
//!
//! # Event Flow
//!
//! 1. `EntityStore` write emits `EntityChanged` -> `ChangeListener`, `SyncHub`
//! 2. `ChangeListener` (debounced) or `RecomputeRequest` runs one pass ->
//!    `ResultPublisher`
//! 3. `ResultPublisher` swaps in the new artifacts -> `SyncHub`
//! 4. `SyncHub` emits `SyncUpdate` -> every `Subscription`
//!
//! `EntityChanged` is idempotent and ephemeral: it carries an entity address
//! rather than data, and consumers re-read from the store.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, ENTITY_CHANGED_BUFFER, EntityChangedReceiver, EntityChangedSender,
    RecomputeRequestReceiver, RecomputeRequestSender, SYNC_UPDATE_BUFFER, SyncUpdateReceiver,
    SyncUpdateSender, entity_changed_channel, recompute_request_channel, sync_update_channel,
};

pub use types::{EntityChanged, RecomputeRequest, SyncUpdate};
