//! Event type definitions for the recomputation and sync pipeline.
//!
//! Entity change events are idempotent and ephemeral. They carry the
//! address of what changed rather than the data, so consumers always read
//! current state from the store or the publisher.

use std::sync::Arc;

use scoreboard_sdk::objects::{CalculatedBy, MatchView};
use tokio::sync::oneshot;

use crate::entities::EntityPath;
use crate::processors::publisher::Published;
use crate::processors::recompute::{PassReport, RecomputeFailure};

/// Emitted by the entity store after every accepted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityChanged {
    /// A single entity was written.
    Entity(EntityPath),
    /// The store cannot say what changed (e.g. notifications were lost);
    /// consumers must treat all state as changed.
    Everything,
}

/// Request to run one recomputation pass right away.
///
/// Sent by the manual trigger entrypoint. The reply channel, if present,
/// receives the outcome of the pass that served the request.
#[derive(Debug)]
pub struct RecomputeRequest {
    pub provenance: CalculatedBy,
    pub reply: Option<oneshot::Sender<Result<PassReport, RecomputeFailure>>>,
}

/// Fan-out message from the sync hub to every subscriber.
#[derive(Debug, Clone)]
pub enum SyncUpdate {
    /// A match was written; carries its state right after the write.
    MatchChanged(Arc<MatchView>),
    /// A new set of derived artifacts was published.
    Published(Arc<Published>),
    /// The hub lost track of changes; subscribers must resync.
    Resync,
}
