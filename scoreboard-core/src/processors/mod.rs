//! Long-running processors of the recomputation and sync pipeline.
//!
//! - `ChangeListener`: receives `EntityChanged` and `RecomputeRequest`, runs
//!   debounced passes through the `RecomputePipeline`
//! - `ResultPublisher`: swaps in each pass's artifacts, read via
//!   `PublishedReader`
//! - `SyncHub`: receives `EntityChanged` and publications, emits `SyncUpdate`
//!   to every `Subscription`

pub mod change_listener;
pub mod dispatcher;
pub mod publisher;
pub mod recompute;

pub use change_listener::{ChangeListener, RecomputeTrigger};
pub use dispatcher::{InitialState, Subscription, SyncEvent, SyncHandle, SyncHub};
pub use publisher::{Published, PublishedReader, ResultPublisher};
pub use recompute::{PassReport, RecomputeFailure, RecomputePipeline};
