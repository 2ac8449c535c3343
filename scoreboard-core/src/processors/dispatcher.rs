//! SyncHub processor and per-viewer subscriptions.
//!
//! The SyncHub is responsible for:
//! - Reading every written match back from the store and fanning it out
//! - Fanning out every new publication
//! - Telling subscribers to resync when it lost track of changes
//!
//! Each [`Subscription`] keeps its own match tracker and freshness guard, so
//! a slow or resyncing viewer never affects another one.

use std::sync::Arc;

use scoreboard_sdk::objects::MatchView;
use scoreboard_sdk::sync::{FreshnessGuard, MatchNotification, MatchTracker};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::entities::EntityPath;
use crate::events::{
    EntityChanged, EntityChangedReceiver, SyncUpdate, SyncUpdateReceiver, SyncUpdateSender,
    sync_update_channel,
};
use crate::processors::publisher::{Published, PublishedReader};
use crate::store::{EntityStore, SharedStore, StoreError};

pub struct SyncHub {
    store: SharedStore,
    reader: PublishedReader,
    changes: EntityChangedReceiver,
    updates: SyncUpdateSender,
}

impl SyncHub {
    pub fn new(store: SharedStore, reader: PublishedReader) -> Self {
        let changes = store.subscribe();
        let (updates, _) = sync_update_channel();
        Self {
            store,
            reader,
            changes,
            updates,
        }
    }

    /// Handle used to open subscriptions. Cheap to clone.
    pub fn handle(&self) -> SyncHandle {
        SyncHandle {
            store: self.store.clone(),
            reader: self.reader.clone(),
            updates: self.updates.clone(),
        }
    }

    /// Run the SyncHub until shutdown is signaled.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let SyncHub {
            store,
            mut reader,
            mut changes,
            updates,
        } = self;
        info!("SyncHub started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("SyncHub received shutdown signal");
                        break;
                    }
                }

                Some(published) = reader.next() => {
                    debug!(version = published.version, "Fanning out publication");
                    let _ = updates.send(SyncUpdate::Published(published));
                }

                changed = changes.recv() => match changed {
                    Ok(EntityChanged::Entity(EntityPath::Match(match_id))) => {
                        match store.get_match(match_id).await {
                            Ok(Some(record)) => {
                                let view = MatchView::from(&record);
                                let _ = updates.send(SyncUpdate::MatchChanged(Arc::new(view)));
                            }
                            Ok(None) => {
                                warn!(%match_id, "Announced match is gone");
                            }
                            Err(e) => {
                                warn!(%match_id, error = %e, "Failed to read announced match, asking subscribers to resync");
                                let _ = updates.send(SyncUpdate::Resync);
                            }
                        }
                    }
                    Ok(EntityChanged::Entity(_)) => {}
                    Ok(EntityChanged::Everything) => {
                        let _ = updates.send(SyncUpdate::Resync);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "SyncHub lagged behind the store, asking subscribers to resync");
                        let _ = updates.send(SyncUpdate::Resync);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Store change channel closed");
                        break;
                    }
                },
            }
        }

        info!("SyncHub shutdown complete");
    }
}

#[derive(Clone)]
pub struct SyncHandle {
    store: SharedStore,
    reader: PublishedReader,
    updates: SyncUpdateSender,
}

impl SyncHandle {
    /// Open a subscription and return it with the state it was primed from.
    pub async fn subscribe(&self) -> Result<(Subscription, InitialState), StoreError> {
        let mut subscription = Subscription {
            store: self.store.clone(),
            reader: self.reader.clone(),
            updates: self.updates.subscribe(),
            tracker: MatchTracker::new(),
            guard: FreshnessGuard::new(),
        };
        let initial = subscription.prime().await?;
        Ok((subscription, initial))
    }

    /// Latest publication, or `None` before the first pass.
    pub fn published(&self) -> Option<Arc<Published>> {
        self.reader.current()
    }
}

/// Full state a subscriber starts from, or falls back to after a resync.
#[derive(Debug, Clone)]
pub struct InitialState {
    pub matches: Vec<MatchView>,
    pub published: Option<Arc<Published>>,
}

/// What a subscriber should forward to its viewer.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Match {
        view: Arc<MatchView>,
        notification: Option<MatchNotification>,
    },
    Published(Arc<Published>),
    /// Diff state was rebuilt; the viewer should replace everything it holds.
    Resync(InitialState),
}

pub struct Subscription {
    store: SharedStore,
    reader: PublishedReader,
    updates: SyncUpdateReceiver,
    tracker: MatchTracker,
    guard: FreshnessGuard,
}

impl Subscription {
    /// Wait for the next event worth forwarding.
    ///
    /// Stale match revisions and stale publications are skipped. Returns
    /// `None` once the hub is gone.
    pub async fn next_event(&mut self) -> Option<Result<SyncEvent, StoreError>> {
        loop {
            let update = match self.updates.recv().await {
                Ok(update) => update,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Subscription lagged, resyncing");
                    SyncUpdate::Resync
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            };

            match update {
                SyncUpdate::MatchChanged(view) => {
                    if self
                        .tracker
                        .get(&view.id)
                        .is_some_and(|held| held.revision >= view.revision)
                    {
                        continue;
                    }
                    let notification = self.tracker.observe(view.as_ref().clone());
                    return Some(Ok(SyncEvent::Match { view, notification }));
                }
                SyncUpdate::Published(published) => {
                    if !self.guard.accept(published.calculated_at()) {
                        debug!(version = published.version, "Discarding stale publication");
                        continue;
                    }
                    return Some(Ok(SyncEvent::Published(published)));
                }
                SyncUpdate::Resync => {
                    return Some(self.prime().await.map(SyncEvent::Resync));
                }
            }
        }
    }

    /// Rebuild diff state from the store and the publisher without emitting
    /// notifications.
    async fn prime(&mut self) -> Result<InitialState, StoreError> {
        let matches: Vec<MatchView> = self
            .store
            .list_matches()
            .await?
            .iter()
            .map(MatchView::from)
            .collect();
        self.tracker.prime(matches.iter().cloned());

        let published = self
            .reader
            .current()
            .filter(|p| self.guard.accept(p.calculated_at()));
        Ok(InitialState { matches, published })
    }
}
