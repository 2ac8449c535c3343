//! ChangeListener processor.
//!
//! The ChangeListener is responsible for:
//! - Observing the store's change channel for every entity write
//! - Coalescing bursts of writes into one recomputation pass per debounce
//!   window
//! - Serving manual recompute requests outside the debounce window
//! - Retrying failed passes without losing the dirty state
//!
//! Every observed write bumps `dirty_version`. A pass remembers the version it
//! started from; state is clean once a pass that started at the current
//! `dirty_version` succeeds. Passes run inline in the loop, so at most one is
//! ever in flight.

use scoreboard_sdk::objects::CalculatedBy;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigStore, ConfigWatcher, EngineConfig};
use crate::events::{
    EntityChangedReceiver, RecomputeRequest, RecomputeRequestReceiver, RecomputeRequestSender,
    recompute_request_channel,
};
use crate::processors::publisher::{PublishedReader, ResultPublisher};
use crate::processors::recompute::{PassReport, RecomputeFailure, RecomputePipeline};
use crate::store::{EntityStore, SharedStore};

/// Handle for forcing a pass outside the debounce window.
#[derive(Clone)]
pub struct RecomputeTrigger {
    request_tx: RecomputeRequestSender,
}

impl RecomputeTrigger {
    /// Run one pass tagged `manual-trigger` and wait for its outcome.
    pub async fn trigger(&self) -> Result<PassReport, RecomputeFailure> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let request = RecomputeRequest {
            provenance: CalculatedBy::ManualTrigger,
            reply: Some(reply_tx),
        };
        self.request_tx
            .send(request)
            .await
            .map_err(|_| RecomputeFailure::EngineStopped)?;
        reply_rx.await.map_err(|_| RecomputeFailure::EngineStopped)?
    }
}

pub struct ChangeListener {
    pipeline: RecomputePipeline,
    changes: EntityChangedReceiver,
    requests: RecomputeRequestReceiver,
}

impl ChangeListener {
    /// Subscribe to `store` and wire up the manual trigger.
    ///
    /// The subscription is taken here, so every write accepted after `new`
    /// returns is observed even if `run` starts later.
    pub fn new(store: SharedStore, publisher: ResultPublisher) -> (Self, RecomputeTrigger) {
        let changes = store.subscribe();
        let (request_tx, requests) = recompute_request_channel();
        let listener = Self {
            pipeline: RecomputePipeline::new(store, publisher),
            changes,
            requests,
        };
        (listener, RecomputeTrigger { request_tx })
    }

    pub fn reader(&self) -> PublishedReader {
        self.pipeline.reader()
    }

    /// Run until shutdown is signaled or the store goes away.
    ///
    /// The first pass runs right away so that readers get artifacts without
    /// waiting for a write.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        config_store: ConfigStore<EngineConfig>,
        mut config_watcher: ConfigWatcher,
    ) {
        let ChangeListener {
            mut pipeline,
            mut changes,
            mut requests,
        } = self;

        let mut config = config_store.current().await;
        let mut dirty_version: u64 = 1;
        let mut processed: u64 = 0;
        let mut deadline = Some(Instant::now());
        info!(
            debounce_ms = config.debounce.as_millis() as u64,
            retry_interval_ms = config.retry_interval.as_millis() as u64,
            "ChangeListener started"
        );

        loop {
            let wake = deadline;
            let due = async move {
                match wake {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("ChangeListener received shutdown signal");
                        break;
                    }
                }

                Ok(()) = config_watcher.changed() => {
                    config = config_store.current().await;
                    info!(
                        version = config_watcher.seen_version(),
                        debounce_ms = config.debounce.as_millis() as u64,
                        "ChangeListener picked up new engine config"
                    );
                }

                changed = changes.recv() => match changed {
                    Ok(event) => {
                        dirty_version += 1;
                        debug!(?event, dirty_version, "Entity changed");
                        deadline.get_or_insert_with(|| Instant::now() + config.debounce);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        dirty_version += 1;
                        warn!(skipped, "Change subscription lagged, treating state as dirty");
                        deadline.get_or_insert_with(|| Instant::now() + config.debounce);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Store change channel closed");
                        break;
                    }
                },

                Some(request) = requests.recv() => {
                    let started = dirty_version;
                    let result = pipeline.run_pass(request.provenance).await;
                    let ok = result.is_ok();
                    if ok {
                        processed = started;
                    }
                    if let Some(reply) = request.reply {
                        let _ = reply.send(result);
                    }
                    deadline = Self::rearm(&mut changes, &mut dirty_version, processed, ok, &config);
                }

                _ = due => {
                    let started = dirty_version;
                    let ok = match pipeline.run_pass(CalculatedBy::ScheduledTrigger).await {
                        Ok(report) => {
                            processed = started;
                            debug!(version = report.version, dirty_version = started, "Scheduled pass complete");
                            true
                        }
                        Err(e) => {
                            error!(
                                error = %e,
                                retry_in_ms = config.retry_interval.as_millis() as u64,
                                "Recomputation pass failed, keeping state dirty"
                            );
                            false
                        }
                    };
                    deadline = Self::rearm(&mut changes, &mut dirty_version, processed, ok, &config);
                }
            }
        }

        info!("ChangeListener shutdown complete");
    }

    /// Decide when the next pass is due after one finished.
    ///
    /// Writes that arrived while the pass ran are drained first; if any are
    /// pending the follow-up pass is due immediately (or after the retry
    /// interval when the pass failed).
    fn rearm(
        changes: &mut EntityChangedReceiver,
        dirty_version: &mut u64,
        processed: u64,
        last_ok: bool,
        config: &EngineConfig,
    ) -> Option<Instant> {
        loop {
            match changes.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => *dirty_version += 1,
                Err(_) => break,
            }
        }

        if *dirty_version == processed {
            return None;
        }
        let delay = if last_ok {
            Duration::ZERO
        } else {
            config.retry_interval
        };
        Some(Instant::now() + delay)
    }
}
