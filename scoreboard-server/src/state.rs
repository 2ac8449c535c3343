//! Application state shared across all request handlers.

use scoreboard_core::config::{ConfigStore, EngineConfig};
use scoreboard_core::live::LiveMatchService;
use scoreboard_core::processors::{
    ChangeListener, PublishedReader, RecomputeTrigger, ResultPublisher, SyncHandle, SyncHub,
};
use scoreboard_core::store::SharedStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// The only path through which matches are written.
    pub live: LiveMatchService,
    pub published: PublishedReader,
    pub trigger: RecomputeTrigger,
    pub sync: SyncHandle,
    /// Flips to `true` when the server starts shutting down.
    pub shutdown_rx: watch::Receiver<bool>,
}

impl AppState {
    /// Wire the engine around `store` and spawn its processors.
    ///
    /// Returns the state and the handles of the spawned processors, which
    /// finish once `shutdown_rx` flips to `true`.
    pub fn start(
        store: SharedStore,
        engine_config: ConfigStore<EngineConfig>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (listener, trigger) = ChangeListener::new(store.clone(), ResultPublisher::new());
        let published = listener.reader();
        let hub = SyncHub::new(store.clone(), published.clone());
        let sync = hub.handle();

        let handles = vec![
            tokio::spawn(listener.run(
                shutdown_rx.clone(),
                engine_config.clone(),
                engine_config.subscribe(),
            )),
            tokio::spawn(hub.run(shutdown_rx.clone())),
        ];

        let state = Self {
            live: LiveMatchService::new(store.clone(), engine_config),
            store,
            published,
            trigger,
            sync,
            shutdown_rx,
        };
        (state, handles)
    }
}
