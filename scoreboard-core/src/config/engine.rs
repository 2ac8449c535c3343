use std::time::Duration;

/// Timing and retry settings of the recomputation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Window during which writes are coalesced into one pass, measured from
    /// the first write of a burst.
    pub debounce: Duration,
    /// Delay before a failed pass is retried.
    pub retry_interval: Duration,
    /// How often a match mutation re-reads and re-validates after losing a
    /// compare-and-swap race before giving up with a conflict.
    pub max_swap_retries: u32,
}

impl EngineConfig {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_SWAP_RETRIES: u32 = 5;
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: Self::DEFAULT_DEBOUNCE,
            retry_interval: Self::DEFAULT_RETRY_INTERVAL,
            max_swap_retries: Self::DEFAULT_MAX_SWAP_RETRIES,
        }
    }
}
