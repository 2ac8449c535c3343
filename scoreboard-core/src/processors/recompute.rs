//! One recomputation pass: load a full snapshot, derive, publish.

use scoreboard_sdk::objects::{CalculatedBy, RecomputeResponse};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::processors::publisher::{PublishedReader, ResultPublisher};
use crate::store::{EntityStore, SharedStore, StoreError};

/// Why a pass published nothing.
#[derive(Debug, Error)]
pub enum RecomputeFailure {
    #[error("failed to load snapshot: {0}")]
    Snapshot(#[from] StoreError),

    /// The change listener is not running, so no pass can be served.
    #[error("recomputation engine is not running")]
    EngineStopped,
}

/// Outcome of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub version: u64,
    pub calculated_at: OffsetDateTime,
    pub calculated_by: CalculatedBy,
}

impl From<PassReport> for RecomputeResponse {
    fn from(report: PassReport) -> Self {
        RecomputeResponse {
            version: report.version,
            calculated_at: report.calculated_at,
            calculated_by: report.calculated_by,
        }
    }
}

pub struct RecomputePipeline {
    store: SharedStore,
    publisher: ResultPublisher,
}

impl RecomputePipeline {
    pub fn new(store: SharedStore, publisher: ResultPublisher) -> Self {
        Self { store, publisher }
    }

    pub fn reader(&self) -> PublishedReader {
        self.publisher.reader()
    }

    /// Run one pass. A snapshot that cannot be loaded leaves the previous
    /// publication in place.
    #[instrument(skip(self), err)]
    pub async fn run_pass(
        &mut self,
        calculated_by: CalculatedBy,
    ) -> Result<PassReport, RecomputeFailure> {
        let snapshot = self.store.load_snapshot().await?;
        debug!(
            universities = snapshot.universities.len(),
            matches = snapshot.matches.len(),
            players = snapshot.players.len(),
            "Loaded snapshot"
        );
        let published = self
            .publisher
            .publish(&snapshot, calculated_by, OffsetDateTime::now_utc());
        Ok(PassReport {
            version: published.version,
            calculated_at: published.calculated_at(),
            calculated_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::university;
    use crate::entities::CompetingStatus;
    use crate::store::{EntityStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pass_publishes_current_snapshot() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_university(university(1, "Alpha", 9, CompetingStatus::Competing))
            .await
            .unwrap();
        let mut pipeline = RecomputePipeline::new(store.clone(), ResultPublisher::new());
        let reader = pipeline.reader();

        let report = pipeline.run_pass(CalculatedBy::ManualTrigger).await.unwrap();
        assert_eq!(report.version, 1);
        assert_eq!(report.calculated_by, CalculatedBy::ManualTrigger);

        let published = reader.current().unwrap();
        assert_eq!(published.calculated_at(), report.calculated_at);
        assert_eq!(published.stats.total_points, 9);

        store
            .put_university(university(2, "Beta", 4, CompetingStatus::Competing))
            .await
            .unwrap();
        let again = pipeline.run_pass(CalculatedBy::ScheduledTrigger).await.unwrap();
        assert_eq!(again.version, 2);
        assert!(again.calculated_at >= report.calculated_at);
        assert_eq!(reader.current().unwrap().stats.total_points, 13);
    }
}
