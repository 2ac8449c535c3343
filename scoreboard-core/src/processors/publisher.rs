//! ResultPublisher.
//!
//! Holds the current derived artifacts in a `watch` slot. A publication is
//! built completely in memory and swapped in with a single send, so readers
//! observe either the previous publication or the new one, never a mix of
//! the two.

use std::sync::Arc;

use scoreboard_sdk::objects::{CalculatedBy, Leaderboard, StatsSummary};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::info;

use crate::aggregate::{compute_stats, rank};
use crate::entities::Snapshot;

/// One consistent set of derived artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Starts at 1 and increases by one per publication.
    pub version: u64,
    pub stats: StatsSummary,
    pub leaderboard: Leaderboard,
}

impl Published {
    pub fn calculated_at(&self) -> OffsetDateTime {
        self.stats.last_calculated
    }

    pub fn calculated_by(&self) -> CalculatedBy {
        self.stats.calculated_by
    }
}

/// The single writer of derived artifacts.
///
/// `publish` takes `&mut self`, so there is exactly one publishing task.
pub struct ResultPublisher {
    slot: watch::Sender<Option<Arc<Published>>>,
}

impl ResultPublisher {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    pub fn reader(&self) -> PublishedReader {
        PublishedReader {
            rx: self.slot.subscribe(),
        }
    }

    /// Compute both artifacts from `snapshot` and make them visible.
    ///
    /// `calculated_at` never goes backwards across publications even if the
    /// wall clock does.
    pub fn publish(
        &mut self,
        snapshot: &Snapshot,
        calculated_by: CalculatedBy,
        now: OffsetDateTime,
    ) -> Arc<Published> {
        let prev = self.slot.borrow().clone();
        let (version, calculated_at) = match prev {
            Some(prev) => (prev.version + 1, now.max(prev.calculated_at())),
            None => (1, now),
        };
        let published = Arc::new(Published {
            version,
            stats: compute_stats(snapshot, calculated_at, calculated_by),
            leaderboard: rank(snapshot, calculated_at),
        });
        self.slot.send_replace(Some(published.clone()));

        info!(
            version = published.version,
            calculated_by = %calculated_by,
            universities = published.leaderboard.entries.len(),
            is_live = published.leaderboard.is_live,
            "Published derived artifacts"
        );
        published
    }
}

impl Default for ResultPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read handle on the latest publication.
#[derive(Clone)]
pub struct PublishedReader {
    rx: watch::Receiver<Option<Arc<Published>>>,
}

impl PublishedReader {
    /// Latest publication, or `None` before the first pass completed.
    pub fn current(&self) -> Option<Arc<Published>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next publication and return it.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<Arc<Published>> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::university;
    use crate::entities::CompetingStatus;
    use time::Duration;

    fn snapshot() -> Snapshot {
        Snapshot {
            universities: vec![
                university(1, "Alpha", 9, CompetingStatus::Competing),
                university(2, "Beta", 9, CompetingStatus::Competing),
                university(3, "Gamma", 3, CompetingStatus::Affiliated),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_before_first_publication() {
        let publisher = ResultPublisher::new();
        assert!(publisher.reader().current().is_none());
    }

    #[test]
    fn test_publication_replaces_both_artifacts() {
        let mut publisher = ResultPublisher::new();
        let reader = publisher.reader();
        let now = OffsetDateTime::UNIX_EPOCH + Duration::hours(1);

        let first = publisher.publish(&snapshot(), CalculatedBy::ScheduledTrigger, now);
        assert_eq!(first.version, 1);
        assert_eq!(first.stats.total_points, 18);
        assert_eq!(first.stats.total_universities, 2);
        assert_eq!(first.leaderboard.last_updated, now);
        assert_eq!(reader.current(), Some(first));
    }

    #[test]
    fn test_calculated_at_never_goes_backwards() {
        let mut publisher = ResultPublisher::new();
        let later = OffsetDateTime::UNIX_EPOCH + Duration::hours(2);
        let earlier = OffsetDateTime::UNIX_EPOCH + Duration::hours(1);

        publisher.publish(&snapshot(), CalculatedBy::ScheduledTrigger, later);
        let second = publisher.publish(&snapshot(), CalculatedBy::ManualTrigger, earlier);
        assert_eq!(second.version, 2);
        assert_eq!(second.calculated_at(), later);
        assert_eq!(second.leaderboard.last_updated, later);
        assert_eq!(second.calculated_by(), CalculatedBy::ManualTrigger);
    }

    #[tokio::test]
    async fn test_reader_wakes_on_publication() {
        let mut publisher = ResultPublisher::new();
        let mut reader = publisher.reader();
        let handle = tokio::spawn(async move { reader.next().await });
        tokio::task::yield_now().await;

        publisher.publish(
            &snapshot(),
            CalculatedBy::ScheduledTrigger,
            OffsetDateTime::UNIX_EPOCH,
        );
        let seen = handle.await.unwrap().unwrap();
        assert_eq!(seen.version, 1);
    }
}
