//! WebSocket live-feed consumer.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::ClientError;
use crate::objects::{Leaderboard, MatchView, StatsSummary, WsServerMessage};
use crate::sync::{FreshnessGuard, MatchNotification};

/// An event surfaced by [`LiveFeed::next_event`].
#[derive(Debug, Clone)]
pub enum LiveEvent {
    Snapshot {
        matches: Vec<MatchView>,
        stats: Option<StatsSummary>,
        leaderboard: Option<Leaderboard>,
    },
    MatchUpdate(MatchView),
    Notification(MatchNotification),
    Standings {
        stats: StatsSummary,
        leaderboard: Leaderboard,
    },
}

/// A connected live feed.
///
/// Standings older than the newest already surfaced are dropped, so a
/// consumer that keeps one `LiveFeed` (or carries its guard across
/// reconnects with [`LiveFeed::with_guard`]) never regresses.
pub struct LiveFeed {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    guard: FreshnessGuard,
}

impl LiveFeed {
    pub async fn connect(url: &Url) -> Result<Self, ClientError> {
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(Self {
            stream,
            guard: FreshnessGuard::new(),
        })
    }

    /// Continue from a guard kept by a previous connection.
    pub fn with_guard(mut self, guard: FreshnessGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> FreshnessGuard {
        self.guard
    }

    /// Wait for the next event. Returns `None` once the server closes the
    /// connection.
    pub async fn next_event(&mut self) -> Option<Result<LiveEvent, ClientError>> {
        while let Some(frame) = self.stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            };
            let message: WsServerMessage = match serde_json::from_str(&text) {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };
            if let Some(event) = self.accept(message) {
                return Some(event);
            }
        }
        None
    }

    fn accept(&mut self, message: WsServerMessage) -> Option<Result<LiveEvent, ClientError>> {
        let event = match message {
            WsServerMessage::Snapshot {
                matches,
                stats,
                leaderboard,
            } => {
                let fresh = stats
                    .as_ref()
                    .is_some_and(|s| self.guard.accept(s.last_calculated));
                let (stats, leaderboard) = if fresh {
                    (stats, leaderboard)
                } else {
                    (None, None)
                };
                LiveEvent::Snapshot {
                    matches,
                    stats,
                    leaderboard,
                }
            }
            WsServerMessage::MatchUpdate { match_view } => LiveEvent::MatchUpdate(match_view),
            WsServerMessage::Notification { notification } => {
                LiveEvent::Notification(notification)
            }
            WsServerMessage::Standings { stats, leaderboard } => {
                if !self.guard.accept(stats.last_calculated) {
                    tracing::debug!(
                        calculated_at = %stats.last_calculated,
                        "Dropping stale standings frame"
                    );
                    return None;
                }
                LiveEvent::Standings { stats, leaderboard }
            }
            WsServerMessage::Error { code, reason } => {
                return Some(Err(ClientError::Feed { code, reason }));
            }
        };
        Some(Ok(event))
    }
}
