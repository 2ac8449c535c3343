use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use scoreboard_core::processors::{InitialState, SyncEvent};
use scoreboard_sdk::objects::ws::{WsCloseCode, WsServerMessage};

use crate::state::AppState;

/// `GET /ws`: live feed.
///
/// Upgrades the HTTP connection to a WebSocket and pushes
/// [`WsServerMessage`] JSON frames. The first frame is always a full
/// snapshot; match updates, notifications and standings follow.
pub(super) async fn live_ws(state: State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let app_state = state.0.clone();
    ws.on_upgrade(move |socket| handle_live_ws(socket, app_state))
}

fn snapshot_message(initial: InitialState) -> WsServerMessage {
    let (stats, leaderboard) = match initial.published {
        Some(p) => (Some(p.stats.clone()), Some(p.leaderboard.clone())),
        None => (None, None),
    };
    WsServerMessage::Snapshot {
        matches: initial.matches,
        stats,
        leaderboard,
    }
}

/// Background task that drives a single WebSocket connection.
///
/// Each connection owns its own [`Subscription`](scoreboard_core::processors::Subscription),
/// so notifications are derived from what this viewer has already seen.
async fn handle_live_ws(mut socket: WebSocket, state: AppState) {
    let mut shutdown_rx = state.shutdown_rx.clone();

    let (mut subscription, initial) = match state.sync.subscribe().await {
        Ok(opened) => opened,
        Err(e) => {
            tracing::error!(error = %e, "WS: failed to prime subscription");
            close_with_error(&mut socket, WsCloseCode::INTERNAL_ERROR, "internal error").await;
            return;
        }
    };
    if send_json(&mut socket, &snapshot_message(initial)).await.is_err() {
        return;
    }
    tracing::debug!("WS: viewer connected");

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    let _ = socket
                        .send(Message::Close(Some(CloseFrame {
                            code: WsCloseCode::GOING_AWAY,
                            reason: "server shutting down".into(),
                        })))
                        .await;
                    return;
                }
            }

            event = subscription.next_event() => {
                let frames = match event {
                    Some(Ok(SyncEvent::Match { view, notification })) => {
                        let mut frames = vec![WsServerMessage::MatchUpdate {
                            match_view: view.as_ref().clone(),
                        }];
                        if let Some(notification) = notification {
                            frames.push(WsServerMessage::Notification { notification });
                        }
                        frames
                    }
                    Some(Ok(SyncEvent::Published(published))) => {
                        vec![WsServerMessage::Standings {
                            stats: published.stats.clone(),
                            leaderboard: published.leaderboard.clone(),
                        }]
                    }
                    Some(Ok(SyncEvent::Resync(initial))) => {
                        tracing::debug!("WS: resyncing viewer");
                        vec![snapshot_message(initial)]
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WS: failed to resync subscription");
                        close_with_error(&mut socket, WsCloseCode::INTERNAL_ERROR, "internal error").await;
                        return;
                    }
                    None => break,
                };
                for frame in &frames {
                    if send_json(&mut socket, frame).await.is_err() {
                        return;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => {
                        return;
                    }
                }
            }
        }
    }

    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: WsCloseCode::NORMAL,
            reason: "feed ended".into(),
        })))
        .await;
}

async fn close_with_error(socket: &mut WebSocket, code: u16, reason: &str) {
    let _ = send_json(
        socket,
        &WsServerMessage::Error {
            code,
            reason: reason.to_string(),
        },
    )
    .await;
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.to_string().into(),
        })))
        .await;
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
