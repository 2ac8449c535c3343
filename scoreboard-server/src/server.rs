//! Axum server setup and router configuration.

use crate::api;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use axum::{Json, Router, response::IntoResponse, routing::get};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .nest("/api/v1", api::router())
        // Add state to all routes
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Whether at least one recomputation pass has been published.
    standings_ready: bool,
}

/// Simple health check - returns OK if the server is running.
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        standings_ready: state.published.current().is_some(),
    })
}

/// Run the server with graceful shutdown support.
///
/// On SIGTERM/SIGINT, `shutdown_tx` is flipped so that processors and live
/// feeds wind down together with the HTTP server.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use scoreboard_core::config::{ConfigStore, EngineConfig};
    use scoreboard_core::store::MemoryStore;
    use scoreboard_sdk::objects::{
        CalculatedBy, Leaderboard, MatchStatus, MatchView, RecomputeResponse, StatsSummary,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        state: AppState,
        _shutdown_tx: watch::Sender<bool>,
    }

    fn app() -> TestApp {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state, _handles) = AppState::start(
            Arc::new(MemoryStore::new()),
            ConfigStore::new(EngineConfig::default()),
            shutdown_rx,
        );
        TestApp {
            router: build_router(state.clone()),
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    async fn call(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn put_university(app: &TestApp, id: u128, name: &str, points: i64, status: &str) {
        let (code, _) = call(
            app,
            "PUT",
            &format!("/api/v1/admin/universities/{}", Uuid::from_u128(id)),
            Some(json!({ "name": name, "zone": "north", "points": points, "status": status })),
        )
        .await;
        assert_eq!(code, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_recompute_then_read_standings() {
        let app = app();
        put_university(&app, 1, "Alpha", 9, "competing").await;
        put_university(&app, 2, "Beta", 9, "competing").await;
        put_university(&app, 3, "Gamma", 3, "affiliated").await;

        let (status, body) = call(&app, "POST", "/api/v1/admin/recompute", None).await;
        assert_eq!(status, StatusCode::OK);
        let report: RecomputeResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.calculated_by, CalculatedBy::ManualTrigger);

        let (status, body) = call(&app, "GET", "/api/v1/leaderboard", None).await;
        assert_eq!(status, StatusCode::OK);
        let board: Leaderboard = serde_json::from_slice(&body).unwrap();
        let ranked: Vec<(Uuid, u32)> = board.entries.iter().map(|e| (e.id, e.position)).collect();
        assert_eq!(
            ranked,
            vec![(Uuid::from_u128(1), 1), (Uuid::from_u128(2), 2)]
        );

        let (status, body) = call(&app, "GET", "/api/v1/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        let stats: StatsSummary = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats.total_points, 18);
        assert_eq!(stats.total_universities, 2);
        assert!(stats.last_calculated >= report.calculated_at);
    }

    #[tokio::test]
    async fn test_match_lifecycle_over_http() {
        let app = app();
        put_university(&app, 1, "Alpha", 0, "competing").await;
        put_university(&app, 2, "Beta", 0, "competing").await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/admin/matches",
            Some(json!({
                "teamA": Uuid::from_u128(1),
                "teamB": Uuid::from_u128(2),
                "sport": "football",
                "zone": "north-east",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: MatchView = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.status, MatchStatus::Scheduled);

        let status_uri = format!("/api/v1/admin/matches/{}/status", created.id);
        let (status, _) = call(&app, "POST", &status_uri, Some(json!({ "status": "completed" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, "POST", &status_uri, Some(json!({ "status": "live" }))).await;
        assert_eq!(status, StatusCode::OK);

        let score_uri = format!("/api/v1/admin/matches/{}/score", created.id);
        let (status, body) = call(&app, "POST", &score_uri, Some(json!({ "scoreA": 2, "scoreB": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
        let scored: MatchView = serde_json::from_slice(&body).unwrap();
        assert_eq!((scored.score_a, scored.score_b), (2, 1));

        let (status, body) = call(&app, "GET", &format!("/api/v1/matches/{}", created.id), None).await;
        assert_eq!(status, StatusCode::OK);
        let fetched: MatchView = serde_json::from_slice(&body).unwrap();
        assert_eq!(fetched, scored);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = app();
        put_university(&app, 1, "Alpha", 0, "competing").await;

        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/admin/matches",
            Some(json!({
                "teamA": Uuid::from_u128(1),
                "teamB": Uuid::from_u128(1),
                "sport": "football",
                "zone": "north",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let ghost = Uuid::from_u128(404);
        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/v1/admin/matches/{ghost}/score"),
            Some(json!({ "scoreA": 1, "scoreB": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "GET", &format!("/api/v1/matches/{ghost}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            "PUT",
            &format!("/api/v1/admin/players/{}", Uuid::from_u128(50)),
            Some(json!({ "universityId": ghost, "status": "active" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_standings_appear_after_first_pass() {
        let app = app();
        let mut reader = app.state.published.clone();
        if reader.current().is_none() {
            reader.next().await.unwrap();
        }
        let (status, _) = call(&app, "GET", "/api/v1/stats", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
