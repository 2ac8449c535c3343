//! Read-only client used by viewers and dashboards.

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::live::LiveFeed;
use super::{ClientError, parse_response};
use crate::objects::{Leaderboard, MatchView, StatsSummary};

/// Typed HTTP client for the public read API.
#[derive(Debug, Clone)]
pub struct ViewerClient {
    http: Client,
    base_url: Url,
}

impl ViewerClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/stats`
    pub async fn stats(&self) -> Result<StatsSummary, ClientError> {
        let url = self.base_url.join("/api/v1/stats")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/leaderboard`
    pub async fn leaderboard(&self) -> Result<Leaderboard, ClientError> {
        let url = self.base_url.join("/api/v1/leaderboard")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/matches`
    pub async fn matches(&self) -> Result<Vec<MatchView>, ClientError> {
        let url = self.base_url.join("/api/v1/matches")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/matches/{id}`
    pub async fn get_match(&self, id: Uuid) -> Result<MatchView, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/matches/{id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// Open the live feed (`GET /api/v1/ws`).
    pub async fn live(&self) -> Result<LiveFeed, ClientError> {
        let mut url = self.base_url.join("/api/v1/ws")?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(ClientError::UnsupportedScheme(other.to_owned())),
        };
        url.set_scheme(scheme)
            .map_err(|()| ClientError::UnsupportedScheme(scheme.to_owned()))?;
        LiveFeed::connect(&url).await
    }
}
