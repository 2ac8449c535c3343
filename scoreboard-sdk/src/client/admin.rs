//! Admin API client (tournament backoffice → Scoreboard server).

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, expect_success, parse_response};
use crate::objects::{
    CreateMatchRequest, MatchStatus, MatchView, PlayerUpsert, RecomputeResponse,
    TransitionRequest, UniversityUpsert, UpdateScoreRequest,
};

/// Typed HTTP client for the admin mutation API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
}

impl AdminClient {
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

    /// `POST /api/v1/admin/matches` – schedule a new match.
    pub async fn create_match(&self, request: &CreateMatchRequest) -> Result<MatchView, ClientError> {
        let url = self.base_url.join("/api/v1/admin/matches")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/admin/matches/{id}/score`
    pub async fn update_score(
        &self,
        match_id: Uuid,
        score_a: u32,
        score_b: u32,
    ) -> Result<MatchView, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/admin/matches/{match_id}/score"))?;
        let resp = self
            .http
            .post(url)
            .json(&UpdateScoreRequest { score_a, score_b })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/admin/matches/{id}/status`
    pub async fn transition(
        &self,
        match_id: Uuid,
        status: MatchStatus,
    ) -> Result<MatchView, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/admin/matches/{match_id}/status"))?;
        let resp = self
            .http
            .post(url)
            .json(&TransitionRequest { status })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /api/v1/admin/matches/{id}/reopen` – admin override for a
    /// completed match.
    pub async fn reopen(&self, match_id: Uuid) -> Result<MatchView, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/admin/matches/{match_id}/reopen"))?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }

    /// `PUT /api/v1/admin/universities/{id}`
    pub async fn put_university(
        &self,
        id: Uuid,
        university: &UniversityUpsert,
    ) -> Result<(), ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/admin/universities/{id}"))?;
        let resp = self.http.put(url).json(university).send().await?;
        expect_success(resp).await
    }

    /// `PUT /api/v1/admin/players/{id}`
    pub async fn put_player(&self, id: Uuid, player: &PlayerUpsert) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!("/api/v1/admin/players/{id}"))?;
        let resp = self.http.put(url).json(player).send().await?;
        expect_success(resp).await
    }

    /// `POST /api/v1/admin/recompute` – force one recomputation pass.
    pub async fn recompute(&self) -> Result<RecomputeResponse, ClientError> {
        let url = self.base_url.join("/api/v1/admin/recompute")?;
        let resp = self.http.post(url).send().await?;
        parse_response(resp).await
    }
}
