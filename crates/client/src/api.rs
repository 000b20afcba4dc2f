use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use storage::{
    dto::{
        participant::CreateParticipantRequest,
        score::{EventInfo, ListScoresParams, ParticipantSummary, SummaryParams, UpsertScoreRequest},
    },
    models::{Participant, Score},
};

use crate::error::{ClientError, Result};
use crate::traits::ScoreApi;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the tracker's JSON API.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    details: Vec<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if response.status().is_success() {
            return Ok(response.json::<T>().await?);
        }

        Err(Self::into_error(response).await)
    }

    async fn into_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        error_for_status(status, body)
    }

    /// Per-participant totals and averages computed by the server
    pub async fn summary(&self, params: &SummaryParams) -> Result<Vec<ParticipantSummary>> {
        let response = self
            .client
            .get(self.url("/api/scores/summary"))
            .query(params)
            .send()
            .await?;

        Self::parse(response).await
    }

    pub async fn list_events(&self) -> Result<Vec<EventInfo>> {
        let response = self.client.get(self.url("/api/events")).send().await?;
        Self::parse(response).await
    }
}

fn error_for_status(status: StatusCode, body: ErrorBody) -> ClientError {
    let message = if body.details.is_empty() {
        body.error
    } else {
        body.details.join("; ")
    };

    match status {
        StatusCode::BAD_REQUEST => ClientError::ValidationError(message),
        StatusCode::NOT_FOUND => ClientError::NotFoundError(message),
        StatusCode::CONFLICT => ClientError::ConflictError(message),
        _ => ClientError::ServerError {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ScoreApi for ApiClient {
    async fn list_participants(&self) -> Result<Vec<Participant>> {
        let response = self.client.get(self.url("/api/participants")).send().await?;
        Self::parse(response).await
    }

    async fn add_participant(&self, request: &CreateParticipantRequest) -> Result<Participant> {
        let response = self
            .client
            .post(self.url("/api/participants"))
            .json(request)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn remove_participant(&self, id: i32) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/participants/{}", id)))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::into_error(response).await)
        }
    }

    async fn upsert_score(&self, request: &UpsertScoreRequest) -> Result<Score> {
        let response = self
            .client
            .put(self.url("/api/scores"))
            .json(request)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn list_scores(&self, participant_id: Option<i32>) -> Result<Vec<Score>> {
        let response = self
            .client
            .get(self.url("/api/scores"))
            .query(&ListScoresParams { participant_id })
            .send()
            .await?;

        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(error: &str, details: &[&str]) -> ErrorBody {
        ErrorBody {
            error: error.to_string(),
            details: details.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_status_maps_to_error_kind() {
        assert!(matches!(
            error_for_status(StatusCode::CONFLICT, body("Email 'a@b.c' is already registered", &[])),
            ClientError::ConflictError(msg) if msg.contains("already registered")
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, body("Participant 9 does not exist", &[])),
            ClientError::NotFoundError(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::SERVICE_UNAVAILABLE, ErrorBody::default()),
            ClientError::ServerError { status: 503, .. }
        ));
    }

    #[test]
    fn test_validation_details_are_joined() {
        let error = error_for_status(
            StatusCode::BAD_REQUEST,
            body("Validation failed", &["name: required", "email: invalid"]),
        );

        assert!(matches!(
            error,
            ClientError::ValidationError(msg) if msg == "name: required; email: invalid"
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_ignored() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.url("/api/events"), "http://localhost:8080/api/events");
    }
}
