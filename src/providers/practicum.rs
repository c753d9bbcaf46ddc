use crate::core::error::FetchError;
use crate::core::models::SubmissionRecord;
use crate::providers::StatusSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    homeworks: Vec<SubmissionRecord>,
    #[serde(default)]
    current_date: Option<i64>,
}

pub struct PracticumProvider {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumProvider {
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl StatusSource for PracticumProvider {
    fn name(&self) -> &'static str {
        "Practicum"
    }

    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<SubmissionRecord>, FetchError> {
        let from_date = since.min(Utc::now()).timestamp();

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport(format!("{status} - {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {e}")))?;

        let parsed: StatusResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        tracing::debug!(
            from_date,
            count = parsed.homeworks.len(),
            current_date = ?parsed.current_date,
            "Fetched homework statuses"
        );

        Ok(parsed.homeworks)
    }
}
