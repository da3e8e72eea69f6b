//! HTTP client for the submission store

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url, multipart};
use serde::de::DeserializeOwned;
use std::time::Duration;

use shared::{
    ClientConfig, ErrorDetail, LeaderboardEntry, ProcessId, Submission, UploadReceipt, UserIdentity, process_debug,
    process_warn,
};
use crate::error::{ClientError, ClientResult};
use crate::traits::SubmissionStore;
use crate::types::Artifact;

/// Real store client over reqwest
#[derive(Debug, Clone)]
pub struct HttpSubmissionStore {
    client: Client,
    base_url: String,
}

impl HttpSubmissionStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/submissions/<id>` with the id encoded as a single path segment
    fn submission_url(&self, id: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid store URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("Store URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["submissions", id]);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<Response> {
        request.send().await.map_err(|e| {
            process_warn!(ProcessId::current(), "🔌 Store request failed: {}", e);
            ClientError::network()
        })
    }

    /// Decode a 2xx body; anything that does not match the strict record
    /// shape is an `InvalidRecord`
    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let body = response.text().await.map_err(|e| {
            process_warn!(ProcessId::current(), "🔌 Failed to read store response: {}", e);
            ClientError::network()
        })?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidRecord(e.to_string()))
    }

    /// Map a non-2xx response to `Server`, surfacing `detail` verbatim
    async fn failure(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let detail = response.json::<ErrorDetail>().await.ok().map(|body| body.detail);
        ClientError::server(status, detail)
    }
}

#[async_trait]
impl SubmissionStore for HttpSubmissionStore {
    async fn upload(&self, artifact: &Artifact, owner: &UserIdentity) -> ClientResult<UploadReceipt> {
        let part = multipart::Part::bytes(artifact.bytes.clone()).file_name(artifact.file_name.clone());
        let form = multipart::Form::new()
            .part("file", part)
            .text("userId", owner.uid.clone())
            .text("userName", owner.owner_name().to_string());

        process_debug!(
            ProcessId::current(),
            "📤 Uploading {} ({} bytes)",
            artifact.file_name,
            artifact.size()
        );
        let response = self.send(self.client.post(self.url("/submit")).multipart(form)).await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::failure(response).await)
        }
    }

    async fn fetch_submission(&self, id: &str) -> ClientResult<Submission> {
        // Dot segments would be dropped from the URL path
        if matches!(id, "" | "." | "..") {
            return Err(ClientError::not_found(id));
        }

        let response = self.send(self.client.get(self.submission_url(id)?)).await?;

        match response.status() {
            status if status.is_success() => Self::decode(response).await,
            StatusCode::NOT_FOUND => Err(ClientError::not_found(id)),
            _ => Err(Self::failure(response).await),
        }
    }

    async fn list_leaderboard(&self) -> ClientResult<Vec<LeaderboardEntry>> {
        let response = self.send(self.client.get(self.url("/leaderboard"))).await?;

        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::failure(response).await)
        }
    }
}
