//! Embedding gateway over the Hugging Face Inference API.
//!
//! Turns raw text into a fixed-dimension vector. The remote model may
//! answer with a pooled sentence vector or with token-level output;
//! [`normalize`] collapses both shapes into one vector and rejects
//! everything else. No retries here: retry policy, if ever added,
//! belongs to the orchestrator.

use async_trait::async_trait;
use log::debug;
use memoir_core::{PipelineError, TextEmbedder};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Default inference endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Embedding calls are cheap; time out well before generation does.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for a hosted sentence-embedding model.
pub struct HfEmbeddingClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HfEmbeddingClient {
    /// Build a client for `model` under the default endpoint.
    pub fn new(model: &str, token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, model, token)
    }

    /// Build a client against a custom endpoint (used by tests and
    /// self-hosted inference deployments).
    pub fn with_base_url(base_url: &str, model: &str, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: format!("{}/{model}", base_url.trim_end_matches('/')),
            token,
        }
    }
}

#[async_trait]
impl TextEmbedder for HfEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let mut request = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| PipelineError::RemoteUnavailable {
                gateway: "embedding",
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::RemoteUnavailable {
                gateway: "embedding",
                message: format!("status {status}"),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| PipelineError::RemoteMalformedResponse {
                gateway: "embedding",
                message: err.to_string(),
            })?;
        let vector = normalize(body)?;
        debug!("embedded text (chars={}, dim={})", text.len(), vector.len());
        Ok(vector)
    }
}

/// The shapes an embedding model is known to answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingPayload {
    /// Already a pooled sentence vector.
    Pooled(Vec<f32>),
    /// Token-level output; the first row is the pooled vector.
    TokenLevel(Vec<Vec<f32>>),
}

/// Collapse a raw response into a single vector.
pub fn normalize(body: Value) -> Result<Vec<f32>, PipelineError> {
    let payload: EmbeddingPayload =
        serde_json::from_value(body).map_err(|err| PipelineError::RemoteMalformedResponse {
            gateway: "embedding",
            message: format!("expected a vector or nested vector list: {err}"),
        })?;
    match payload {
        EmbeddingPayload::Pooled(vector) => Ok(vector),
        EmbeddingPayload::TokenLevel(rows) => {
            rows.into_iter()
                .next()
                .ok_or_else(|| PipelineError::RemoteMalformedResponse {
                    gateway: "embedding",
                    message: "token-level response with no rows".to_string(),
                })
        }
    }
}
