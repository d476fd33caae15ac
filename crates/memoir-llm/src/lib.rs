//! Generation gateway over the Hugging Face Inference API.
//!
//! Completion endpoints answer in several shapes: a list of objects
//! carrying `generated_text`, a list of bare strings, or a single
//! string. [`extract_text`] handles each explicitly and falls back to
//! a compact rendering of the raw value for anything unrecognized so
//! the pipeline stays available on unexpected upstream formats.

use async_trait::async_trait;
use log::{debug, warn};
use memoir_core::{PipelineError, TextGenerator};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Default inference endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Generation is the slowest remote call in the pipeline; give it twice
/// the embedding budget.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for a hosted text-generation model.
pub struct HfGenerationClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
}

impl HfGenerationClient {
    /// Build a client for `model` under the default endpoint.
    pub fn new(model: &str, token: Option<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, model, token)
    }

    /// Build a client against a custom endpoint.
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
impl TextGenerator for HfGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
        temperature: f32,
    ) -> Result<String, PipelineError> {
        let payload = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens,
                temperature,
            },
        };
        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| PipelineError::RemoteUnavailable {
                gateway: "generation",
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::RemoteUnavailable {
                gateway: "generation",
                message: format!("status {status}"),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| PipelineError::RemoteMalformedResponse {
                gateway: "generation",
                message: err.to_string(),
            })?;
        let text = extract_text(body);
        debug!("generated completion (prompt_chars={}, chars={})", prompt.len(), text.len());
        Ok(text)
    }
}

/// Pull the completion text out of a response body.
///
/// Unknown shapes fall back to the raw value's compact rendering rather
/// than failing the turn; the caller may surface technically-malformed
/// text, which is the accepted trade-off.
pub fn extract_text(body: Value) -> String {
    match &body {
        Value::Array(items) => match items.first() {
            Some(Value::Object(fields)) => {
                if let Some(Value::String(text)) = fields.get("generated_text") {
                    return text.clone();
                }
            }
            Some(Value::String(text)) => return text.clone(),
            _ => {}
        },
        Value::String(text) => return text.clone(),
        _ => {}
    }
    warn!("unrecognized generation response shape, returning raw rendering");
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::extract_text;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn object_list_with_generated_text() {
        let body = json!([{ "generated_text": "hello there" }]);
        assert_eq!(extract_text(body), "hello there");
    }

    #[test]
    fn string_list_selects_first_completion() {
        let body = json!(["first", "second"]);
        assert_eq!(extract_text(body), "first");
    }

    #[test]
    fn bare_string_passes_through() {
        assert_eq!(extract_text(json!("just text")), "just text");
    }

    #[test]
    fn unknown_shape_falls_back_to_raw_rendering() {
        let body = json!({ "error": "model overloaded" });
        assert_eq!(extract_text(body), r#"{"error":"model overloaded"}"#);
    }

    #[test]
    fn object_list_without_generated_text_falls_back() {
        let body = json!([{ "token_count": 3 }]);
        assert_eq!(extract_text(body), r#"[{"token_count":3}]"#);
    }
}
