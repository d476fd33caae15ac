//! HTTP route handlers and wire schemas.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};
use memoir_core::{ChatRequest, IngestItem, PipelineError, RankedCandidate, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Inbound chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    /// Unique id per user/session; becomes the memory namespace.
    pub user_id: String,
    /// The user's input message.
    pub message: String,
    /// How many memories to retrieve (1..=50); server default applies
    /// when omitted.
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Optional caller metadata, currently accepted and ignored.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// One retrieved memory as returned to the caller.
#[derive(Debug, Serialize)]
pub struct ContextItem {
    pub text: String,
    /// Fused similarity/recency score.
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
}

impl ContextItem {
    fn from_ranked(item: &RankedCandidate) -> Self {
        Self {
            text: item.text().to_string(),
            score: item.fused_score,
            ts: item.created_at().map(|ts| ts.to_rfc3339()),
            role: item.role().map(|role| role.as_str()),
        }
    }
}

/// Chat turn result.
#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub response: String,
    pub context: Vec<ContextItem>,
    pub latency_ms: u64,
}

/// One item in a bulk-seeding request.
#[derive(Debug, Deserialize)]
pub struct IngestItemBody {
    pub text: String,
    /// "user" or "assistant"; defaults to user.
    #[serde(default)]
    pub role: Option<String>,
}

/// Inbound bulk-seeding request.
#[derive(Debug, Deserialize)]
pub struct IngestRequestBody {
    pub user_id: String,
    pub items: Vec<IngestItemBody>,
}

/// Bulk-seeding result.
#[derive(Debug, Serialize)]
pub struct IngestResponseBody {
    pub upserted: usize,
}

/// Liveness probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error replied to the caller; pipeline detail stays in the logs.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    fn from_pipeline(err: PipelineError) -> Self {
        error!("pipeline failure: {err}");
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: "memory pipeline failure".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run one memory-grounded chat turn.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    if body.user_id.trim().is_empty() {
        return Err(ApiError::validation("user_id must not be empty"));
    }
    if body.message.trim().is_empty() {
        return Err(ApiError::validation("message must not be empty"));
    }
    let top_k = match body.top_k {
        Some(k) if (1..=50).contains(&k) => k,
        Some(k) => {
            return Err(ApiError::validation(format!(
                "top_k must be between 1 and 50, got {k}"
            )));
        }
        None => state.default_top_k,
    };

    info!(
        "chat request (user_id={}, top_k={top_k}, message_chars={}, metadata_set={})",
        body.user_id,
        body.message.len(),
        body.metadata.is_some()
    );
    let started = Instant::now();
    let outcome = state
        .pipeline
        .chat(ChatRequest {
            namespace: body.user_id,
            message: body.message,
            top_k,
        })
        .await
        .map_err(ApiError::from_pipeline)?;

    Ok(Json(ChatResponseBody {
        context: outcome.context.iter().map(ContextItem::from_ranked).collect(),
        response: outcome.response,
        latency_ms: started.elapsed().as_millis() as u64,
    }))
}

/// Bulk-seed memories without generation.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestRequestBody>,
) -> Result<Json<IngestResponseBody>, ApiError> {
    if body.user_id.trim().is_empty() {
        return Err(ApiError::validation("user_id must not be empty"));
    }
    let mut items = Vec::with_capacity(body.items.len());
    for item in body.items {
        let role = match item.role.as_deref() {
            None | Some("user") => Role::User,
            Some("assistant") => Role::Assistant,
            Some(other) => {
                return Err(ApiError::validation(format!(
                    "role must be \"user\" or \"assistant\", got \"{other}\""
                )));
            }
        };
        items.push(IngestItem {
            text: item.text,
            role,
        });
    }

    let upserted = state
        .pipeline
        .ingest(&body.user_id, items)
        .await
        .map_err(ApiError::from_pipeline)?;
    Ok(Json(IngestResponseBody { upserted }))
}
