//! Wire types for the store's control and data planes.

use chrono::{DateTime, Utc};
use memoir_core::{Candidate, MemoryRecord, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CreateIndexRequest {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub spec: SpecWrapper,
}

#[derive(Debug, Serialize)]
pub(crate) struct SpecWrapper {
    pub serverless: ServerlessSpec,
}

#[derive(Debug, Serialize)]
pub(crate) struct ServerlessSpec {
    pub cloud: String,
    pub region: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeIndexResponse {
    pub host: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpsertRequest {
    pub vectors: Vec<Vector>,
    pub namespace: String,
}

/// One stored vector with its retrievable attributes.
#[derive(Debug, Serialize)]
pub(crate) struct Vector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

impl Vector {
    pub(crate) fn from_record(record: &MemoryRecord) -> Self {
        Self {
            id: record.id.to_string(),
            values: record.vector.clone(),
            metadata: VectorMetadata {
                text: record.text.clone(),
                role: record.role.as_str().to_string(),
                ts: record.created_at.to_rfc3339(),
            },
        }
    }
}

/// Attributes stored alongside each vector and returned on query hits.
#[derive(Debug, Serialize, Deserialize, Default)]
pub(crate) struct VectorMetadata {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub ts: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub namespace: String,
    pub include_metadata: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<QueryMatch>,
}

/// One similarity hit as the store reports it.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryMatch {
    /// Raw similarity under the index metric.
    #[serde(default)]
    pub score: f32,
    /// Stored attributes; absent when the record was written without
    /// metadata.
    #[serde(default)]
    pub metadata: Option<VectorMetadata>,
}

/// Map a store hit to a pipeline candidate. Missing or unparseable
/// attributes degrade to `None` rather than failing the query.
pub(crate) fn candidate_from_match(hit: QueryMatch) -> Candidate {
    let metadata = hit.metadata.unwrap_or_default();
    let role = match metadata.role.as_str() {
        "user" => Some(Role::User),
        "assistant" => Some(Role::Assistant),
        _ => None,
    };
    let created_at = DateTime::parse_from_rfc3339(&metadata.ts)
        .ok()
        .map(|ts| ts.with_timezone(&Utc));
    Candidate {
        text: metadata.text,
        role,
        created_at,
        similarity: hit.score,
    }
}
