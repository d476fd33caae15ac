//! Seams for the external capabilities the pipeline depends on.
//!
//! Production implementations live in the gateway crates
//! (`memoir-embeddings`, `memoir-llm`, `memoir-store`); tests inject
//! in-memory fakes.

use crate::error::PipelineError;
use crate::model::{Candidate, MemoryRecord};
use async_trait::async_trait;

/// Turns raw text into a fixed-dimension vector via a remote capability.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed one text. Empty text is accepted; what it embeds to is the
    /// model's business. No retries at this layer.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;
}

/// Produces response text from an assembled prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt.
    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
        temperature: f32,
    ) -> Result<String, PipelineError>;
}

/// Durable, namespaced nearest-neighbor store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert records into a namespace. Idempotent by record id:
    /// re-upserting an id overwrites that id only.
    async fn upsert(&self, namespace: &str, records: &[MemoryRecord]) -> Result<(), PipelineError>;

    /// Return at most `top_k` candidates ordered by the store's native
    /// similarity metric, descending, with text/role/timestamp
    /// attributes. A namespace with fewer than `top_k` eligible records
    /// returns all of them. Never crosses namespaces.
    ///
    /// No attribute filter is exposed: every caller retrieves against a
    /// whole namespace, so the narrower filtered query the underlying
    /// store supports stays out of this seam until something needs it.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Candidate>, PipelineError>;
}
