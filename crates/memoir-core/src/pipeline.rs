//! Pipeline orchestrator: write, retrieve, rank, generate, write back.

use crate::error::PipelineError;
use crate::gateway::{TextEmbedder, TextGenerator, VectorStore};
use crate::model::{MemoryRecord, RankedCandidate, Role};
use crate::prompt::assemble;
use crate::rank::rank;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;

/// One inbound chat turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Partition the turn belongs to (one per user/session).
    pub namespace: String,
    /// The user's message.
    pub message: String,
    /// How many memories to retrieve.
    pub top_k: usize,
}

/// Result of a chat turn.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Generated response text.
    pub response: String,
    /// Ranked context the response was grounded on.
    pub context: Vec<RankedCandidate>,
}

/// One item in a bulk-seeding request.
#[derive(Debug, Clone)]
pub struct IngestItem {
    /// Text to memorize.
    pub text: String,
    /// Turn origin; defaults to user when the caller omits it.
    pub role: Role,
}

/// Generation defaults applied to every turn.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Token budget passed to the generation gateway.
    pub max_new_tokens: u32,
    /// Sampling temperature passed to the generation gateway.
    pub temperature: f32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: 0.2,
        }
    }
}

/// Sequences the memory pipeline per request.
///
/// Stages are strictly sequential; every external call is a blocking
/// I/O boundary with no lock held across it. There is no rollback:
/// upserts committed before a later stage fails stay persisted.
#[derive(Clone)]
pub struct MemoryPipeline {
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn VectorStore>,
    generator: Arc<dyn TextGenerator>,
    options: PipelineOptions,
}

impl MemoryPipeline {
    /// Build a pipeline over the injected capability implementations.
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn TextGenerator>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            options,
        }
    }

    /// Run one chat turn: persist the user message, retrieve and rank
    /// relevant memories, generate a grounded response, persist it.
    ///
    /// The two persistence steps are best-effort: a failed upsert is
    /// logged and the turn proceeds, favoring availability over
    /// completeness. Every other stage failure aborts the turn.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, PipelineError> {
        let query_vector = self.embedder.embed(&request.message).await?;

        // Await the user-turn write before querying so the new turn is
        // visible to its own retrieval.
        let user_record = MemoryRecord::new(
            &request.namespace,
            query_vector.clone(),
            Role::User,
            &request.message,
        );
        if let Err(err) = self
            .store
            .upsert(&request.namespace, std::slice::from_ref(&user_record))
            .await
        {
            warn!(
                "user-turn upsert failed, continuing without it (namespace={}, error={err})",
                request.namespace
            );
        }

        let candidates = self
            .store
            .query(&request.namespace, &query_vector, request.top_k)
            .await?;
        debug!(
            "retrieved candidates (namespace={}, requested={}, returned={})",
            request.namespace,
            request.top_k,
            candidates.len()
        );

        let context = rank(candidates, Utc::now());
        let prompt = assemble(&context, &request.message);
        let response = self
            .generator
            .generate(&prompt, self.options.max_new_tokens, self.options.temperature)
            .await?;

        if let Err(err) = self.persist_assistant_turn(&request.namespace, &response).await {
            warn!(
                "assistant-turn persistence failed, returning response anyway (namespace={}, error={err})",
                request.namespace
            );
        }

        info!(
            "chat turn complete (namespace={}, context_len={}, response_len={})",
            request.namespace,
            context.len(),
            response.len()
        );
        Ok(ChatOutcome { response, context })
    }

    /// Embed and persist the generated response as an assistant memory.
    async fn persist_assistant_turn(
        &self,
        namespace: &str,
        response: &str,
    ) -> Result<(), PipelineError> {
        let vector = self.embedder.embed(response).await?;
        let record = MemoryRecord::new(namespace, vector, Role::Assistant, response);
        self.store
            .upsert(namespace, std::slice::from_ref(&record))
            .await
    }

    /// Bulk-seed memories without generation. Returns the number of
    /// records written; unlike chat persistence this is not
    /// best-effort, so a failure aborts the remaining batch.
    pub async fn ingest(
        &self,
        namespace: &str,
        items: Vec<IngestItem>,
    ) -> Result<usize, PipelineError> {
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            let vector = self.embedder.embed(&item.text).await?;
            records.push(MemoryRecord::new(namespace, vector, item.role, item.text));
        }
        if !records.is_empty() {
            self.store.upsert(namespace, &records).await?;
        }
        info!("ingest complete (namespace={namespace}, upserted={})", records.len());
        Ok(records.len())
    }
}
