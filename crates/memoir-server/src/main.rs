//! Memoir server binary.
//!
//! Loads settings from the environment, wires the remote gateways and
//! the vector store into the pipeline, and serves the HTTP API.
//!
//! # Environment Variables
//!
//! - `PORT`, `LOG_LEVEL`, `CORS_ORIGINS`
//! - `HF_TOKEN`, `HF_LLM_MODEL`, `HF_EMBEDDING_MODEL`, `EMBEDDING_DIMENSION`
//! - `PINECONE_API_KEY`, `PINECONE_INDEX`, `PINECONE_CLOUD`, `PINECONE_REGION`
//! - `TOP_K`, `RATE_LIMIT_RPM`, `MAX_NEW_TOKENS`, `TEMPERATURE`

use anyhow::Context;
use log::{info, warn};
use memoir_config::Settings;
use memoir_core::{MemoryPipeline, PipelineOptions};
use memoir_embeddings::HfEmbeddingClient;
use memoir_llm::HfGenerationClient;
use memoir_server::{AppState, RateLimiter, serve};
use memoir_store::{PineconeStore, StoreConfig};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to load settings")?;

    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_filters(&settings.log_level)
        .parse_default_env()
        .try_init();

    if settings.pinecone_api_key.is_none() {
        warn!("PINECONE_API_KEY is not set; store requests will be rejected upstream");
    }
    if settings.hf_token.is_none() {
        warn!("HF_TOKEN is not set; inference calls run unauthenticated");
    }

    let embedder = Arc::new(HfEmbeddingClient::new(
        &settings.hf_embedding_model,
        settings.hf_token.clone(),
    ));
    let generator = Arc::new(HfGenerationClient::new(
        &settings.hf_llm_model,
        settings.hf_token.clone(),
    ));
    let store = Arc::new(PineconeStore::new(StoreConfig::new(
        settings.pinecone_api_key.clone().unwrap_or_default(),
        settings.pinecone_index.clone(),
        settings.embedding_dimension,
        settings.pinecone_cloud.clone(),
        settings.pinecone_region.clone(),
    )));

    let pipeline = MemoryPipeline::new(
        embedder,
        store,
        generator,
        PipelineOptions {
            max_new_tokens: settings.max_new_tokens,
            temperature: settings.temperature,
        },
    );
    let state = Arc::new(AppState::new(
        pipeline,
        RateLimiter::new(settings.rate_limit_rpm),
        settings.top_k,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(
        "memoir server configured (port={}, index={}, embedding_model={}, llm_model={})",
        settings.port, settings.pinecone_index, settings.hf_embedding_model, settings.hf_llm_model
    );
    serve(state, addr, &settings.cors_origins).await
}
