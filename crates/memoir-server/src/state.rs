//! Shared application state.

use crate::rate_limit::RateLimiter;
use memoir_core::MemoryPipeline;

/// State shared across request handlers.
pub struct AppState {
    /// The memory pipeline every chat/ingest request runs through.
    pub pipeline: MemoryPipeline,
    /// Per-IP request limiter.
    pub limiter: RateLimiter,
    /// `top_k` applied when a chat request omits it.
    pub default_top_k: usize,
}

impl AppState {
    /// Bundle the pipeline with its request-level policies.
    pub fn new(pipeline: MemoryPipeline, limiter: RateLimiter, default_top_k: usize) -> Self {
        Self {
            pipeline,
            limiter,
            default_top_k,
        }
    }
}
