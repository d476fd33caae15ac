use async_trait::async_trait;
use memoir_core::{PipelineError, TextEmbedder};
use parking_lot::Mutex;

/// Deterministic embedder: identical text always embeds to the same
/// vector, derived from the text bytes. Optionally fails every call.
pub struct StubEmbedder {
    dim: usize,
    fail: Mutex<bool>,
}

impl StubEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            fail: Mutex::new(false),
        }
    }

    /// Make subsequent `embed` calls fail with `RemoteUnavailable`.
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    /// The vector `embed` produces for this text.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        (0..self.dim)
            .map(|i| {
                let byte = bytes.get(i % bytes.len().max(1)).copied().unwrap_or(0);
                (byte as f32 + i as f32) / 255.0
            })
            .collect()
    }
}

#[async_trait]
impl TextEmbedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        if *self.fail.lock() {
            return Err(PipelineError::RemoteUnavailable {
                gateway: "embedding",
                message: "stub embedder configured to fail".to_string(),
            });
        }
        Ok(self.vector_for(text))
    }
}
