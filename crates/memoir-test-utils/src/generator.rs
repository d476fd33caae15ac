use async_trait::async_trait;
use memoir_core::{PipelineError, TextGenerator};
use parking_lot::Mutex;

/// Canned-reply generator that records every prompt it receives.
pub struct StubGenerator {
    reply: String,
    /// Prompts captured in call order.
    pub prompts: Mutex<Vec<String>>,
    fail: Mutex<bool>,
}

impl StubGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    /// Make subsequent `generate` calls fail with `RemoteUnavailable`.
    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }

    /// The most recent prompt, if any call was made.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _max_new_tokens: u32,
        _temperature: f32,
    ) -> Result<String, PipelineError> {
        self.prompts.lock().push(prompt.to_string());
        if *self.fail.lock() {
            return Err(PipelineError::RemoteUnavailable {
                gateway: "generation",
                message: "stub generator configured to fail".to_string(),
            });
        }
        Ok(self.reply.clone())
    }
}
