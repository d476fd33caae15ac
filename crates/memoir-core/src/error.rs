//! Error types for the memory pipeline.

use thiserror::Error;

/// Errors surfaced by pipeline stages and the external capability seams.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A remote capability (embedding or generation) was unreachable or
    /// timed out.
    #[error("{gateway} gateway unavailable: {message}")]
    RemoteUnavailable {
        /// Which gateway failed ("embedding" or "generation").
        gateway: &'static str,
        /// Transport-level detail.
        message: String,
    },
    /// A remote capability answered with a shape the normalization rules
    /// cannot interpret.
    #[error("{gateway} gateway returned malformed response: {message}")]
    RemoteMalformedResponse {
        /// Which gateway failed ("embedding" or "generation").
        gateway: &'static str,
        /// What could not be decoded.
        message: String,
    },
    /// The vector store was unreachable.
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),
    /// Lazy index provisioning failed; fatal to the request.
    #[error("index provisioning failed: {0}")]
    IndexProvisioningFailed(String),
}
