//! Memory retrieval and fusion pipeline for the memoir memory layer.
//!
//! This crate owns the data model, the recency-fusion ranker, the prompt
//! assembler, and the pipeline orchestrator. External capabilities
//! (embedding, generation, vector storage) are injected through the
//! traits in [`gateway`].

pub mod error;
pub mod gateway;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod rank;

/// Pipeline error taxonomy.
pub use error::PipelineError;
/// External capability seams.
pub use gateway::{TextEmbedder, TextGenerator, VectorStore};
/// Memory record and candidate models.
pub use model::{Candidate, MemoryRecord, RankedCandidate, Role};
/// Pipeline orchestrator and request/result types.
pub use pipeline::{ChatOutcome, ChatRequest, IngestItem, MemoryPipeline, PipelineOptions};
/// Prompt assembly.
pub use prompt::assemble;
/// Recency-fusion ranking.
pub use rank::rank;
