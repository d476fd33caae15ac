//! In-memory fakes for the memoir capability seams.

mod embedder;
mod generator;
mod store;

pub use embedder::StubEmbedder;
pub use generator::StubGenerator;
pub use store::InMemoryStore;
