use async_trait::async_trait;
use memoir_core::{Candidate, MemoryRecord, PipelineError, VectorStore};
use parking_lot::Mutex;
use std::collections::HashMap;

/// In-memory vector store with cosine similarity and namespace
/// isolation. Records keep insertion order so equal-similarity hits are
/// returned in the order they were written, matching the store-order
/// contract the ranker relies on.
#[derive(Default)]
pub struct InMemoryStore {
    namespaces: Mutex<HashMap<String, Vec<MemoryRecord>>>,
    fail_upserts: Mutex<bool>,
    fail_queries: Mutex<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `upsert` calls fail with `StoreUnavailable`.
    pub fn set_fail_upserts(&self, fail: bool) {
        *self.fail_upserts.lock() = fail;
    }

    /// Make subsequent `query` calls fail with `StoreUnavailable`.
    pub fn set_fail_queries(&self, fail: bool) {
        *self.fail_queries.lock() = fail;
    }

    /// All records currently held in a namespace, in insertion order.
    pub fn records(&self, namespace: &str) -> Vec<MemoryRecord> {
        self.namespaces
            .lock()
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(&self, namespace: &str, records: &[MemoryRecord]) -> Result<(), PipelineError> {
        if *self.fail_upserts.lock() {
            return Err(PipelineError::StoreUnavailable(
                "in-memory store configured to fail upserts".to_string(),
            ));
        }
        let mut namespaces = self.namespaces.lock();
        let existing = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            match existing.iter_mut().find(|r| r.id == record.id) {
                Some(slot) => *slot = record.clone(),
                None => existing.push(record.clone()),
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Candidate>, PipelineError> {
        if *self.fail_queries.lock() {
            return Err(PipelineError::StoreUnavailable(
                "in-memory store configured to fail queries".to_string(),
            ));
        }
        let namespaces = self.namespaces.lock();
        let mut hits: Vec<Candidate> = namespaces
            .get(namespace)
            .map(|records| {
                records
                    .iter()
                    .map(|record| Candidate {
                        text: record.text.clone(),
                        role: Some(record.role),
                        created_at: Some(record.created_at),
                        similarity: cosine(vector, &record.vector),
                    })
                    .collect()
            })
            .unwrap_or_default();
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }
}
