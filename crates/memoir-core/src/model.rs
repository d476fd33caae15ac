//! Memory record and candidate models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a memory turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// End-user message.
    User,
    /// Generated assistant response.
    Assistant,
}

impl Role {
    /// Lowercase wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single durable memory unit, append-only once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier, unique within a namespace, never reused.
    pub id: Uuid,
    /// Partition key scoping all reads and writes to one user/session.
    pub namespace: String,
    /// Fixed-length embedding; every vector in a namespace has the same
    /// dimensionality.
    pub vector: Vec<f32>,
    /// Turn origin.
    pub role: Role,
    /// Original text, stored verbatim (never derived from the vector).
    pub text: String,
    /// Creation instant, UTC.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Create a record timestamped now with a fresh id.
    pub fn new(namespace: impl Into<String>, vector: Vec<f32>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            namespace: namespace.into(),
            vector,
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// A transient similarity-query hit; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Stored text attribute.
    pub text: String,
    /// Turn origin, when the store returned it.
    pub role: Option<Role>,
    /// Creation timestamp, when present and parseable.
    pub created_at: Option<DateTime<Utc>>,
    /// Raw similarity as reported by the store (cosine).
    pub similarity: f32,
}

/// A candidate with its combined similarity/recency score attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// The underlying query hit.
    pub candidate: Candidate,
    /// Weighted blend of similarity and time-decayed recency.
    pub fused_score: f32,
}

impl RankedCandidate {
    /// Stored text attribute.
    pub fn text(&self) -> &str {
        &self.candidate.text
    }

    /// Turn origin, when known.
    pub fn role(&self) -> Option<Role> {
        self.candidate.role
    }

    /// Creation timestamp, when known.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.candidate.created_at
    }
}
