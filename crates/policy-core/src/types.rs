//! Common types used across the policy assistant

use serde::{Deserialize, Serialize};

/// Stable identifier shared by the mapping file and the index
pub type ChunkId = u64;

/// Dense vector produced by the embedding model
pub type Embedding = Vec<f32>;

/// A contiguous span of policy text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    /// Policy name and URL the text was taken from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Chunk {
    /// Create a chunk without source information
    pub fn new(id: ChunkId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            source: None,
        }
    }

    /// Attach the source line
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A chunk returned by retrieval, with its rank and distance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Zero-based position in the result list
    pub rank: usize,
    pub id: ChunkId,
    pub text: String,
    pub source: Option<String>,
    /// Squared L2 distance to the query embedding
    pub distance: f32,
}

/// A single nearest-neighbor hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: ChunkId,
    pub distance: f32,
}
