//! Vector index trait

use crate::{ChunkId, Neighbor, Result};

/// Trait for nearest-neighbor indexes over chunk embeddings
///
/// Indexes are read-only once loaded. `search` returns hits ordered by
/// ascending distance and never more than `len()` of them.
pub trait VectorIndex: Send + Sync {
    /// Dimensionality of every stored vector
    fn dimension(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    /// Whether the index holds no vectors
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chunk ids in row order
    fn ids(&self) -> &[ChunkId];

    /// Find the `k` vectors closest to `query`
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}
