//! Offline index builder

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use policy_core::{Chunk, EmbeddingProvider, Error, Result};

use crate::flat_index::FlatL2Index;
use crate::knowledge_base::KnowledgeBase;
use crate::mapping::ChunkMapping;

/// Configuration for index building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Chunks sent per embeddings request
    pub batch_size: usize,
    /// Pause between consecutive requests
    pub batch_delay: Duration,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_millis(500),
        }
    }
}

/// Builds a knowledge base from already-chunked policy text
pub struct IndexBuilder<E: EmbeddingProvider> {
    embedder: Arc<E>,
    config: IndexingConfig,
}

impl<E: EmbeddingProvider> IndexBuilder<E> {
    pub fn new(embedder: Arc<E>) -> Self {
        Self {
            embedder,
            config: IndexingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IndexingConfig) -> Self {
        self.config = config;
        self
    }

    /// Embed every chunk and pair the vectors with their texts
    ///
    /// Any failed batch aborts the build; no partial index is produced.
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<KnowledgeBase> {
        if chunks.is_empty() {
            return Err(Error::InvalidInput("no chunks to index".to_string()));
        }
        if self.config.batch_size == 0 {
            return Err(Error::InvalidInput("batch size must be positive".to_string()));
        }

        let mut seen = HashSet::with_capacity(chunks.len());
        if let Some(chunk) = chunks.iter().find(|chunk| !seen.insert(chunk.id)) {
            return Err(Error::InvalidInput(format!("duplicate chunk id {}", chunk.id)));
        }

        let total_batches = chunks.len().div_ceil(self.config.batch_size);
        let mut index: Option<FlatL2Index> = None;

        for (batch_no, batch) in chunks.chunks(self.config.batch_size).enumerate() {
            if batch_no > 0 && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            info!(
                batch = batch_no + 1,
                total = total_batches,
                "Embedding batch"
            );

            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "batch {} returned {} embeddings for {} chunks",
                    batch_no + 1,
                    vectors.len(),
                    batch.len()
                )));
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                if index.is_none() {
                    let first = FlatL2Index::new(vector.len()).map_err(|_| {
                        Error::Embedding("embedding model returned an empty vector".to_string())
                    })?;
                    index = Some(first);
                }
                if let Some(index) = index.as_mut() {
                    index
                        .add(chunk.id, vector)
                        .map_err(|e| Error::Embedding(e.to_string()))?;
                }
            }
        }

        let index = index.ok_or_else(|| Error::Other("no vectors were produced".to_string()))?;
        let mapping = ChunkMapping::from_chunks(chunks)?;
        let kb = KnowledgeBase::new(index, mapping)?;

        info!(
            chunks = kb.len(),
            dimension = kb.dimension(),
            model = self.embedder.model_id(),
            "Index built"
        );
        Ok(kb)
    }
}

/// Read a JSON array of chunks
pub fn read_chunks(path: impl AsRef<Path>) -> Result<Vec<Chunk>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Serialization(format!("invalid chunk file {}: {}", path.display(), e))
    })
}
