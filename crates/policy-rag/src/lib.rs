//! Retrieval-augmented generation over the policy corpus
//!
//! This crate provides the exact nearest-neighbor index, the chunk mapping
//! file, the matched-pair loader, the retriever and the offline index builder.

mod engine;
mod flat_index;
mod indexer;
mod knowledge_base;
mod mapping;
mod prompt;


pub use engine::PolicyRetriever;
pub use flat_index::FlatL2Index;
pub use indexer::{IndexBuilder, IndexingConfig, read_chunks};
pub use knowledge_base::{ConsistencyReport, KnowledgeBase};
pub use mapping::ChunkMapping;
pub use prompt::{NO_ANSWER_REPLY, build_prompt, format_context};

// Re-export core types for convenience
pub use policy_core::{
    Chunk, ChunkId, EmbeddingProvider, Error, RAGEngine, RAGQuery, RAGResult, Result,
    RetrievedChunk, VectorIndex,
};
