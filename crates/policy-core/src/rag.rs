//! RAG (Retrieval-Augmented Generation) engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, RetrievedChunk};

/// Query for RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGQuery {
    pub query: String,
    pub top_k: usize,
}

impl RAGQuery {
    /// Create a query with the given result count
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
        }
    }
}

impl Default for RAGQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 3,
        }
    }
}

/// Result from RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGResult {
    /// Chunks ordered by ascending distance
    pub chunks: Vec<RetrievedChunk>,
    /// Context block handed to the generator
    pub context: String,
}

impl RAGResult {
    /// Source lines of the retrieved chunks, in rank order
    pub fn sources(&self) -> Vec<String> {
        self.chunks
            .iter()
            .map(|chunk| chunk.source.clone().unwrap_or_default())
            .collect()
    }
}

/// Trait for RAG engines
///
/// A RAG engine embeds the query, searches the preloaded index and returns the
/// closest chunks together with the context block built from them.
#[async_trait]
pub trait RAGEngine: Send + Sync {
    /// Retrieve relevant chunks for a query
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult>;

    /// Build context from retrieved chunks
    fn build_context(&self, chunks: &[RetrievedChunk]) -> String;

    /// Retrieve and assemble the grounded prompt for `query`
    async fn enhance_prompt(&self, query: &RAGQuery) -> Result<(String, RAGResult)>;

    /// Get statistics about the RAG engine
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Check if the RAG engine is ready
    fn is_ready(&self) -> bool;
}
