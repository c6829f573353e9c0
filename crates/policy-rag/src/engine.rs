//! Retrieval engine over a preloaded knowledge base

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use policy_core::{
    EmbeddingProvider, Error, RAGEngine, RAGQuery, RAGResult, Result, RetrievedChunk, VectorIndex,
};

use crate::knowledge_base::KnowledgeBase;
use crate::prompt::{build_prompt, format_context};

/// Retriever that embeds a query, searches the index and resolves chunk texts
pub struct PolicyRetriever<E: EmbeddingProvider> {
    embedder: Arc<E>,
    knowledge_base: Arc<KnowledgeBase>,
}

impl<E: EmbeddingProvider> PolicyRetriever<E> {
    /// Create a retriever over a loaded knowledge base
    pub fn new(embedder: Arc<E>, knowledge_base: Arc<KnowledgeBase>) -> Self {
        Self {
            embedder,
            knowledge_base,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    fn validate(query: &RAGQuery) -> Result<()> {
        if query.query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }
        if query.top_k == 0 {
            return Err(Error::InvalidInput("top_k must be positive".to_string()));
        }
        Ok(())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embedding = self.embedder.embed_one(query).await?;

        let expected = self.knowledge_base.dimension();
        if embedding.len() != expected {
            return Err(Error::Embedding(format!(
                "query embedding has dimension {}, index was built with {}",
                embedding.len(),
                expected
            )));
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(Error::Embedding(
                "query embedding contains non-finite values".to_string(),
            ));
        }

        Ok(embedding)
    }
}

#[async_trait]
impl<E: EmbeddingProvider + 'static> RAGEngine for PolicyRetriever<E> {
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult> {
        Self::validate(query)?;

        let embedding = self.embed_query(&query.query).await?;
        let neighbors = self
            .knowledge_base
            .index()
            .search(&embedding, query.top_k)?;

        let chunks = neighbors
            .into_iter()
            .enumerate()
            .map(|(rank, neighbor)| {
                let chunk = self.knowledge_base.chunk(neighbor.id).ok_or_else(|| {
                    Error::ConsistencyViolation(format!(
                        "index returned chunk {} which has no text",
                        neighbor.id
                    ))
                })?;

                Ok(RetrievedChunk {
                    rank,
                    id: chunk.id,
                    text: chunk.text.clone(),
                    source: chunk.source.clone(),
                    distance: neighbor.distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            top_k = query.top_k,
            hits = chunks.len(),
            ids = ?chunks.iter().map(|c| c.id).collect::<Vec<_>>(),
            "retrieved chunks"
        );

        let context = self.build_context(&chunks);
        Ok(RAGResult { chunks, context })
    }

    fn build_context(&self, chunks: &[RetrievedChunk]) -> String {
        format_context(chunks)
    }

    async fn enhance_prompt(&self, query: &RAGQuery) -> Result<(String, RAGResult)> {
        let result = self.retrieve(query).await?;
        let prompt = build_prompt(&query.query, &result.context);
        Ok((prompt, result))
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        Ok(json!({
            "chunks": self.knowledge_base.len(),
            "dimension": self.knowledge_base.dimension(),
            "embedding_model": self.embedder.model_id(),
        }))
    }

    fn is_ready(&self) -> bool {
        !self.knowledge_base.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_index::FlatL2Index;
    use crate::mapping::ChunkMapping;
    use policy_core::{Chunk, Embedding};

    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Embedding>> {
            Ok(inputs.iter().map(|_| self.vector.clone()).collect())
        }

        fn model_id(&self) -> &str {
            "fixed"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _inputs: &[String]) -> Result<Vec<Embedding>> {
            Err(Error::Embedding("service unavailable".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }
    }

    fn knowledge_base() -> Arc<KnowledgeBase> {
        let mut index = FlatL2Index::new(2).unwrap();
        index.add(1, vec![0.0, 0.0]).unwrap();
        index.add(2, vec![1.0, 1.0]).unwrap();
        let mapping = ChunkMapping::from_chunks(vec![
            Chunk::new(1, "origin"),
            Chunk::new(2, "diagonal").with_source("Policy: Diagonal"),
        ])
        .unwrap();
        Arc::new(KnowledgeBase::new(index, mapping).unwrap())
    }

    #[tokio::test]
    async fn test_retrieve_ranks_by_distance() {
        let embedder = Arc::new(FixedEmbedder {
            vector: vec![0.9, 0.9],
        });
        let retriever = PolicyRetriever::new(embedder, knowledge_base());

        let result = retriever.retrieve(&RAGQuery::new("diagonal?", 5)).await.unwrap();
        assert_eq!(result.chunks.len(), 2);
        assert_eq!(result.chunks[0].text, "diagonal");
        assert_eq!(result.chunks[0].rank, 0);
        assert_eq!(result.chunks[1].text, "origin");
        assert_eq!(result.sources(), vec!["Policy: Diagonal".to_string(), String::new()]);
        assert!(result.context.contains("Chunk 1:\ndiagonal\nPolicy: Diagonal"));
    }

    #[tokio::test]
    async fn test_invalid_queries_rejected() {
        let embedder = Arc::new(FixedEmbedder {
            vector: vec![0.0, 0.0],
        });
        let retriever = PolicyRetriever::new(embedder, knowledge_base());

        assert!(matches!(
            retriever.retrieve(&RAGQuery::new("   ", 3)).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            retriever.retrieve(&RAGQuery::new("attendance", 0)).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_failure_surfaces() {
        let retriever = PolicyRetriever::new(Arc::new(FailingEmbedder), knowledge_base());
        let err = retriever
            .retrieve(&RAGQuery::new("attendance", 3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_wrong_dimension_is_embedding_error() {
        let embedder = Arc::new(FixedEmbedder {
            vector: vec![0.0, 0.0, 0.0],
        });
        let retriever = PolicyRetriever::new(embedder, knowledge_base());
        let err = retriever
            .retrieve(&RAGQuery::new("attendance", 3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));

        let embedder = Arc::new(FixedEmbedder {
            vector: vec![f32::NAN, 0.0],
        });
        let retriever = PolicyRetriever::new(embedder, knowledge_base());
        assert!(matches!(
            retriever.retrieve(&RAGQuery::new("attendance", 3)).await,
            Err(Error::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_and_readiness() {
        let embedder = Arc::new(FixedEmbedder {
            vector: vec![0.0, 0.0],
        });
        let retriever = PolicyRetriever::new(embedder, knowledge_base());

        assert!(retriever.is_ready());
        let stats = retriever.stats().await.unwrap();
        assert_eq!(stats["chunks"], 2);
        assert_eq!(stats["dimension"], 2);
        assert_eq!(stats["embedding_model"], "fixed");
    }
}
