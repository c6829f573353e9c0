//! Embedding provider trait

use async_trait::async_trait;

use crate::{Embedding, Error, Result};

/// Trait for hosted embedding models
///
/// Implementations turn text into fixed-length vectors. The same provider and
/// model must be used for building the index and for embedding queries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of inputs, returning one vector per input in input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single input
    async fn embed_one(&self, input: &str) -> Result<Embedding> {
        let mut vectors = self.embed(&[input.to_string()]).await?;
        match vectors.pop() {
            Some(vector) if vectors.is_empty() => Ok(vector),
            _ => Err(Error::Embedding(
                "expected exactly one embedding for a single input".to_string(),
            )),
        }
    }

    /// Get the embedding model ID
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingEmbedder {
        per_input: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Embedding>> {
            Ok(inputs
                .iter()
                .flat_map(|input| {
                    std::iter::repeat_n(vec![input.len() as f32], self.per_input)
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_embed_one_returns_single_vector() {
        let embedder = CountingEmbedder { per_input: 1 };
        let vector = embedder.embed_one("four").await.unwrap();
        assert_eq!(vector, vec![4.0]);
    }

    #[tokio::test]
    async fn test_embed_one_rejects_wrong_count() {
        let embedder = CountingEmbedder { per_input: 2 };
        let err = embedder.embed_one("four").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));

        let embedder = CountingEmbedder { per_input: 0 };
        assert!(embedder.embed_one("four").await.is_err());
    }
}
