//! Question answering over the retriever and the chat model

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use policy_core::{Error, LLMProvider, RAGEngine, RAGQuery, Result, RetrievedChunk};

/// Default number of chunks placed in the prompt
pub const DEFAULT_TOP_K: usize = 3;

/// A generated answer together with the evidence it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub context: String,
    pub sources: Vec<String>,
    pub chunks: Vec<RetrievedChunk>,
}

/// Answers policy questions by retrieving chunks and asking the chat model
pub struct PolicyAssistant<L: LLMProvider, R: RAGEngine> {
    llm: L,
    rag: R,
    top_k: usize,
}

impl<L: LLMProvider, R: RAGEngine> PolicyAssistant<L, R> {
    pub fn new(llm: L, rag: R) -> Self {
        Self {
            llm,
            rag,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override how many chunks are retrieved per question
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Check if the knowledge base behind the retriever has content
    pub fn is_ready(&self) -> bool {
        self.rag.is_ready()
    }

    pub fn retriever(&self) -> &R {
        &self.rag
    }

    /// Answer one question
    ///
    /// Retrieval runs before generation; a failure in either step ends the
    /// question with that error.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }
        if !self.rag.is_ready() {
            return Err(Error::IndexLoad("knowledge base not loaded".to_string()));
        }

        let query = RAGQuery::new(question, self.top_k);
        let (prompt, retrieved) = self.rag.enhance_prompt(&query).await?;
        debug!(%prompt, "assembled prompt");

        let generation = self.llm.generate(&prompt).await?;

        info!(
            chunks = retrieved.chunks.len(),
            tokens = ?generation.tokens_used,
            "question answered"
        );

        Ok(Answer {
            text: generation.text,
            sources: retrieved.sources(),
            context: retrieved.context,
            chunks: retrieved.chunks,
        })
    }
}
