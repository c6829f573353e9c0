//! Core traits and types for the policy assistant
//!
//! This crate defines the fundamental traits and types used across the workspace.
//! It provides capability-facing interfaces for embedding models, LLM providers,
//! vector indexes and RAG engines, so the hosted services can be swapped for
//! in-process fakes in tests.

pub mod embedding;
pub mod error;
pub mod llm;
pub mod rag;
pub mod types;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use error::{Error, FailureKind, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use rag::{RAGEngine, RAGQuery, RAGResult};
pub use types::*;
pub use vector_store::VectorIndex;
