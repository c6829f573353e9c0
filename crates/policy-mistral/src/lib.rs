//! Mistral integration for the policy assistant
//!
//! This crate provides the hosted embedding model and chat-completion model
//! behind the `EmbeddingProvider` and `LLMProvider` traits.

mod client;
mod config;


pub use client::MistralClient;
pub use config::{
    DEFAULT_API_URL, DEFAULT_CHAT_MODEL, DEFAULT_EMBED_MODEL, DEFAULT_TIMEOUT_SECS, MistralConfig,
};

// Re-export core types for convenience
pub use policy_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};
