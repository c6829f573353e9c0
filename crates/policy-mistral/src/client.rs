//! Mistral client implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, instrument};
use url::Url;

use policy_core::{
    Embedding, EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

use crate::config::MistralConfig;

/// Longest slice of an error body kept in error messages
const SNIPPET_LEN: usize = 240;

/// Mistral client for embeddings and chat completion
#[derive(Clone)]
pub struct MistralClient {
    config: MistralConfig,
    client: Client,
    embeddings_url: String,
    chat_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingsRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub(crate) role: &'a str,
    pub(crate) content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    /// Single user message carrying the whole prompt
    pub(crate) fn from_prompt(prompt: &'a str, config: &'a GenerationConfig) -> Self {
        Self {
            model: &config.model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl MistralClient {
    /// Create a new Mistral client from configuration
    pub fn new(config: MistralConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Authentication(
                "Mistral API key is empty".to_string(),
            ));
        }

        let base = Url::parse(config.api_url.trim())
            .map_err(|e| Error::Configuration(format!("invalid API URL '{}': {}", config.api_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "API URL must use http or https, got '{}'",
                config.api_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key.trim()))
            .map_err(|e| Error::Configuration(format!("invalid API key header: {}", e)))?;
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        let root = base.as_str().trim_end_matches('/').to_string();
        let embeddings_url = format!("{}/v1/embeddings", root);
        let chat_url = format!("{}/v1/chat/completions", root);

        info!(
            api_url = %root,
            embedding_model = %config.embedding_model,
            chat_model = %config.chat_model,
            timeout_secs = config.timeout_secs,
            "Mistral client initialized"
        );

        Ok(Self {
            config,
            client,
            embeddings_url,
            chat_url,
        })
    }

    /// Create a new Mistral client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = MistralConfig::from_env()?;
        Self::new(config)
    }

    /// Set the chat model to use for generation
    pub fn with_chat_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.chat_model = model_id.into();
        self
    }

    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    /// POST a JSON body and return the raw response text of a 2xx reply
    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
        wrap: fn(String) -> Error,
    ) -> Result<String> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| wrap(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| wrap(format!("failed to read response from {}: {}", url, e)))?;

        if !status.is_success() {
            return Err(wrap(describe_status(status, url, &text)));
        }

        Ok(text)
    }

    async fn perform_generation(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
        let body = ChatRequest::from_prompt(prompt, config);
        let text = self.post_json(&self.chat_url, &body, Error::Generation).await?;
        let (answer, tokens_used) = parse_chat_response(&text)?;

        Ok(GenerationResult {
            text: answer,
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for MistralClient {
    #[instrument(skip_all, fields(model = %self.config.embedding_model, inputs = inputs.len()))]
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Embedding>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: &self.config.embedding_model,
            input: inputs,
        };
        let text = self
            .post_json(&self.embeddings_url, &body, Error::Embedding)
            .await?;

        parse_embeddings_response(&text, inputs.len())
    }

    fn model_id(&self) -> &str {
        &self.config.embedding_model
    }
}

#[async_trait]
impl LLMProvider for MistralClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.config.chat_model.clone(),
            timeout: self.config.timeout(),
        };
        self.generate_with_config(prompt, &config).await
    }

    #[instrument(skip_all, fields(model = %config.model_id, prompt_len = prompt.len()))]
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        match timeout(config.timeout, self.perform_generation(prompt, config)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "chat completion did not finish within {}s",
                config.timeout.as_secs()
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

fn describe_status(status: StatusCode, url: &str, body: &str) -> String {
    let snippet: String = body.chars().take(SNIPPET_LEN).collect();
    if status == StatusCode::UNAUTHORIZED {
        format!("unauthorized by {} (check MISTRAL_API_KEY): {}", url, snippet)
    } else {
        format!("unexpected HTTP status {} from {}: {}", status, url, snippet)
    }
}

/// Decode an embeddings response, restoring input order
pub(crate) fn parse_embeddings_response(body: &str, expected: usize) -> Result<Vec<Embedding>> {
    let response: EmbeddingsResponse = serde_json::from_str(body)
        .map_err(|e| Error::Embedding(format!("malformed embeddings response: {}", e)))?;

    if response.data.len() != expected {
        return Err(Error::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    let mut data = response.data;
    if data.iter().any(|item| item.index.is_some()) {
        data.sort_by_key(|item| item.index);
        if !data
            .iter()
            .enumerate()
            .all(|(position, item)| item.index == Some(position))
        {
            return Err(Error::Embedding(format!(
                "embeddings response indices are not a permutation of 0..{}",
                expected
            )));
        }
    }

    let dimension = data.first().map(|item| item.embedding.len()).unwrap_or(0);
    if data
        .iter()
        .any(|item| item.embedding.is_empty() || item.embedding.len() != dimension)
    {
        return Err(Error::Embedding(
            "embeddings response contains empty or uneven vectors".to_string(),
        ));
    }

    Ok(data.into_iter().map(|item| item.embedding).collect())
}

/// Decode a chat completion response into the answer text and token usage
pub(crate) fn parse_chat_response(body: &str) -> Result<(String, Option<u32>)> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("malformed chat response: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::Generation("chat response contained no choices".to_string()))?;

    let answer = content.trim().to_string();
    if answer.is_empty() {
        return Err(Error::Generation(
            "chat response contained an empty answer".to_string(),
        ));
    }

    let tokens_used = response.usage.and_then(|usage| usage.total_tokens);
    Ok((answer, tokens_used))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeddings_restored_to_input_order() {
        let body = r#"{
            "id": "embd-1",
            "object": "list",
            "data": [
                {"object": "embedding", "embedding": [0.0, 1.0], "index": 1},
                {"object": "embedding", "embedding": [1.0, 0.0], "index": 0}
            ],
            "model": "mistral-embed"
        }"#;

        let vectors = parse_embeddings_response(body, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_embeddings_indices_must_cover_inputs() {
        let duplicated = r#"{"data": [
            {"embedding": [1.0, 0.0], "index": 0},
            {"embedding": [0.0, 1.0], "index": 0}
        ]}"#;
        assert!(matches!(
            parse_embeddings_response(duplicated, 2),
            Err(Error::Embedding(_))
        ));

        let out_of_range = r#"{"data": [
            {"embedding": [1.0, 0.0], "index": 0},
            {"embedding": [0.0, 1.0], "index": 2}
        ]}"#;
        assert!(matches!(
            parse_embeddings_response(out_of_range, 2),
            Err(Error::Embedding(_))
        ));

        let partial = r#"{"data": [
            {"embedding": [1.0, 0.0]},
            {"embedding": [0.0, 1.0], "index": 0}
        ]}"#;
        assert!(matches!(
            parse_embeddings_response(partial, 2),
            Err(Error::Embedding(_))
        ));

        let unindexed = r#"{"data": [{"embedding": [1.0, 0.0]}, {"embedding": [0.0, 1.0]}]}"#;
        assert_eq!(
            parse_embeddings_response(unindexed, 2).unwrap(),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]]
        );
    }

    #[test]
    fn test_embeddings_count_mismatch() {
        let body = r#"{"data": [{"embedding": [1.0], "index": 0}]}"#;
        let err = parse_embeddings_response(body, 2).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[test]
    fn test_embeddings_malformed() {
        assert!(matches!(
            parse_embeddings_response("<html>bad gateway</html>", 1),
            Err(Error::Embedding(_))
        ));
        assert!(matches!(
            parse_embeddings_response(r#"{"data": [{"embedding": []}]}"#, 1),
            Err(Error::Embedding(_))
        ));
        assert!(matches!(
            parse_embeddings_response(
                r#"{"data": [{"embedding": [1.0, 2.0]}, {"embedding": [1.0]}]}"#,
                2
            ),
            Err(Error::Embedding(_))
        ));
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  Attendance is mandatory.\n"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 100, "completion_tokens": 5, "total_tokens": 105}
        }"#;

        let (answer, tokens) = parse_chat_response(body).unwrap();
        assert_eq!(answer, "Attendance is mandatory.");
        assert_eq!(tokens, Some(105));
    }

    #[test]
    fn test_chat_response_without_choices() {
        let err = parse_chat_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        let err = parse_chat_response(r#"{"choices": [{"message": {"content": "   "}}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_status_description() {
        let long_body = "x".repeat(1000);
        let message = describe_status(StatusCode::BAD_GATEWAY, "http://h/v1/embeddings", &long_body);
        assert!(message.contains("502"));
        assert!(message.len() < 400);

        let message = describe_status(StatusCode::UNAUTHORIZED, "http://h", "nope");
        assert!(message.contains("MISTRAL_API_KEY"));
    }

    #[test]
    fn test_client_rejects_bad_config() {
        assert!(matches!(
            MistralClient::new(MistralConfig::new(String::new())),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            MistralClient::new(MistralConfig::new("key".to_string()).with_api_url("not a url")),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            MistralClient::new(MistralConfig::new("key".to_string()).with_api_url("ftp://host")),
            Err(Error::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_embedding_error() {
        let config = MistralConfig::new("key".to_string()).with_api_url("http://127.0.0.1:9");
        let client = MistralClient::new(config).unwrap();

        let err = client.embed_one("What is the attendance policy?").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}
