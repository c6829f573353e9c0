//! Chat history kept for the lifetime of one session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assistant::Answer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Retrieved context, only on assistant turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Ordered list of questions and answers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a question from the user
    pub fn push_question(&mut self, question: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: question.into(),
            context: None,
            sources: Vec::new(),
            timestamp: Utc::now(),
        });
    }

    /// Record an answer along with the context it was grounded on
    pub fn push_answer(&mut self, answer: &Answer) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: answer.text.clone(),
            context: Some(answer.context.clone()),
            sources: answer
                .sources
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            timestamp: Utc::now(),
        });
    }

    /// Record the reply shown when a question could not be answered
    pub fn push_failure(&mut self, message: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: message.into(),
            context: None,
            sources: Vec::new(),
            timestamp: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of assistant replies, failures included
    pub fn exchanges(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
