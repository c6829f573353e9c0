//! Terminal front end and question answering for the policy assistant

mod assistant;
mod session;
mod sources;
mod ui;


pub use assistant::{Answer, DEFAULT_TOP_K, PolicyAssistant};
pub use session::{ChatHistory, ChatMessage, Role};
pub use sources::{KnowledgeSource, POLICY_SOURCES, find_source};
pub use ui::{
    display_banner, failure_message, handle_input_with_history, print_help, print_source,
    print_sources, render_answer, render_failure, render_history,
};

// Re-export core types
pub use policy_core::{Error, Result};
