//! Terminal form for the policy assistant

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use policy_core::{Error, FailureKind, Result};

use crate::assistant::Answer;
use crate::session::{ChatHistory, Role};
use crate::sources::{KnowledgeSource, POLICY_SOURCES};

const PROMPT: &str = "policy>";

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = terminal_width.saturating_sub(4).clamp(40, 67);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "UDST Policy Assistant";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(inner.saturating_sub(title.len() + 2)),
        "│".blue()
    );

    println!("{}", empty_line.blue());

    let feature_lines = [
        "Answers questions about university policies",
        "",
        "Features:",
        "- Retrieval over the indexed policy documents",
        "- Answers cite the policy they are based on",
        "- Input history navigation (up/down arrows)",
        "",
        "v0.1.0 - Powered by Mistral AI",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
            continue;
        }
        let padding = " ".repeat(inner.saturating_sub(line.chars().count() + 2));
        if line.starts_with("v0.1.0") {
            println!("{}{}{}{}", "│  ".blue(), line.dimmed(), padding, "│".blue());
        } else {
            println!("{}", format!("│  {}{}│", line, padding).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "Tip: Ask a question about any policy, or type 'help' for commands".dimmed()
    );
    println!();
}

/// Handle input with history navigation
///
/// Piped stdin is read one line at a time; `None` means end of input.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();
    result.map(Some)
}

fn redraw(input: &str) -> Result<()> {
    print!("\r{} {}  \r{} {}", PROMPT.green().bold(), " ".repeat(50), PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

fn read_line_raw(history: &mut Vec<String>) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };

        match key_event.code {
            KeyCode::Enter => {
                let line = input.trim().to_string();
                if !line.is_empty() {
                    history.push(line.clone());
                }
                return Ok(line);
            }
            KeyCode::Char(c) => {
                input.push(c);
                redraw(&input)?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(&input)?;
                }
            }
            KeyCode::Up => {
                if !history.is_empty() {
                    let new_index = match history_index {
                        None => history.len() - 1,
                        Some(idx) => idx.saturating_sub(1),
                    };
                    history_index = Some(new_index);
                    input = history[new_index].clone();
                    redraw(&input)?;
                }
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input)?;
                }
            }
            KeyCode::Esc => return Ok(String::new()),
            _ => {}
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask anything about the university policies", "question".green());
    println!("  {} - Toggle display of the retrieved context", "context".green());
    println!("  {} - List the policy documents in the knowledge base", "sources".green());
    println!("  {} - Show one source by title", "sources <title>".green());
    println!("  {} - Replay this session's questions and answers", "history".green());
    println!("  {} - Clear the chat history", "clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is the attendance policy?");
    println!("  How are final grades calculated?");
    println!("  How do I appeal an academic decision?");
}

/// List the knowledge sources
pub fn print_sources() {
    println!("{}", "Knowledge sources:".bold());
    for source in POLICY_SOURCES {
        print_source(source);
    }
}

pub fn print_source(source: &KnowledgeSource) {
    println!("  {} {}", source.title.green(), source.url.dimmed());
}

/// Render an answer, optionally followed by the context it was grounded on
pub fn render_answer(answer: &Answer, show_context: bool) {
    println!();
    println!("{}", answer.text);
    println!();

    if show_context {
        println!("{}", "Retrieved context:".bold());
        for chunk in &answer.chunks {
            println!(
                "{} {}",
                format!("[{}]", chunk.rank + 1).cyan(),
                format!("distance {:.4}", chunk.distance).dimmed()
            );
            println!("{}", chunk.text);
            if let Some(source) = &chunk.source {
                println!("{}", source.dimmed());
            }
            println!("{}", "---".dimmed());
        }
        println!();
    }
}

/// One user-facing line per failure category; details are logged separately
pub fn failure_message(error: &Error) -> &'static str {
    match error.kind() {
        FailureKind::Embedding => "Could not process the question right now. Please try again.",
        FailureKind::IndexLoad => "Knowledge base not loaded. Build or restore the index and try again.",
        FailureKind::Generation => "Could not generate an answer right now. Please try again.",
        FailureKind::Other => "Something went wrong while answering. Please try again.",
    }
}

pub fn render_failure(error: &Error) {
    println!("{} {}", "x".red().bold(), failure_message(error).red());
}

/// Replay the session's chat history
pub fn render_history(history: &ChatHistory) {
    if history.is_empty() {
        println!("{}", "No questions asked yet.".dimmed());
        return;
    }

    for message in history.messages() {
        let time = message.timestamp.format("%H:%M:%S").to_string();
        match message.role {
            Role::User => println!("{} {}", format!("{} you>", time).green().bold(), message.content),
            Role::Assistant => {
                println!("{}", format!("{} assistant>", time).blue().bold());
                println!("{}", message.content);
                for source in &message.sources {
                    println!("  {}", source.dimmed());
                }
            }
        }
    }
}
