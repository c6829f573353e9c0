use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use policy_cli::{
    ChatHistory, DEFAULT_TOP_K, PolicyAssistant, display_banner, failure_message, find_source,
    handle_input_with_history, print_help, print_source, print_sources, render_answer,
    render_failure, render_history,
};
use policy_core::RAGEngine;
use policy_mistral::{MistralClient, MistralConfig};
use policy_rag::{IndexBuilder, IndexingConfig, KnowledgeBase, PolicyRetriever, read_chunks};

#[derive(Parser)]
#[command(name = "policy-assistant")]
#[command(about = "Ask questions about university policies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Answer a single question and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Number of chunks retrieved per question
    #[arg(
        short = 'k',
        long,
        default_value_t = DEFAULT_TOP_K,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    top_k: usize,

    /// Index file
    #[arg(long, global = true, default_value = "assets/rag_index.json")]
    index: PathBuf,

    /// Chunk mapping file
    #[arg(long, global = true, default_value = "assets/rag_data.json")]
    mapping: PathBuf,

    /// Show the retrieved context under each answer
    #[arg(long)]
    show_context: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a chunk file and write the index and mapping files
    Build {
        /// JSON array of {id, text, source} chunks
        #[arg(short, long)]
        input: PathBuf,

        /// Chunks per embeddings request
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Pause between embeddings requests in milliseconds
        #[arg(long, default_value_t = 500)]
        batch_delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match MistralConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "missing configuration");
            println!(
                "{} Please set MISTRAL_API_KEY (environment or .env file) to continue.",
                "!".yellow().bold()
            );
            std::process::exit(1);
        }
    };
    let client = MistralClient::new(config)?;

    if let Some(Commands::Build {
        input,
        batch_size,
        batch_delay_ms,
    }) = cli.command
    {
        let indexing = IndexingConfig {
            batch_size,
            batch_delay: Duration::from_millis(batch_delay_ms),
        };
        return build_index(client, &input, indexing, &cli.index, &cli.mapping).await;
    }

    let knowledge_base = match KnowledgeBase::load(&cli.index, &cli.mapping) {
        Ok(kb) => Arc::new(kb),
        Err(e) => {
            warn!(error = %e, index = %cli.index.display(), "knowledge base failed to load");
            println!(
                "{} Knowledge base not loaded. Run `policy-assistant build` or check --index and --mapping.",
                "x".red().bold()
            );
            std::process::exit(1);
        }
    };

    let retriever = PolicyRetriever::new(Arc::new(client.clone()), knowledge_base);
    let assistant = PolicyAssistant::new(client, retriever).with_top_k(cli.top_k);

    if let Some(question) = cli.query {
        match assistant.ask(&question).await {
            Ok(answer) => {
                render_answer(&answer, cli.show_context);
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "question failed");
                render_failure(&e);
                std::process::exit(1);
            }
        }
    }

    display_banner();
    let stats = assistant.retriever().stats().await?;
    info!(%stats, "knowledge base ready");

    let mut show_context = cli.show_context;
    let mut chat = ChatHistory::new();
    let mut input_history = Vec::new();

    while let Some(input) = handle_input_with_history(&mut input_history).await? {
        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        match input_lower.as_str() {
            "exit" | "quit" => {
                println!("{}", "Goodbye!".green());
                break;
            }
            "help" => print_help(),
            "clear" => {
                chat.clear();
                println!("{}", "Chat history cleared.".dimmed());
            }
            "context" => {
                show_context = !show_context;
                let state = if show_context { "on" } else { "off" };
                println!("{} {}", "Context display:".dimmed(), state.bold());
            }
            "sources" => print_sources(),
            "history" => render_history(&chat),
            _ if input_lower.starts_with("sources ") => match find_source(input.get(8..).unwrap_or_default()) {
                Some(source) => print_source(source),
                None => println!("{}", "No source with that title. Type 'sources' for the list.".yellow()),
            },
            _ => {
                println!("{}", "Searching the policies...".blue());
                chat.push_question(input.as_str());
                match assistant.ask(&input).await {
                    Ok(answer) => {
                        render_answer(&answer, show_context);
                        chat.push_answer(&answer);
                    }
                    Err(e) => {
                        warn!(error = %e, kind = ?e.kind(), "question failed");
                        render_failure(&e);
                        chat.push_failure(failure_message(&e));
                    }
                }
            }
        }
    }

    Ok(())
}

async fn build_index(
    client: MistralClient,
    input: &Path,
    indexing: IndexingConfig,
    index_path: &Path,
    mapping_path: &Path,
) -> Result<()> {
    let chunks = read_chunks(input)
        .with_context(|| format!("failed to read chunks from {}", input.display()))?;
    println!("{} Embedding {} chunks...", "->".blue(), chunks.len());

    let knowledge_base = IndexBuilder::new(Arc::new(client))
        .with_config(indexing)
        .build(chunks)
        .await?;

    for path in [index_path, mapping_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    knowledge_base.save(index_path, mapping_path)?;

    println!(
        "{} Indexed {} chunks ({} dimensions) into {} and {}",
        "ok".green().bold(),
        knowledge_base.len(),
        knowledge_base.dimension(),
        index_path.display(),
        mapping_path.display()
    );
    Ok(())
}
