//! Tandem CLI - run one research turn from the command line.
//!
//! Thin caller over the library's conversation-turn contract; all
//! orchestration lives in the `tandem` library crate.

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use std::sync::Arc;
use tandem::{
    agents,
    backend::gemini::GeminiBackend,
    capability::{search::WebSearchCapability, CapabilityRegistry},
    Coordinator, EngineConfig, SessionStore,
};
use tracing_subscriber::EnvFilter;

/// Tandem - multi-agent research assistant
#[derive(Parser, Debug)]
#[command(
    name = "tandem-cli",
    version,
    about = "Ask a question; a research agent gathers web findings and a summarizer writes the answer",
    after_help = "EXAMPLES:\n    \
                  tandem-cli \"What is the capital of France?\"\n    \
                  tandem-cli --show-intermediate \"Who won the 2022 World Cup?\""
)]
struct Cli {
    /// The question to answer
    question: String,

    /// Also print the intermediate outputs published by pipeline steps
    #[arg(long)]
    show_intermediate: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("failed to load configuration")?;
    let api_key = config
        .api_key
        .clone()
        .context("GEMINI_API_KEY is not set (add it to the environment or a .env file)")?;

    let backend = Arc::new(GeminiBackend::with_api_base(api_key, config.api_base.clone()));

    let mut capabilities = CapabilityRegistry::new();
    capabilities.register(Arc::new(WebSearchCapability::with_max_results(
        config.search_results,
    )));

    let (registry, pipeline) = agents::default_pipeline(&config)?;
    let coordinator = Coordinator::new(
        Arc::new(registry),
        Arc::new(capabilities),
        backend,
        pipeline,
        config.tool_round_trip_cap,
    )?;

    let store = SessionStore::new();
    let session_id = store.create_session();

    let outcome = coordinator
        .run_conversation_turn(&store, &session_id, &cli.question)
        .await?;

    if cli.show_intermediate {
        for (key, value) in &outcome.intermediate_outputs {
            if cli.no_color {
                println!("[{key}]\n{value}\n");
            } else {
                println!("{}\n{value}\n", format!("[{key}]").dimmed());
            }
        }
    }

    if cli.no_color {
        println!("{}", outcome.final_text);
    } else {
        println!("{}", outcome.final_text.bright_white());
    }

    Ok(())
}
