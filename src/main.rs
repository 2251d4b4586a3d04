//! intentgate CLI - route one utterance and print the decision

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use intentgate::collaborators::{HttpSearchClient, OllamaClient};
use intentgate::config::RouterConfig;
use intentgate::engine::DecisionEngine;

#[derive(Parser, Debug)]
#[command(name = "intentgate", version, about = "Routes natural-language requests to chat, retrieval, or config generation")]
struct Args {
    /// The utterance to route
    utterance: String,

    /// Base URL of the Ollama API
    #[arg(long, default_value = "http://127.0.0.1:11434")]
    ollama_url: String,

    /// Model used for classification and query rewriting
    #[arg(long, default_value = "qwen2.5:7b-instruct")]
    model: String,

    /// URL of the knowledge-base search endpoint
    #[arg(long, default_value = "http://127.0.0.1:8000/search")]
    search_url: String,

    /// Path to a config file (defaults to ~/.intentgate/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RouterConfig::load_from(path)?,
        None => RouterConfig::load()?,
    };

    let completion = Arc::new(OllamaClient::new(Some(args.ollama_url), args.model));
    let retriever = Arc::new(HttpSearchClient::new(args.search_url));

    let engine = DecisionEngine::with_config(completion, retriever, config);
    let decision = engine.decide(&args.utterance).await;

    println!("{}", serde_json::to_string_pretty(&decision)?);

    Ok(())
}
