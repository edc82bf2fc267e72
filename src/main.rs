use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use log_classifier::config::Config;
use log_classifier::llm_service::OllamaClient;
use log_classifier::pipeline::{self, Source};

/// Classify log lines by category with a local Ollama model
#[derive(Debug, Parser)]
#[command(name = "log-classifier", version)]
struct Args {
    /// Log file or directory of log files
    #[arg(default_value = "logs")]
    path: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("❌ {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_env()?;
    config.log_config();

    let source = Source::resolve(&args.path)?;
    let backend = Arc::new(OllamaClient::from_config(&config));

    pipeline::run(&config, backend, source).await?;
    Ok(())
}
