use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use taskwise::cli::{Cli, Command};
use taskwise::llm::retry::{RetryLLM, RetryPolicy};
use taskwise::{
    ContextSample, LlmConfig, RangePolicy, TaskAnalyzer, classify, config,
    generate_task_suggestions,
};
use tracing::debug;

async fn read_context(path: &Path) -> anyhow::Result<Vec<ContextSample>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading context from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing context in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Analyze {
            title,
            description,
            context,
            clamp,
        } => {
            let cfg = match &cli.config {
                Some(path) => config::load(path).await?,
                None => LlmConfig::default(),
            }
            .with_env_overrides();
            debug!(provider = %cfg.provider, endpoint = %cfg.endpoint, model = %cfg.model, "llm config");

            let mut llm = cfg.build_client()?;
            if cli.retries > 0 {
                llm = std::sync::Arc::new(RetryLLM::new(
                    llm,
                    RetryPolicy::new(cli.retries, Duration::from_millis(500)),
                ));
            }
            let samples = match &context {
                Some(path) => read_context(path).await?,
                None => Vec::new(),
            };
            let policy = if clamp {
                RangePolicy::Clamp
            } else {
                RangePolicy::Reject
            };
            let analyzer = TaskAnalyzer::new(llm).range_policy(policy);
            let analysis = analyzer
                .analyze_task(&title, description.as_deref(), &samples)
                .await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Suggest { context } => {
            let samples = read_context(&context).await?;
            let suggestions = generate_task_suggestions(&samples);
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        }
        Command::Classify { text } => {
            let found = classify(&text);
            println!("{}", serde_json::to_string(&found)?);
        }
    }
    Ok(())
}
