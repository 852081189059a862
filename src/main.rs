use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use email_triage::config::TriageConfig;
use email_triage::input;
use email_triage::llm::create_provider;
use email_triage::pipeline::{ClassificationPipeline, ServiceStatus};

/// Classify an email as actionable or not and draft a reply
#[derive(Parser, Debug)]
#[command(name = "email-triage")]
#[command(version)]
struct Cli {
    /// Plain-text email to classify (reads stdin when omitted)
    #[arg(value_name = "FILE", conflicts_with = "status")]
    file: Option<PathBuf>,

    /// Print the service status as JSON and exit
    #[arg(long)]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = TriageConfig::from_env().context("invalid configuration")?;

    if cli.status {
        let status = ServiceStatus::from_config(&config);
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let content = match &cli.file {
        Some(path) => input::read_file(path, &config)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => input::read_stdin(&config)
            .await
            .context("failed to read stdin")?,
    };

    let llm = match &config.remote {
        Some(remote) => Some(create_provider(remote).context("failed to create LLM provider")?),
        None => {
            tracing::info!("GROQ_API_KEY not configured, using rule-based classification");
            None
        }
    };

    let pipeline = ClassificationPipeline::new(llm);
    let result = pipeline.run(&content).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
