//! llm-connector - server entry point.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use llm_connector::{AppConfig, AppState, Environment, TemplateStore, serve};

/// Relay BPMN generation requests to OpenAI and Gemini.
#[derive(Parser, Debug)]
#[command(name = "llm-connector")]
#[command(about = "Relay BPMN generation requests to OpenAI and Gemini")]
#[command(version)]
struct Cli {
    /// Configuration preset (development, production, testing).
    /// Falls back to LLM_CONNECTOR_ENV, then development.
    #[arg(long)]
    env: Option<Environment>,

    /// Address to bind (overrides the preset)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides the preset)
    #[arg(short, long)]
    port: Option<u16>,

    /// Few-shot templates file (defaults to the bundled set)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Provider call timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log one JSON object per line
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig> {
        let environment = match self.env {
            Some(env) => env,
            None => Environment::from_env().context("Invalid LLM_CONNECTOR_ENV")?,
        };

        let mut config = AppConfig::for_environment(environment);
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.templates.is_some() {
            config.templates_path = self.templates;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        config.json_logs |= self.json_logs;
        Ok(config)
    }
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    init_logging(&config);

    info!(
        environment = %config.environment,
        debug = config.debug,
        "Starting llm-connector {}",
        env!("CARGO_PKG_VERSION")
    );

    let templates = TemplateStore::load(config.templates_path.as_deref());
    let state = AppState::new(&config, templates).context("Failed to register metrics")?;

    serve(&config, state)
        .await
        .with_context(|| format!("Server on {} failed", config.bind_address()))?;

    Ok(())
}
