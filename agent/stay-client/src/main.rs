use anyhow::Result;
use tracing_subscriber::EnvFilter;

use stay_client::{run_session, AgentConfig, AgentDeps, HttpProvider, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenv::dotenv();

    // logs go to stderr so they don't interleave with the conversation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = AgentConfig::from_env()?;
    tracing::info!(
        "[CONFIG] interpreter={:?}, provider={}",
        config.interpreter,
        config.listing_server_url.as_deref().unwrap_or("in-process mock")
    );

    if let Some(url) = &config.listing_server_url {
        match HttpProvider::new(url.clone()).list_tools().await {
            Ok(tools) => tracing::info!("[CONFIG] Listing server tools: {}", tools),
            Err(e) => tracing::warn!("[CONFIG] Could not reach listing server at {}: {}", url, e),
        }
    }

    let deps = AgentDeps::from_config(&config)?;
    let mut orchestrator = Orchestrator::new(deps, config.conversation.clone());

    let stdin = std::io::stdin();
    run_session(&mut orchestrator, stdin.lock(), std::io::stdout()).await
}
