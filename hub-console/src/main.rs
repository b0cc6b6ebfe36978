use anyhow::{Context, Result};
use hub_console::{default_registry, Console, ConsolePrompt, ConsoleSink};
use integration_hub::config::HubConfig;
use integration_hub::{BackendClient, IntegrationController};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with console output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hub_console=info,integration_hub=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Hub console starting...");

    let config = HubConfig::load().context("Failed to load configuration")?;

    info!(
        backend_url = %config.backend.base_url,
        user_id = %config.session.user_id,
        org_id = %config.session.org_id,
        poll_interval_ms = config.provider.poll_interval_ms,
        "Configuration loaded"
    );

    let backend = BackendClient::new(config.backend.base_url.as_str());
    let registry = default_registry(&backend, &config.provider, Arc::new(ConsolePrompt));
    let controller = IntegrationController::new(
        Arc::new(registry),
        backend,
        Arc::new(ConsoleSink),
        config.session.identity(),
    );

    let mut console = Console::new(controller);
    console.run(tokio::io::stdin()).await?;

    info!("Hub console stopped");
    Ok(())
}
