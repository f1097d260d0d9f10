use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use startupintel::app::AppContext;
use startupintel::cli::Cli;
use startupintel::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(history) = cli.history {
        config.history_path = history;
    }
    if let Some(workers) = cli.workers {
        config.browser.max_concurrency = workers;
    }

    info!("StartupIntel pipeline starting");
    let ctx = AppContext::new(config)?;
    let scrape = ctx.scrape_context().await;
    ctx.pipeline.run(scrape).await;

    Ok(())
}
