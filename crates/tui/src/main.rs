mod app;
mod form;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Arc,
};

use chimix_core::{
    catalog::CatalogService,
    config::{self, AppConfig},
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(
        base_url = %config.base_url,
        key = %config.masked_key(),
        page_size = config.page_size,
        "Configuration loaded"
    );

    let service =
        CatalogService::from_config(&config).context("failed to build catalog service")?;
    info!(mode = ?service.mode(), "Catalog service ready");

    let mut app = app::ChimixApp::new(Arc::new(service));
    app.run().await
}

/// Log to `logs/chimix.log` only; the terminal UI owns stdout.
fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("chimix.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
