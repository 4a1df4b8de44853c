use std::sync::Arc;

use catalog::DestinationCatalog;
use server::config::Config;
use server::{router, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let catalog = Arc::new(DestinationCatalog::builtin()?);

    if config.generation.api_key.is_none() {
        warn!("IMAGEROUTER_API_KEY not set; generation requests will fail");
    }
    if config.hosting.credentials().is_none() {
        warn!("hosting credentials incomplete; generation requests will fail");
    }
    if config.cards.is_none() {
        info!("no card table configured; serving cards from the built-in catalog");
    }

    let state = AppState::from_config(&config, catalog);
    let app = router(state);

    info!("cultureverse relay listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
