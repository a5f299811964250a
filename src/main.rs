use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cms_api_rust::api::{self, AppState};
use cms_api_rust::config;
use cms_api_rust::database::{SeedFile, StoreManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CMS_JWT_SECRET, CMS_SEED_FILE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting CMS API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("CMS_JWT_SECRET must be set outside development");
    }

    let stores = StoreManager::new();
    if let Some(path) = &config.seed_file {
        let seed = SeedFile::load(path).with_context(|| format!("failed to read seed file {}", path))?;
        let created = seed
            .apply(&stores, config.tree.max_navigation_depth)
            .await
            .with_context(|| format!("failed to apply seed file {}", path))?;
        tracing::info!("Seeded {} teams from {}", created, path);
    }

    let state = AppState::from_config(stores);
    let cache = state.cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            let purged = cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!("Purged {} expired permission cache entries", purged);
            }
        }
    });

    let app = api::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("CMS API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("CMS API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
