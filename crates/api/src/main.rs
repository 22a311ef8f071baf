use std::sync::Arc;

use anyhow::Context;

use anime_infra::config::AppConfig;
use anime_infra::store::InMemoryAnimeStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    anime_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    if config.print_dev_tokens {
        anime_api::app::services::mint_dev_tokens(config.jwt_secret.clone())
            .await
            .context("failed to mint dev tokens")?;
    }

    let store = Arc::new(InMemoryAnimeStore::with_names(config.seed_animes.iter().cloned()));
    tracing::info!(seeded = store.len(), "anime store ready");

    let app = anime_api::app::build_app(config.jwt_secret.as_bytes(), store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
