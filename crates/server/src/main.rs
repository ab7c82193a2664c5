//! birdie host entry point.
//!
//! Boots the offline cache router behind an HTTP proxy. The client shell
//! points at `listen_addr`; everything it requests goes through the router,
//! and `/__birdie/*` drives lifecycle, sync and push events.
//! Logging goes to stderr as JSON.

use anyhow::Result;
use birdie_core::AppConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod app;
mod control;
mod error;
mod proxy;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let listen_addr = config.listen_addr.clone();
    tracing::info!(
        db = %config.db_path.display(),
        static_store = %config.static_cache_name(),
        api_store = %config.api_cache_name(),
        "starting birdie"
    );

    let state = app::AppState::from_config(config).await?;
    state.router.on_install().await;
    let deleted = state.router.on_activate().await?;
    if !deleted.is_empty() {
        tracing::info!(?deleted, "retired old cache stores");
    }

    let listener = TcpListener::bind(&listen_addr).await?;
    tracing::info!("birdie listening on {listen_addr}");

    axum::serve(listener, app::build_app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    Ok(())
}
