use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use technoid_api::rate_limit::{self, RateLimiter};
use technoid_api::state::{AppState, AppStateInner};
use technoid_server::config::{Config, SERVICE_NAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    technoid_server::init_tracing();

    let config = Config::from_env()?;

    // Init database
    let db = technoid_db::Database::open(&config.db_path, config.db_readers)?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        limiter: RateLimiter::new(config.rate_limit),
        admin_key: config.admin_key.clone(),
        service_name: SERVICE_NAME.to_string(),
    });

    tokio::spawn(rate_limit::run_cleanup_loop(state.clone()));

    let app = technoid_api::app(state, &config.site_dir);

    let addr = config.bind_addr()?;
    info!("Technoid server listening on {}", addr);
    info!("Serving site from {}", config.site_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
