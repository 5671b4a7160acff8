//! TaskFlow API server: loads settings and the resource catalog, opens the pool,
//! ensures tables, serves until SIGINT/SIGTERM, then closes the pool.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use taskflow_api::{app_with_settings, ensure_tables, load_catalog, AppState, PgStore, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskflow_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let catalog = load_catalog(settings.resources_path.as_deref()).await?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    if settings.bootstrap {
        ensure_tables(&pool, &catalog).await?;
    }

    let resources: Vec<&str> = catalog.names().collect();
    tracing::info!(?resources, "serving resources");

    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), catalog);
    let app = app_with_settings(state, &settings);

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
