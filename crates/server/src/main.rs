// canary-server main.rs
// HTTP service for the canary security-event monitor

use canary_server::{build_router, AppState, EventStore, ServerConfig, SqliteEventStore, StartupError};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canary_server=info".into()),
        )
        .init();

    let config = ServerConfig::parse();
    config.validate()?;

    let db_path = config.database_path();
    tracing::info!("📁 Database: {:?}", db_path);
    tracing::info!("🪤 Canary paths: {}", config.canary_paths.join(", "));
    tracing::info!("Error posture: {:?}", config.error_posture);

    let store: Arc<dyn EventStore> = Arc::new(SqliteEventStore::open(&db_path)?);
    let state = Arc::new(AppState::new(
        store,
        config.canary_paths.clone(),
        config.error_posture,
    ));

    let app = build_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Canary monitor running at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
