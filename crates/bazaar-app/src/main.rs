use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Server};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use bazaar_app::app::router;
use bazaar_core::config::load_config;
use bazaar_db::{
    db::{connection::create_pool, migrations::run_migrations},
    store::{MemoryStore, PgStore, Store},
};
use bazaar_service::account::{ensure_bootstrap_admin, ensure_roles};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Bazaar server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store: Arc<dyn Store> = if config.database.is_memory() {
        tracing::warn!("Using the in-memory store; all data is lost on shutdown");
        Arc::new(MemoryStore::new())
    } else {
        run_migrations(&config.database.url).await?;
        let pool = create_pool(
            &config.database.url,
            u32::from(config.database.max_connections),
        )
        .await?;
        tracing::info!("Database connection pool created.");
        Arc::new(PgStore::new(pool))
    };

    ensure_roles(store.as_ref(), &config.auth).await?;
    if let Some(admin) = ensure_bootstrap_admin(store.as_ref(), &config.auth).await? {
        tracing::info!(user_id = %admin.user_id, username = %admin.username, "Bootstrap admin ready");
    }

    let router = router(&config, store)?;

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;
    let server = Server::new(acceptor);

    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutting down");
        handle.stop_graceful(None);
    });

    tracing::info!("Server listening on {bind_addr}");

    server.serve(router).await;

    Ok(())
}
