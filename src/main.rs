use ritual_diary::{
    AppState, Config, Store,
    notify::NotificationWatcher,
    oracle::{GeminiClient, Oracle},
    router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = Arc::new(Store::open(config.data_path.clone()).await);
    let watcher = NotificationWatcher::spawn(store.clone(), config.notify_poll);

    let client = GeminiClient::new(config.api_key.clone(), config.base_url.clone());
    if !client.has_key() {
        warn!("GEMINI_API_KEY is not set; oracle features will be unavailable");
    }
    let oracle = Oracle::new(client, config.models.clone());
    let state = AppState::new(store, oracle, watcher.subscribe());
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(data = %config.data_path.display(), "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(watcher);
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}
