use scoring_server::{AppState, ServerConfig, router, spawn_cleanup};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.addr;
    if let Err(err) = tokio::fs::create_dir_all(&config.tile_image_root).await {
        tracing::warn!("failed to create tile image root: {err}");
    }

    let state = AppState::new(config);
    let _cleanup = spawn_cleanup(state.clone());
    let app = router(state);

    info!("scoring server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
