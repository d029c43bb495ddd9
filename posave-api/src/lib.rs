pub mod handlers;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use log::{info, warn};
use posave_common::{ServerConfig, launch_browser, print_banner, server_url};
use posave_store::initialize_store;
use posave_store::repository::DocumentRepository;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct AppState {
    pub repository: DocumentRepository,
    pub html_file: PathBuf,
}

/// Flat exact-match routing. A known path hit with the wrong method gets the
/// same 404 as an unknown path.
pub fn router(repository: DocumentRepository, html_file: impl Into<PathBuf>) -> Router {
    let state = Arc::new(AppState {
        repository,
        html_file: html_file.into(),
    });

    Router::new()
        .route("/", get(handlers::index).fallback(handlers::not_found))
        .route("/index.html", get(handlers::index).fallback(handlers::not_found))
        .route("/load", get(handlers::load).fallback(handlers::not_found))
        .route("/save", post(handlers::save).fallback(handlers::not_found))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(handlers::preflight))
        .with_state(state)
}

async fn bind(config: &ServerConfig) -> Result<(TcpListener, Router)> {
    let repository = initialize_store(config).await?;
    let app = router(repository, config.html_file.clone());
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    Ok((listener, app))
}

/// Runs the server until Ctrl+C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let (listener, app) = bind(&config).await?;
    let addr = listener.local_addr()?;
    info!("Listening on {addr}");

    print_banner(addr.port(), &config.data_file_name());
    if config.open_browser {
        launch_browser(&server_url(addr.port()));
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    info!("Server stopped");
    Ok(())
}

/// Starts the server in the background without banner or browser and hands
/// back the address it actually bound.
pub async fn spawn(config: ServerConfig) -> Result<(SocketAddr, JoinHandle<()>)> {
    let (listener, app) = bind(&config).await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("Server on {addr} exited: {e}");
        }
    });
    Ok((addr, handle))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
