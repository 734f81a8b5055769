mod config;
mod errors;
mod generation;
mod pagination;
mod render;
mod routes;
mod state;
mod template;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::ManifestRenderer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::template::FsTemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Template store (read-only)
    if !config.templates_dir.is_dir() {
        warn!(
            "Templates directory {} does not exist; every generation will fail with TemplateNotFound",
            config.templates_dir.display()
        );
    }
    let templates = Arc::new(FsTemplateStore::new(config.templates_dir.clone()));
    info!("Template store at {}", templates.root().display());

    info!(
        "Page counters: current='{}' total='{}', statement page size {}",
        config.page_counters.current, config.page_counters.total, config.default_items_per_page
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        templates,
        renderer: Arc::new(ManifestRenderer),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
