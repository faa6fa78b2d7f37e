mod catalog;
mod config;
mod errors;
mod form;
mod layout;
mod models;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::TemplateCatalog;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a malformed variable aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae v{}", env!("CARGO_PKG_VERSION"));

    // Load the template catalog (embedded unless TEMPLATES_PATH overrides it)
    let catalog = match &config.templates_path {
        Some(path) => TemplateCatalog::from_path(path)
            .with_context(|| format!("Failed to load TEMPLATES_PATH {}", path.display()))?,
        None => TemplateCatalog::embedded().context("Embedded template catalog is invalid")?,
    };
    info!(
        "Template catalog ready: {}",
        catalog
            .iter()
            .map(|t| format!("{} ({})", t.kind, t.id))
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!(
        "Limits: {} bytes of form data, {} entries per section, placeholders {}",
        config.max_data_bytes,
        config.max_entries_per_section,
        if config.render_placeholders { "on" } else { "off" }
    );

    let state = AppState::new(config.clone(), catalog);

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
