//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development of the admin preview when you want the REST server (with
//! OpenAPI/Swagger UI) without the rest of the workspace's `masthead-run` start-up.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Masthead REST API server
///
/// # Environment Variables
/// - `MASTHEAD_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MASTHEAD_REQUIRE_PRIMARY_CATEGORY`, `MASTHEAD_MAX_DOCUMENT_DEPTH`,
///   `MASTHEAD_EXCERPT_CHARS`: see `api_shared::config`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("masthead=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = api_shared::config::rest_addr();
    let cfg = Arc::new(api_shared::config::core_config_from_env()?);

    let languages = masthead_core::document::warm_up();
    tracing::info!("-- Loaded {} highlighting grammars", languages);
    tracing::info!("-- Starting Masthead REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::router(cfg)).await?;

    Ok(())
}
