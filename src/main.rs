use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_shared::config::{core_config_from_env, rest_addr};

/// Main entry point for the Masthead application
///
/// Resolves configuration once, builds the formatting ruleset ahead of the first request, and
/// serves the REST API used by the admin preview.
///
/// # Environment Variables
/// - `MASTHEAD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MASTHEAD_REQUIRE_PRIMARY_CATEGORY`: whether articles need a primary category (default: true)
/// - `MASTHEAD_MAX_DOCUMENT_DEPTH`: nesting limit for stored documents (default: 64)
/// - `MASTHEAD_EXCERPT_CHARS`: excerpt length in characters (default: 160)
///
/// A `.env` file in the working directory is loaded first if present.
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("masthead=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(core_config_from_env()?);
    let rest_addr = rest_addr();

    let languages = masthead_core::document::warm_up();
    tracing::info!(
        policy = ?cfg.primary_policy(),
        max_depth = cfg.max_document_depth(),
        languages,
        "++ Masthead configuration resolved"
    );
    tracing::info!("++ Starting Masthead REST on {}", rest_addr);

    let app = api_rest::router(cfg);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
