//! Changefeed processor entry point.

use std::error::Error;

use changefeed_processor::config::ProcessorConfig;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = ProcessorConfig::from_env()?;

    // Initialize tracing subscriber. LOG_LEVEL wins over RUST_LOG.
    let filter = match config.log_level.as_deref() {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    tracing::info!(
        event_bus = %config.event_bus,
        event_source = %config.event_source,
        "Starting Changefeed processor"
    );

    // Build application state.
    let app_state = changefeed_processor::build_state(&config)?;

    // Build router.
    let app = changefeed_processor::build_router(app_state).layer(TraceLayer::new_for_http());

    // Start server.
    let addr = config.bind_address()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
