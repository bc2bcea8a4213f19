//! Meridian feed service binary.
//! Loads config, starts the poll loop and serves the dashboard snapshot API.

use meridian_feed::{config::FeedConfig, metrics::Metrics, router, start_engine};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact fmt logs filtered by `RUST_LOG`. Uses `try_init` so a subscriber
/// already installed by the hosting runtime wins.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("meridian_feed=info,feed=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = FeedConfig::load_default()?;
    let metrics = Metrics::init(&cfg)?;

    let (state, _engine) = start_engine(&cfg)?;
    let router = router(state).merge(metrics.router());

    Ok(router.into())
}
