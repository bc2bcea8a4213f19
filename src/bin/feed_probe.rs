//! One-shot fetch of the configured feed endpoint. Logs the envelope summary
//! and per-source indicators; exits non-zero when the fetch fails.

use meridian_feed::config::FeedConfig;
use meridian_feed::feed::{FeedSource, HttpFeedSource};
use meridian_feed::status::{aggregate, indicator_title};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = FeedConfig::load_default()?;
    let source = HttpFeedSource::from_config(&cfg)?;

    let resp = match source.fetch().await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(url = source.url(), kind = e.kind(), "probe failed: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        url = source.url(),
        entries = resp.entries.len(),
        event_count = resp.event_count(),
        updated = resp.updated_display.as_deref().unwrap_or("-"),
        "feed ok"
    );

    let indicators = aggregate(&resp.sources_status);
    for (name, state) in &resp.sources_status {
        let ind = indicators[name];
        tracing::info!("{} -> {}", indicator_title(name, state), ind.as_str());
    }

    println!("feed-probe done");
    Ok(())
}
