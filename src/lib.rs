// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod feed;
pub mod metrics;
pub mod sanitize;
pub mod status;
pub mod timeline;

use std::sync::Arc;

use tokio::task::JoinHandle;

pub use crate::api::{router, AppState};
pub use crate::config::FeedConfig;
pub use crate::feed::{FeedSource, HttpFeedSource, Scheduler};
pub use crate::timeline::{DashboardSnapshot, Presenter, SnapshotPresenter};

/// Wire the HTTP feed source, the snapshot presenter and the scheduler, and
/// start the poll loop on the current runtime. The returned state serves the
/// dashboard router.
pub fn start_engine(cfg: &FeedConfig) -> anyhow::Result<(AppState, JoinHandle<()>)> {
    let source = HttpFeedSource::from_config(cfg)?;
    tracing::info!(target: "feed", url = source.url(), cadence = cfg.poll_cadence_secs, "starting feed engine");

    let presenter = SnapshotPresenter::new(cfg.poll_cadence_secs);
    let scheduler = Scheduler::new(
        Arc::new(source),
        Arc::new(presenter.clone()),
        cfg.poll_cadence_secs,
    );
    let (handle, refresh) = scheduler.spawn();

    Ok((AppState { presenter, refresh }, handle))
}
