// src/feed/mod.rs
pub mod fetcher;
pub mod reconcile;
pub mod scheduler;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

pub use fetcher::{parse_envelope, FetchError, HttpFeedSource};
pub use reconcile::{reconcile, Flagged, Reconciled};
pub use scheduler::{Phase, Scheduler, SessionState};
pub use types::{Entry, FeedResponse, FeedSource, Priority};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_polls_total", "Polls dispatched to the feed endpoint.");
        describe_counter!(
            "feed_polls_dropped_total",
            "Poll requests dropped because a fetch was already in flight."
        );
        describe_counter!(
            "feed_poll_errors_total",
            "Failed polls, labelled by kind (network, http, protocol)."
        );
        describe_counter!(
            "feed_entries_new_total",
            "Entries flagged new relative to the previous snapshot."
        );
        describe_histogram!("feed_fetch_ms", "Feed fetch time in milliseconds.");
        describe_gauge!("feed_known_ids", "Size of the current known id set.");
        describe_gauge!("feed_countdown_secs", "Ticks until the next poll.");
        describe_gauge!(
            "feed_last_success_ts",
            "Unix ts of the last successful reconciliation."
        );
    });
}
