// src/feed/scheduler.rs
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::fetcher::FetchError;
use crate::feed::reconcile::reconcile;
use crate::feed::types::{FeedResponse, FeedSource};
use crate::sanitize::sanitize;
use crate::status::{aggregate, overall, PollOutcome};
use crate::timeline::{Presenter, RenderItem, TimelineUpdate};

type FetchFuture = Pin<Box<dyn Future<Output = Result<FeedResponse, FetchError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    CountingDown,
    Fetching,
}

/// Per-session state. Owned by one `Scheduler`; lives as long as it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Ids of the most recent successful response.
    pub known_ids: HashSet<String>,
    pub in_flight: bool,
    /// Ticks until the next poll, in `0..=cadence`.
    pub countdown: u32,
    /// Set after the first successful reconciliation.
    pub synced: bool,
}

impl SessionState {
    pub fn new(cadence: u32) -> Self {
        Self {
            known_ids: HashSet::new(),
            in_flight: false,
            countdown: cadence,
            synced: false,
        }
    }
}

/// Poll cadence state machine.
///
/// The synchronous methods (`start`, `tick`, `request_poll`, `complete`) hold
/// all the logic; `run` is the event loop that feeds them ticks and triggers
/// and owns the one outstanding fetch.
pub struct Scheduler {
    source: Arc<dyn FeedSource>,
    presenter: Arc<dyn Presenter>,
    cadence: u32,
    tick_every: Duration,
    phase: Phase,
    state: SessionState,
}

impl Scheduler {
    pub fn new(source: Arc<dyn FeedSource>, presenter: Arc<dyn Presenter>, cadence: u32) -> Self {
        let cadence = cadence.max(1);
        Self {
            source,
            presenter,
            cadence,
            tick_every: Duration::from_secs(1),
            phase: Phase::Idle,
            state: SessionState::new(cadence),
        }
    }

    pub fn with_tick(mut self, every: Duration) -> Self {
        self.tick_every = every;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cadence(&self) -> u32 {
        self.cadence
    }

    /// Leave `Idle` and request the cold-start poll. Returns true when a
    /// fetch must be dispatched.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        crate::feed::ensure_metrics_described();
        self.phase = Phase::CountingDown;
        self.presenter.countdown(self.state.countdown);
        self.request_poll()
    }

    /// Check-and-set of the in-flight guard. Returns true when the caller
    /// must dispatch a fetch; false when one is already outstanding (or the
    /// scheduler has not been started), in which case nothing changes.
    pub fn request_poll(&mut self) -> bool {
        if self.phase == Phase::Idle {
            tracing::debug!(target: "feed", "poll requested before start; ignored");
            return false;
        }
        if self.state.in_flight {
            tracing::debug!(target: "feed", "poll already in flight; request dropped");
            counter!("feed_polls_dropped_total").increment(1);
            return false;
        }
        self.state.in_flight = true;
        self.phase = Phase::Fetching;
        counter!("feed_polls_total").increment(1);
        self.presenter.status(overall(PollOutcome::InProgress));
        true
    }

    /// One time unit elapsed. Only counts down while `CountingDown`; at zero
    /// the poll is requested. Returns true when a fetch must be dispatched.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::CountingDown {
            return false;
        }
        self.state.countdown = self.state.countdown.saturating_sub(1);
        self.presenter.countdown(self.state.countdown);
        gauge!("feed_countdown_secs").set(f64::from(self.state.countdown));
        if self.state.countdown == 0 {
            return self.request_poll();
        }
        false
    }

    /// Apply the result of the outstanding fetch. Errors leave the timeline
    /// and known set untouched. Either way the cadence restarts in full.
    pub fn complete(&mut self, result: Result<FeedResponse, FetchError>) {
        if !self.state.in_flight {
            tracing::warn!(target: "feed", "fetch completion without a poll in flight; ignored");
            return;
        }

        match result {
            Ok(resp) => self.apply_snapshot(resp),
            Err(e) => {
                tracing::warn!(
                    target: "feed",
                    source = self.source.name(),
                    kind = e.kind(),
                    error = %e,
                    "feed fetch failed; keeping last known timeline"
                );
                counter!("feed_poll_errors_total", "kind" => e.kind()).increment(1);
                self.presenter.status(overall(PollOutcome::Failed));
            }
        }

        self.state.in_flight = false;
        self.state.countdown = self.cadence;
        self.phase = Phase::CountingDown;
        self.presenter.countdown(self.state.countdown);
    }

    fn apply_snapshot(&mut self, resp: FeedResponse) {
        let event_count = resp.event_count();
        let updated_display = resp.updated_display.as_deref().map(sanitize);
        let indicators = aggregate(&resp.sources_status);

        let cold_start = !self.state.synced;
        let reconciled = reconcile(resp.entries, &self.state.known_ids, cold_start);
        let new_count = reconciled.new_count();

        let update = TimelineUpdate {
            items: reconciled.items.iter().map(RenderItem::from).collect(),
            event_count,
            updated_display,
        };
        self.presenter.timeline(&update);

        self.state.known_ids = reconciled.known_ids;
        self.state.synced = true;

        self.presenter.sources(&indicators);
        self.presenter.status(overall(PollOutcome::Succeeded));

        counter!("feed_entries_new_total").increment(new_count as u64);
        gauge!("feed_known_ids").set(self.state.known_ids.len() as f64);
        gauge!("feed_last_success_ts").set(chrono::Utc::now().timestamp() as f64);

        tracing::info!(
            target: "feed",
            entries = update.items.len(),
            new = new_count,
            cold_start,
            sources = indicators.len(),
            "feed cycle applied"
        );
    }

    fn fetch_future(&self) -> FetchFuture {
        let source = Arc::clone(&self.source);
        Box::pin(async move { source.fetch().await })
    }

    /// Request, await and apply one poll. Returns false if the request was
    /// dropped by the in-flight guard.
    pub async fn poll_once(&mut self) -> bool {
        if !self.request_poll() {
            return false;
        }
        let res = self.fetch_future().await;
        self.complete(res);
        true
    }

    /// Event loop: ticks, explicit triggers and the single outstanding fetch
    /// are interleaved on one task. Runs until the task is aborted.
    pub async fn run(mut self, mut triggers: mpsc::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.tick_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the countdown starts one unit later.
        ticker.tick().await;

        let mut pending: Option<FetchFuture> = None;
        if self.start() {
            pending = Some(self.fetch_future());
        }
        let mut triggers_open = true;

        loop {
            tokio::select! {
                res = async {
                    match pending.as_mut() {
                        Some(fut) => fut.await,
                        None => std::future::pending().await,
                    }
                }, if pending.is_some() => {
                    pending = None;
                    self.complete(res);
                }
                _ = ticker.tick() => {
                    if self.tick() {
                        pending = Some(self.fetch_future());
                    }
                }
                msg = triggers.recv(), if triggers_open => match msg {
                    Some(()) => {
                        if self.request_poll() {
                            pending = Some(self.fetch_future());
                        }
                    }
                    None => triggers_open = false,
                },
            }
        }
    }

    /// Spawn `run` on the current runtime. The returned sender is the explicit
    /// refresh trigger.
    pub fn spawn(self) -> (JoinHandle<()>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(self.run(rx));
        (handle, tx)
    }
}
