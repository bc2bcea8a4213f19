// src/timeline.rs
//! Display model handed to the presentation layer, plus the `Presenter`
//! seam the scheduler publishes through. Nothing here touches a document;
//! it is plain data.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::reconcile::Flagged;
use crate::feed::types::Entry;
use crate::sanitize::{sanitize, sanitize_opt};
use crate::status::{OverallStatus, SourceIndicator};

/// Styling class for well-known source tags.
fn known_source_class(tag: &str) -> Option<&'static str> {
    match tag {
        "REUTERS" | "BBC" | "ALJAZEERA" | "AP" | "TOI" | "MEDIA" => Some("media"),
        "IDF" => Some("idf"),
        "IRGC" => Some("irgc"),
        "POTUS" => Some("potus"),
        "OSINT" => Some("osint"),
        _ => None,
    }
}

/// An entry with every text field sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub id: String,
    /// Machine-readable timestamp (rendered as an attribute).
    pub time: String,
    pub time_display: String,
    pub priority_class: String,
    pub priority_label: String,
    pub source_tag: String,
    pub source_class: String,
    pub title: String,
    pub content: String,
}

impl From<&Entry> for DisplayEntry {
    fn from(e: &Entry) -> Self {
        let source_class = known_source_class(&e.source_tag)
            .map(str::to_string)
            .or_else(|| {
                e.source_class
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .map(sanitize)
            })
            .unwrap_or_else(|| "media".to_string());

        let source_tag = if e.source_tag.is_empty() {
            "NEWS".to_string()
        } else {
            sanitize(&e.source_tag)
        };

        let title = sanitize_opt(e.title.as_deref());
        let content = if e.content.is_empty() {
            title.clone()
        } else {
            sanitize(&e.content)
        };

        Self {
            id: sanitize(&e.id),
            time: sanitize(&e.time),
            time_display: sanitize(&e.time_display),
            priority_class: e.priority.as_str().to_string(),
            priority_label: e.priority.as_str().to_ascii_uppercase(),
            source_tag,
            source_class,
            title,
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderItem {
    pub entry: DisplayEntry,
    pub is_new: bool,
}

impl From<&Flagged> for RenderItem {
    fn from(f: &Flagged) -> Self {
        Self {
            entry: DisplayEntry::from(&f.entry),
            is_new: f.is_new,
        }
    }
}

/// Timeline payload published after a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineUpdate {
    pub items: Vec<RenderItem>,
    pub event_count: usize,
    /// Sanitized; `None` when the response did not carry one.
    pub updated_display: Option<String>,
}

/// Presentation seam. The scheduler calls these from its event loop and
/// never blocks on them for long.
pub trait Presenter: Send + Sync {
    fn status(&self, status: OverallStatus);
    fn countdown(&self, secs: u32);
    fn sources(&self, indicators: &BTreeMap<String, SourceIndicator>);
    fn timeline(&self, update: &TimelineUpdate);
}

/// Everything the dashboard shows, as last published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub status: OverallStatus,
    pub status_label: String,
    pub countdown: u32,
    pub timeline: Vec<RenderItem>,
    pub event_count: usize,
    pub updated_display: Option<String>,
    pub sources: BTreeMap<String, SourceIndicator>,
    pub last_status_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn new(countdown: u32) -> Self {
        Self {
            status: OverallStatus::Loading,
            status_label: OverallStatus::Loading.label().to_string(),
            countdown,
            timeline: Vec::new(),
            event_count: 0,
            updated_display: None,
            sources: BTreeMap::new(),
            last_status_at: None,
            last_success_at: None,
        }
    }
}

/// Keeps the latest snapshot behind a shared lock for the HTTP surface.
#[derive(Clone)]
pub struct SnapshotPresenter {
    inner: Arc<RwLock<DashboardSnapshot>>,
}

impl SnapshotPresenter {
    pub fn new(initial_countdown: u32) -> Self {
        Self {
            inner: Arc::new(RwLock::new(DashboardSnapshot::new(initial_countdown))),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut DashboardSnapshot)) {
        match self.inner.write() {
            Ok(mut g) => f(&mut g),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl Presenter for SnapshotPresenter {
    fn status(&self, status: OverallStatus) {
        let now = Utc::now();
        self.update(|s| {
            s.status = status;
            s.status_label = status.label().to_string();
            s.last_status_at = Some(now);
            if status == OverallStatus::Ok {
                s.last_success_at = Some(now);
            }
        });
    }

    fn countdown(&self, secs: u32) {
        self.update(|s| s.countdown = secs);
    }

    fn sources(&self, indicators: &BTreeMap<String, SourceIndicator>) {
        self.update(|s| s.sources = indicators.clone());
    }

    fn timeline(&self, update: &TimelineUpdate) {
        self.update(|s| {
            s.timeline = update.items.clone();
            s.event_count = update.event_count;
            // Banner keeps its previous text unless the feed sent a new one.
            if let Some(d) = update.updated_display.as_ref().filter(|d| !d.is_empty()) {
                s.updated_display = Some(d.clone());
            }
        });
    }
}
