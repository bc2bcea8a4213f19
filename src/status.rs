//! Feed health vocabulary.
//!
//! Raw per-source states reported by the backend are mapped onto a fixed set of
//! indicators, and the scheduler's poll outcome onto an overall feed status.
//! Everything here is a pure mapping; the presentation layer only ever sees
//! these enums.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Health of one upstream source as reported in `sources_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum SourceState {
    Ok,
    Cached,
    /// Any other report (`"timeout"`, `"error"`, non-string values, ...).
    Down(String),
}

impl SourceState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ok" => SourceState::Ok,
            "cached" => SourceState::Cached,
            other => SourceState::Down(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceState::Ok => "ok",
            SourceState::Cached => "cached",
            SourceState::Down(s) => s,
        }
    }
}

impl From<SourceState> for String {
    fn from(s: SourceState) -> Self {
        s.as_str().to_string()
    }
}

impl<'de> Deserialize<'de> for SourceState {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = serde_json::Value::deserialize(d)?;
        Ok(match v {
            serde_json::Value::String(s) => SourceState::parse(&s),
            other => SourceState::Down(other.to_string()),
        })
    }
}

/// Per-source dot shown next to the feed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceIndicator {
    Online,
    Warning,
    Offline,
}

impl SourceIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceIndicator::Online => "online",
            SourceIndicator::Warning => "warning",
            SourceIndicator::Offline => "offline",
        }
    }
}

impl From<&SourceState> for SourceIndicator {
    fn from(s: &SourceState) -> Self {
        match s {
            SourceState::Ok => SourceIndicator::Online,
            SourceState::Cached => SourceIndicator::Warning,
            SourceState::Down(_) => SourceIndicator::Offline,
        }
    }
}

/// Overall feed status shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Loading,
    Ok,
    Error,
}

impl OverallStatus {
    /// Header label used by the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Loading => "FETCHING",
            OverallStatus::Ok => "LIVE",
            OverallStatus::Error => "ERROR",
        }
    }
}

/// Where the current poll cycle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    InProgress,
    Succeeded,
    Failed,
}

pub fn aggregate(per_source: &BTreeMap<String, SourceState>) -> BTreeMap<String, SourceIndicator> {
    per_source
        .iter()
        .map(|(name, state)| (name.clone(), SourceIndicator::from(state)))
        .collect()
}

pub fn overall(outcome: PollOutcome) -> OverallStatus {
    match outcome {
        PollOutcome::InProgress => OverallStatus::Loading,
        PollOutcome::Succeeded => OverallStatus::Ok,
        PollOutcome::Failed => OverallStatus::Error,
    }
}

/// Tooltip text for a source dot, e.g. `"REUTERS: cached"`.
pub fn indicator_title(name: &str, state: &SourceState) -> String {
    format!("{}: {}", name.to_uppercase(), state.as_str())
}
