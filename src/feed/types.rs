// src/feed/types.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::feed::fetcher::FetchError;
use crate::status::SourceState;

/// Editorial urgency of an entry. Anything unrecognized is `Routine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Flash,
    Urgent,
    #[default]
    Routine,
}

impl Priority {
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "flash" => Priority::Flash,
            "urgent" => Priority::Urgent,
            _ => Priority::Routine,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Flash => "flash",
            Priority::Urgent => "urgent",
            Priority::Routine => "routine",
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Option::<serde_json::Value>::deserialize(d)?;
        Ok(match v {
            Some(serde_json::Value::String(s)) => Priority::from_label(&s),
            _ => Priority::Routine,
        })
    }
}

/// One timeline item as delivered by the feed endpoint (raw, untrusted text).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time_display: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_tag: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub source_class: Option<String>,
}

/// Validated feed envelope. Only constructed once `status == "ok"` and
/// `entries` is a sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    pub entries: Vec<Entry>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub entry_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub updated_display: Option<String>,
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources_status: BTreeMap<String, SourceState>,
}

impl FeedResponse {
    /// Count shown on the dashboard: the reported total, or the number of
    /// entries when the backend omits it (or reports zero).
    pub fn event_count(&self) -> usize {
        match self.entry_count {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => self.entries.len(),
        }
    }
}

/// Anything able to produce one authoritative feed snapshot per call.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<FeedResponse, FetchError>;
    fn name(&self) -> &str;
}

// Null/missing → "", numbers and bools → their JSON text.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_opt_text(d)?.unwrap_or_default())
}

fn lenient_opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    use serde::de::Error;
    let v = Option::<serde_json::Value>::deserialize(d)?;
    match v {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected text, found {}",
            json_kind(&other)
        ))),
    }
}

// Counts may arrive as numbers or numeric strings; anything else is "absent".
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// A missing or non-object `sources_status` reports no sources.
fn lenient_sources<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, SourceState>, D::Error> {
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match v {
        Some(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(name, raw)| {
                let state = match raw {
                    serde_json::Value::String(s) => SourceState::parse(&s),
                    other => SourceState::Down(other.to_string()),
                };
                (name, state)
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}

pub(crate) fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
