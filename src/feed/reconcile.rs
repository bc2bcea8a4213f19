// src/feed/reconcile.rs
use std::collections::HashSet;

use crate::feed::types::Entry;

/// An entry together with its novelty relative to the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flagged {
    pub entry: Entry,
    pub is_new: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Response order, never re-sorted.
    pub items: Vec<Flagged>,
    /// Exactly the ids of this response; replaces the previous known set.
    pub known_ids: HashSet<String>,
}

impl Reconciled {
    pub fn new_count(&self) -> usize {
        self.items.iter().filter(|f| f.is_new).count()
    }
}

/// Classify `entries` against `known_ids`.
///
/// `cold_start` is true for the first successful reconciliation of a session;
/// nothing is new relative to an empty baseline, so every flag is cleared.
/// Entries from the previous snapshot that are absent here are simply gone:
/// the backend is authoritative per cycle, and an id that comes back later is
/// new again.
pub fn reconcile(entries: Vec<Entry>, known_ids: &HashSet<String>, cold_start: bool) -> Reconciled {
    let mut next_ids = HashSet::with_capacity(entries.len());
    let mut items = Vec::with_capacity(entries.len());

    for entry in entries {
        let is_new = !cold_start && !known_ids.contains(&entry.id);
        next_ids.insert(entry.id.clone());
        items.push(Flagged { entry, is_new });
    }

    Reconciled {
        items,
        known_ids: next_ids,
    }
}
