//! Bounded dedup set of message ids
//!
//! Shared between inbound relay processing and outbound queueing: a
//! message id seen on either path suppresses the other. Bounded so a
//! long-running low-power device never grows it without limit.

use std::collections::{HashSet, VecDeque};

/// Hard cap on tracked ids
pub const SEEN_CAP: usize = 1000;

/// Ids retained after an overflow eviction (most recent first)
pub const SEEN_RETAIN: usize = 500;

/// Insertion-ordered bounded set of message ids
#[derive(Debug, Default)]
pub struct SeenIdSet {
    order: VecDeque<String>,
    set: HashSet<String>,
}

impl SeenIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot, oldest id first.
    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut seen = Self::new();
        for id in ids {
            seen.insert(&id);
        }
        seen
    }

    /// Record an id. Returns `true` if it was not already present.
    /// When the set exceeds [`SEEN_CAP`], the oldest entries are
    /// evicted down to [`SEEN_RETAIN`].
    pub fn insert(&mut self, id: &str) -> bool {
        if !self.set.insert(id.to_string()) {
            return false;
        }
        self.order.push_back(id.to_string());

        if self.order.len() > SEEN_CAP {
            while self.order.len() > SEEN_RETAIN {
                if let Some(oldest) = self.order.pop_front() {
                    self.set.remove(&oldest);
                }
            }
        }
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.set.clear();
    }

    /// Snapshot of all tracked ids, oldest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}
