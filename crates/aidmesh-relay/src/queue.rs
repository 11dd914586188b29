//! Priority-laned outbound queue with retry/backoff and durable state
//!
//! Three FIFO lanes with strict HIGH > NORMAL > LOW dequeue order.
//! Every mutation snapshots the lanes and the shared seen-set through
//! the durable store so an abrupt termination does not silently lose
//! queued emergency traffic.

use aidmesh_protocol::{clamp_ttl, MeshMessage, Priority};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::seen::SeenIdSet;
use crate::store::StateStore;

/// Retry budget when the caller does not specify one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const QUEUE_KEY: &str = "outbound_queue";
const SEEN_KEY: &str = "seen_ids";

/// A message waiting for (re)transmission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub message: MeshMessage,
    pub priority: Priority,
    /// Transmissions attempted so far
    pub attempts: u32,
    pub max_attempts: u32,
    /// Unix ms before which this entry must not be dequeued
    pub next_eligible_at: u64,
}

/// Per-lane counts, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub high: usize,
    pub normal: usize,
    pub low: usize,
    pub total: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueSnapshot {
    high: Vec<QueuedMessage>,
    normal: Vec<QueuedMessage>,
    low: Vec<QueuedMessage>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Outbound delivery queue
///
/// Owns the dedup set: an id seen by inbound relay processing rejects
/// later origination of the same id and vice versa.
pub struct OutboundQueue {
    lanes: [VecDeque<QueuedMessage>; 3],
    seen: SeenIdSet,
    store: Arc<dyn StateStore>,
}

impl OutboundQueue {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        OutboundQueue {
            lanes: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
            seen: SeenIdSet::new(),
            store,
        }
    }

    /// Reconstruct lanes and seen-set from the store's snapshots.
    /// Unreadable snapshots are logged and treated as empty.
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let mut queue = Self::new(Arc::clone(&store));

        if let Some(bytes) = store.get(QUEUE_KEY) {
            match serde_json::from_slice::<QueueSnapshot>(&bytes) {
                Ok(snapshot) => {
                    queue.lanes[Priority::High.lane_index()] = snapshot.high.into();
                    queue.lanes[Priority::Normal.lane_index()] = snapshot.normal.into();
                    queue.lanes[Priority::Low.lane_index()] = snapshot.low.into();
                }
                Err(e) => warn!(error = %e, "discarding unreadable queue snapshot"),
            }
        }
        if let Some(bytes) = store.get(SEEN_KEY) {
            match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(ids) => queue.seen = SeenIdSet::from_ids(ids),
                Err(e) => warn!(error = %e, "discarding unreadable seen-id snapshot"),
            }
        }
        queue
    }

    /// Add a message for transmission. Returns `false` with no side
    /// effect when the id has already been seen.
    pub fn enqueue(&mut self, message: MeshMessage, priority: Priority, max_attempts: u32) -> bool {
        if self.seen.contains(message.id()) {
            return false;
        }
        self.seen.insert(message.id());
        self.push(message, priority, max_attempts);
        true
    }

    /// Relay-path variant: the id was already recorded as seen during
    /// inbound processing, so the duplicate check must be skipped.
    pub(crate) fn enqueue_seen(
        &mut self,
        message: MeshMessage,
        priority: Priority,
        max_attempts: u32,
    ) {
        self.push(message, priority, max_attempts);
    }

    fn push(&mut self, mut message: MeshMessage, priority: Priority, max_attempts: u32) {
        *message.ttl_mut() = clamp_ttl(i64::from(message.ttl()));
        self.lanes[priority.lane_index()].push_back(QueuedMessage {
            message,
            priority,
            attempts: 0,
            max_attempts,
            next_eligible_at: 0,
        });
        self.persist();
    }

    /// Pop the first eligible entry, walking lanes HIGH to LOW. An
    /// entry still inside its backoff delay is skipped; a deferred
    /// higher lane does not block eligible lower-lane traffic.
    pub fn dequeue(&mut self) -> Option<QueuedMessage> {
        let now = now_ms();
        let (lane_idx, pos) = (0..self.lanes.len()).rev().find_map(|lane_idx| {
            self.lanes[lane_idx]
                .iter()
                .position(|q| q.next_eligible_at <= now)
                .map(|pos| (lane_idx, pos))
        })?;
        let queued = self.lanes[lane_idx].remove(pos);
        if queued.is_some() {
            self.persist();
        }
        queued
    }

    /// Reschedule a failed transmission with exponential backoff plus
    /// jitter. Returns `false` when the retry budget is exhausted and
    /// the message is dropped for good.
    pub fn retry(&mut self, mut queued: QueuedMessage) -> bool {
        queued.attempts += 1;
        if queued.attempts >= queued.max_attempts {
            debug!(
                id = queued.message.id(),
                attempts = queued.attempts,
                "retries exhausted, dropping"
            );
            return false;
        }

        let backoff_ms = 1000u64.saturating_mul(1 << queued.attempts.min(16));
        let jitter_ms = rand::thread_rng().gen_range(0..1000);
        queued.next_eligible_at = now_ms() + backoff_ms + jitter_ms;
        debug!(
            id = queued.message.id(),
            attempts = queued.attempts,
            delay_ms = backoff_ms + jitter_ms,
            "rescheduled"
        );
        self.lanes[queued.priority.lane_index()].push_back(queued);
        self.persist();
        true
    }

    /// Record an id as seen without queueing anything. Returns `true`
    /// when the id is new.
    pub fn mark_seen(&mut self, id: &str) -> bool {
        let new = self.seen.insert(id);
        if new {
            self.persist();
        }
        new
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn stats(&self) -> QueueStats {
        let high = self.lanes[Priority::High.lane_index()].len();
        let normal = self.lanes[Priority::Normal.lane_index()].len();
        let low = self.lanes[Priority::Low.lane_index()].len();
        QueueStats {
            high,
            normal,
            low,
            total: high + normal + low,
        }
    }

    /// Empty every lane and the seen set.
    pub fn clear(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
        self.seen.clear();
        self.persist();
    }

    /// Empty one lane, or all lanes (seen set untouched).
    pub fn flush(&mut self, priority: Option<Priority>) {
        match priority {
            Some(p) => self.lanes[p.lane_index()].clear(),
            None => {
                for lane in &mut self.lanes {
                    lane.clear();
                }
            }
        }
        self.persist();
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(VecDeque::is_empty)
    }

    fn persist(&self) {
        let snapshot = QueueSnapshot {
            high: self.lanes[Priority::High.lane_index()].iter().cloned().collect(),
            normal: self.lanes[Priority::Normal.lane_index()].iter().cloned().collect(),
            low: self.lanes[Priority::Low.lane_index()].iter().cloned().collect(),
        };
        match serde_json::to_vec(&snapshot) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(QUEUE_KEY, &bytes) {
                    warn!(error = %e, "queue snapshot write failed, memory stays authoritative");
                }
            }
            Err(e) => warn!(error = %e, "queue snapshot serialization failed"),
        }
        match serde_json::to_vec(&self.seen.to_vec()) {
            Ok(bytes) => {
                if let Err(e) = self.store.set(SEEN_KEY, &bytes) {
                    warn!(error = %e, "seen-id snapshot write failed, memory stays authoritative");
                }
            }
            Err(e) => warn!(error = %e, "seen-id snapshot serialization failed"),
        }
    }
}
