//! AidMesh relay engine
//!
//! The orchestrating crate of the mesh core: TTL-bounded epidemic
//! flood routing with dedup, a priority-laned outbound queue with
//! retry/backoff and crash-durable snapshots, origination rate
//! limiting, and the durable store collaborator the queue persists
//! through.

pub mod error;
pub mod queue;
pub mod rate;
pub mod relay;
pub mod seen;
pub mod store;

pub use error::{RelayError, Result};
pub use queue::{OutboundQueue, QueueStats, QueuedMessage, DEFAULT_MAX_ATTEMPTS};
pub use rate::OriginationLimiter;
pub use relay::{Delivery, MeshRelay, PlaintextPolicy, JITTER_MAX_MS, JITTER_MIN_MS};
pub use seen::{SeenIdSet, SEEN_CAP, SEEN_RETAIN};
pub use store::{FileStore, MemoryStore, StateStore};
