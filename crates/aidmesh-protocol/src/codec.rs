//! Compact wire codec
//!
//! The encoded form of a [`MeshMessage`] is the only cross-device
//! contract. It is tag-dispatched JSON with one/two-letter field names
//! so a full envelope fits within a small advertisement payload.
//!
//! [`decode`] is the tolerant half: on a shared broadcast medium,
//! corrupt and unknown input is the expected common case, so anything
//! malformed yields `None` rather than an error. Unknown extra fields
//! inside a known variant are ignored for forward compatibility.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::message::{MeshMessage, TTL_MAX};

/// Encode a message into its transmittable form.
///
/// Total over all variants: a closed enum of plain data cannot fail to
/// serialize.
pub fn encode(msg: &MeshMessage) -> Vec<u8> {
    serde_json::to_vec(msg).unwrap_or_default()
}

/// Decode wire bytes back into a message.
///
/// Returns `None` on bad UTF-8, bad JSON, an unknown variant tag, or a
/// missing/unparsable required field (`id`, numeric `ttl`). Never
/// panics, never returns an error.
pub fn decode(bytes: &[u8]) -> Option<MeshMessage> {
    let msg: MeshMessage = serde_json::from_slice(bytes).ok()?;
    if msg.id().is_empty() {
        return None;
    }
    Some(msg)
}

/// Clamp a hop budget into `[0, TTL_MAX]`.
pub fn clamp_ttl(ttl: i64) -> u8 {
    ttl.clamp(0, TTL_MAX as i64) as u8
}

/// Generate a collision-resistant message id.
///
/// Fixed-width millisecond timestamp prefix plus a random suffix: ids
/// sort roughly chronologically (a debugging nicety, not a correctness
/// requirement) and collide across devices only with negligible
/// probability.
pub fn generate_id() -> String {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut suffix = [0u8; 4];
    rand::thread_rng().fill(&mut suffix);
    format!("{:011x}-{}", ms, hex::encode(suffix))
}
