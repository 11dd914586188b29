//! AidMesh wire protocol
//!
//! The message model and compact codec for the offline disaster-response
//! mesh: a closed set of tagged message variants (distress beacons,
//! acknowledgements, encrypted chat, voice chunks, pairing and group
//! control) and the tolerant encode/decode pair that is the only
//! cross-device contract.

pub mod codec;
pub mod message;
pub mod types;

pub use codec::{clamp_ttl, decode, encode, generate_id};
pub use message::{MeshMessage, TTL_ACK, TTL_DM, TTL_MAX, TTL_SOS, TTL_VOICE};
pub use types::{MessageKind, Priority};
