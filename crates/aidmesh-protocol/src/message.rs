//! Mesh message model
//!
//! A closed set of message variants, tagged on the wire with a short
//! `t` field. Every variant carries a unique `id`, a hop budget `ttl`
//! and a relay counter `hop`. Field names are deliberately terse: the
//! radio medium gives us a few hundred bytes per advertisement at
//! best.
//!
//! Ciphertext, nonces, public keys and voice chunk data are carried as
//! hex strings. The core never inspects plaintext; encryption is the
//! job of the external crypto collaborator.

use serde::{Deserialize, Serialize};

use crate::types::{MessageKind, Priority};

/// Upper bound on the hop budget
pub const TTL_MAX: u8 = 10;

/// Initial TTL for distress beacons
pub const TTL_SOS: u8 = 5;

/// Initial TTL for acknowledgements
pub const TTL_ACK: u8 = 3;

/// Initial TTL for direct/group messages
pub const TTL_DM: u8 = 3;

/// Initial TTL for voice chunks (single-hop "shout")
pub const TTL_VOICE: u8 = 1;

/// A message on the mesh
///
/// Decode never aliases queued state: every decode produces a fresh
/// value. A message is immutable once encoded onto the wire; `ttl` and
/// `hop` are only ever touched by the relay engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum MeshMessage {
    /// Distress beacon
    #[serde(rename = "SOS")]
    Sos {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        /// Originator timestamp (unix ms)
        ts: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lat: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lon: Option<f64>,
        /// Self-reported statuses ("injured", "trapped", ...)
        #[serde(rename = "st", default, skip_serializing_if = "Vec::is_empty")]
        statuses: Vec<String>,
    },

    /// Acknowledges a prior message id
    #[serde(rename = "ACK")]
    Ack {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "r")]
        reference: String,
    },

    /// Direct or group-scoped chat message
    #[serde(rename = "DM")]
    Dm {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
        #[serde(rename = "g", default, skip_serializing_if = "Option::is_none")]
        group: Option<String>,
        #[serde(rename = "e")]
        encrypted: bool,
        /// Ciphertext (or plaintext bytes when `encrypted` is false), hex
        #[serde(rename = "c")]
        ciphertext: String,
        /// Nonce, hex; empty when unencrypted
        #[serde(rename = "n", default)]
        nonce: String,
    },

    /// One chunk of a compressed voice clip
    #[serde(rename = "VP")]
    VoicePing {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<String>,
        #[serde(rename = "e")]
        encrypted: bool,
        #[serde(rename = "i")]
        idx: u16,
        #[serde(rename = "tot")]
        total: u16,
        /// Chunk bytes, hex
        #[serde(rename = "d")]
        chunk: String,
    },

    /// Key-exchange handshake, initiator side
    #[serde(rename = "PREQ")]
    PairRequest {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "f")]
        from_id: String,
        to: String,
        /// Initiator public key, hex (opaque to the core)
        #[serde(rename = "k")]
        from_pub: String,
        ts: u64,
    },

    /// Key-exchange handshake, responder side
    #[serde(rename = "PACK")]
    PairAck {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "r")]
        reference: String,
        to: String,
        /// Responder public key, hex (opaque to the core)
        #[serde(rename = "k")]
        to_pub: String,
        ts: u64,
    },

    /// Store-and-forward addressing helper
    #[serde(rename = "DLR")]
    DmLookupRelay {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "tgt")]
        target_id: String,
        #[serde(rename = "env")]
        inner: Box<MeshMessage>,
    },

    /// Request to join a group
    #[serde(rename = "GJ")]
    GroupJoin {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "g")]
        group: String,
        #[serde(rename = "f")]
        from_id: String,
        #[serde(rename = "k")]
        from_pub: String,
        #[serde(rename = "nm", default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        ts: u64,
    },

    /// Group membership roster
    #[serde(rename = "GC")]
    GroupConfig {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "g")]
        group: String,
        #[serde(rename = "m")]
        members: Vec<String>,
        ts: u64,
    },

    /// Encrypted group chat message
    #[serde(rename = "GM")]
    GroupMessage {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "g")]
        group: String,
        #[serde(rename = "e")]
        encrypted: bool,
        #[serde(rename = "c")]
        ciphertext: String,
        #[serde(rename = "n", default)]
        nonce: String,
        #[serde(rename = "s")]
        sender: String,
        ts: u64,
        #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
        priority_hint: Option<Priority>,
    },

    /// Group verification challenge (short shared phrase)
    #[serde(rename = "GVI")]
    GroupVerifyInit {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "g")]
        group: String,
        #[serde(rename = "f")]
        from: String,
        #[serde(rename = "ph")]
        phrase: String,
        ts: u64,
    },

    /// Group verification response
    #[serde(rename = "GVA")]
    GroupVerifyAck {
        id: String,
        ttl: u8,
        #[serde(rename = "h", default)]
        hop: u8,
        #[serde(rename = "g")]
        group: String,
        #[serde(rename = "f")]
        from: String,
        ok: bool,
        ts: u64,
    },
}

impl MeshMessage {
    /// Unique message id
    pub fn id(&self) -> &str {
        match self {
            MeshMessage::Sos { id, .. }
            | MeshMessage::Ack { id, .. }
            | MeshMessage::Dm { id, .. }
            | MeshMessage::VoicePing { id, .. }
            | MeshMessage::PairRequest { id, .. }
            | MeshMessage::PairAck { id, .. }
            | MeshMessage::DmLookupRelay { id, .. }
            | MeshMessage::GroupJoin { id, .. }
            | MeshMessage::GroupConfig { id, .. }
            | MeshMessage::GroupMessage { id, .. }
            | MeshMessage::GroupVerifyInit { id, .. }
            | MeshMessage::GroupVerifyAck { id, .. } => id,
        }
    }

    /// Remaining hop budget
    pub fn ttl(&self) -> u8 {
        match self {
            MeshMessage::Sos { ttl, .. }
            | MeshMessage::Ack { ttl, .. }
            | MeshMessage::Dm { ttl, .. }
            | MeshMessage::VoicePing { ttl, .. }
            | MeshMessage::PairRequest { ttl, .. }
            | MeshMessage::PairAck { ttl, .. }
            | MeshMessage::DmLookupRelay { ttl, .. }
            | MeshMessage::GroupJoin { ttl, .. }
            | MeshMessage::GroupConfig { ttl, .. }
            | MeshMessage::GroupMessage { ttl, .. }
            | MeshMessage::GroupVerifyInit { ttl, .. }
            | MeshMessage::GroupVerifyAck { ttl, .. } => *ttl,
        }
    }

    /// Mutable hop budget (relay engine and outbound queue only)
    pub fn ttl_mut(&mut self) -> &mut u8 {
        match self {
            MeshMessage::Sos { ttl, .. }
            | MeshMessage::Ack { ttl, .. }
            | MeshMessage::Dm { ttl, .. }
            | MeshMessage::VoicePing { ttl, .. }
            | MeshMessage::PairRequest { ttl, .. }
            | MeshMessage::PairAck { ttl, .. }
            | MeshMessage::DmLookupRelay { ttl, .. }
            | MeshMessage::GroupJoin { ttl, .. }
            | MeshMessage::GroupConfig { ttl, .. }
            | MeshMessage::GroupMessage { ttl, .. }
            | MeshMessage::GroupVerifyInit { ttl, .. }
            | MeshMessage::GroupVerifyAck { ttl, .. } => ttl,
        }
    }

    /// Number of relay devices traversed so far
    pub fn hop(&self) -> u8 {
        match self {
            MeshMessage::Sos { hop, .. }
            | MeshMessage::Ack { hop, .. }
            | MeshMessage::Dm { hop, .. }
            | MeshMessage::VoicePing { hop, .. }
            | MeshMessage::PairRequest { hop, .. }
            | MeshMessage::PairAck { hop, .. }
            | MeshMessage::DmLookupRelay { hop, .. }
            | MeshMessage::GroupJoin { hop, .. }
            | MeshMessage::GroupConfig { hop, .. }
            | MeshMessage::GroupMessage { hop, .. }
            | MeshMessage::GroupVerifyInit { hop, .. }
            | MeshMessage::GroupVerifyAck { hop, .. } => *hop,
        }
    }

    /// Mutable hop counter (relay engine only; originators never touch it)
    pub fn hop_mut(&mut self) -> &mut u8 {
        match self {
            MeshMessage::Sos { hop, .. }
            | MeshMessage::Ack { hop, .. }
            | MeshMessage::Dm { hop, .. }
            | MeshMessage::VoicePing { hop, .. }
            | MeshMessage::PairRequest { hop, .. }
            | MeshMessage::PairAck { hop, .. }
            | MeshMessage::DmLookupRelay { hop, .. }
            | MeshMessage::GroupJoin { hop, .. }
            | MeshMessage::GroupConfig { hop, .. }
            | MeshMessage::GroupMessage { hop, .. }
            | MeshMessage::GroupVerifyInit { hop, .. }
            | MeshMessage::GroupVerifyAck { hop, .. } => hop,
        }
    }

    /// Variant tag, used to key subscriber dispatch
    pub fn kind(&self) -> MessageKind {
        match self {
            MeshMessage::Sos { .. } => MessageKind::Sos,
            MeshMessage::Ack { .. } => MessageKind::Ack,
            MeshMessage::Dm { .. } => MessageKind::Dm,
            MeshMessage::VoicePing { .. } => MessageKind::VoicePing,
            MeshMessage::PairRequest { .. } => MessageKind::PairRequest,
            MeshMessage::PairAck { .. } => MessageKind::PairAck,
            MeshMessage::DmLookupRelay { .. } => MessageKind::DmLookupRelay,
            MeshMessage::GroupJoin { .. } => MessageKind::GroupJoin,
            MeshMessage::GroupConfig { .. } => MessageKind::GroupConfig,
            MeshMessage::GroupMessage { .. } => MessageKind::GroupMessage,
            MeshMessage::GroupVerifyInit { .. } => MessageKind::GroupVerifyInit,
            MeshMessage::GroupVerifyAck { .. } => MessageKind::GroupVerifyAck,
        }
    }

    /// Rebroadcast priority class for this variant
    pub fn priority(&self) -> Priority {
        match self.kind() {
            MessageKind::Sos | MessageKind::Ack => Priority::High,
            MessageKind::VoicePing => Priority::Low,
            _ => Priority::Normal,
        }
    }
}
