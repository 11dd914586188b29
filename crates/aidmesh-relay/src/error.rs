//! Relay error types

use aidmesh_protocol::MessageKind;
use thiserror::Error;

/// Relay-specific errors
///
/// Only origination surfaces errors; inbound processing degrades to
/// drop/false per the best-effort contract.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no key resolvable for recipient and plaintext transmission not permitted")]
    NoKey,

    #[error("origination rate limit exceeded for {kind} ({limit} per minute)")]
    RateLimited { kind: MessageKind, limit: u32 },

    #[error("relay is shut down")]
    ShutDown,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
