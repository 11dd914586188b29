//! Core protocol types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority class for outbound scheduling
///
/// Strict dequeue order is High > Normal > Low. The numeric value is
/// the lane index used by the outbound queue (highest lane last, so
/// lanes can be walked in reverse like any priority array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Voice chunks and other bulk traffic
    Low = 0,
    /// Chat, pairing and group control
    Normal = 1,
    /// Distress beacons and acknowledgements
    High = 2,
}

impl Priority {
    /// Lane index (0-2) in the outbound queue
    pub fn lane_index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// Message kind, used to key local subscriber dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Sos,
    Ack,
    Dm,
    VoicePing,
    PairRequest,
    PairAck,
    DmLookupRelay,
    GroupJoin,
    GroupConfig,
    GroupMessage,
    GroupVerifyInit,
    GroupVerifyAck,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::Sos => "SOS",
            MessageKind::Ack => "ACK",
            MessageKind::Dm => "DM",
            MessageKind::VoicePing => "VP",
            MessageKind::PairRequest => "PREQ",
            MessageKind::PairAck => "PACK",
            MessageKind::DmLookupRelay => "DLR",
            MessageKind::GroupJoin => "GJ",
            MessageKind::GroupConfig => "GC",
            MessageKind::GroupMessage => "GM",
            MessageKind::GroupVerifyInit => "GVI",
            MessageKind::GroupVerifyAck => "GVA",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::High.lane_index(), 2);
        assert_eq!(Priority::Low.lane_index(), 0);
    }
}
