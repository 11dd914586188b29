//! Key material lookup for the relay engine
//!
//! Maps peer ids and group ids to opaque keys. The keyring never
//! inspects key bytes; it is populated by the host application as
//! pairing handshakes and group rosters complete.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque symmetric key handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(Vec<u8>);

impl Key {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Key(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Peer and group key material
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Keyring {
    peers: HashMap<String, Key>,
    groups: HashMap<String, Key>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a shared key for a direct peer.
    pub fn insert_peer(&mut self, peer_id: impl Into<String>, key: Key) {
        self.peers.insert(peer_id.into(), key);
    }

    /// Store a group key.
    pub fn insert_group(&mut self, group_id: impl Into<String>, key: Key) {
        self.groups.insert(group_id.into(), key);
    }

    pub fn peer_key(&self, peer_id: &str) -> Option<&Key> {
        self.peers.get(peer_id)
    }

    pub fn group_key(&self, group_id: &str) -> Option<&Key> {
        self.groups.get(group_id)
    }

    /// Resolve a key for an addressed message: direct peer first, then
    /// group scope.
    pub fn resolve(&self, to: Option<&str>, group: Option<&str>) -> Option<&Key> {
        if let Some(peer) = to {
            if let Some(key) = self.peers.get(peer) {
                return Some(key);
            }
        }
        group.and_then(|g| self.groups.get(g))
    }

    pub fn remove_peer(&mut self, peer_id: &str) -> Option<Key> {
        self.peers.remove(peer_id)
    }

    pub fn remove_group(&mut self, group_id: &str) -> Option<Key> {
        self.groups.remove(group_id)
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_peer() {
        let mut ring = Keyring::new();
        ring.insert_peer("alice", Key::from_bytes(vec![1]));
        ring.insert_group("rescue", Key::from_bytes(vec![2]));

        let key = ring.resolve(Some("alice"), Some("rescue")).unwrap();
        assert_eq!(key.as_bytes(), &[1]);

        let key = ring.resolve(Some("unknown"), Some("rescue")).unwrap();
        assert_eq!(key.as_bytes(), &[2]);

        assert!(ring.resolve(Some("unknown"), None).is_none());
        assert!(ring.resolve(None, None).is_none());
    }

    #[test]
    fn test_remove() {
        let mut ring = Keyring::new();
        ring.insert_peer("alice", Key::from_bytes(vec![1]));
        assert!(!ring.is_empty());
        assert!(ring.remove_peer("alice").is_some());
        assert!(ring.is_empty());
    }
}
