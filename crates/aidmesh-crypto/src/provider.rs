//! Crypto collaborator interface
//!
//! The core carries opaque ciphertext only; key derivation and
//! authenticated encryption live outside this workspace. The relay
//! engine talks to whatever the host application plugs in through
//! [`CryptoProvider`], and must keep routing correctly when the
//! capability is absent ([`NoopCrypto`]).

use crate::Key;

/// Result of sealing a plaintext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// External encrypt/decrypt capability
///
/// Every operation is fallible-by-absence: `None` means "no capability"
/// or "could not open", never a crash. The relay treats both the same
/// way.
pub trait CryptoProvider: Send + Sync {
    /// Seal a plaintext under `key`.
    fn encrypt(&self, key: &Key, plaintext: &[u8]) -> Option<Sealed>;

    /// Open a ciphertext; `None` when the key does not fit.
    fn decrypt(&self, key: &Key, nonce: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>>;

    /// Derive a shared key from a peer public key and our private key.
    fn derive_shared_key(&self, peer_public: &[u8], my_private: &[u8]) -> Option<Key>;
}

/// Stand-in for an absent crypto capability.
///
/// Everything returns `None`: messages still route, plaintext is just
/// never recovered and nothing new is sealed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCrypto;

impl CryptoProvider for NoopCrypto {
    fn encrypt(&self, _key: &Key, _plaintext: &[u8]) -> Option<Sealed> {
        None
    }

    fn decrypt(&self, _key: &Key, _nonce: &[u8], _ciphertext: &[u8]) -> Option<Vec<u8>> {
        None
    }

    fn derive_shared_key(&self, _peer_public: &[u8], _my_private: &[u8]) -> Option<Key> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_is_absent() {
        let key = Key::from_bytes(vec![1, 2, 3]);
        assert!(NoopCrypto.encrypt(&key, b"hello").is_none());
        assert!(NoopCrypto.decrypt(&key, b"n", b"c").is_none());
        assert!(NoopCrypto.derive_shared_key(b"pub", b"priv").is_none());
    }
}
