//! AidMesh crypto collaborator
//!
//! Interface crate only: the mesh core invokes an encrypt/decrypt
//! capability it does not implement. This crate defines that seam
//! ([`CryptoProvider`]), the opaque [`Key`] handle, the [`Keyring`]
//! lookup the relay uses to resolve keys by peer/group id, and the
//! absent-capability stand-in [`NoopCrypto`].

pub mod keyring;
pub mod provider;

pub use keyring::{Key, Keyring};
pub use provider::{CryptoProvider, NoopCrypto, Sealed};
