//! AidMesh voice codec
//!
//! IMA-ADPCM compression for short emergency voice clips plus the
//! chunking transform that feeds the transport's `VoicePing` variant.

pub mod adpcm;
pub mod chunk;

pub use adpcm::{VoiceDecoder, VoiceEncoder};
pub use chunk::{create_voice_chunks, DEFAULT_CHUNK_SIZE};
