//! Chunking for transport
//!
//! A compressed clip rarely fits one radio payload; it travels as an
//! ordered sequence of `VoicePing{idx, total}` chunks. Reassembly is
//! the receiver's concern and tolerates gaps.

/// Default chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Split a compressed buffer into ordered, equally-sized chunks.
///
/// The last chunk may be shorter. Empty input yields no chunks.
pub fn create_voice_chunks(compressed: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
    if chunk_size == 0 {
        return Vec::new();
    }
    compressed
        .chunks(chunk_size)
        .map(|c| c.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_preserve_length() {
        let data: Vec<u8> = (0..3000).map(|i| (i % 251) as u8).collect();
        let chunks = create_voice_chunks(&data, DEFAULT_CHUNK_SIZE);

        assert_eq!(chunks.len(), data.len().div_ceil(DEFAULT_CHUNK_SIZE));
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), data.len());

        // order preserved
        let rejoined: Vec<u8> = chunks.concat();
        assert_eq!(rejoined, data);
    }

    #[test]
    fn test_exact_multiple() {
        let data = vec![7u8; 2048];
        let chunks = create_voice_chunks(&data, 1024);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 1024));
    }

    #[test]
    fn test_small_and_empty() {
        assert_eq!(create_voice_chunks(&[1, 2, 3], 1024).len(), 1);
        assert!(create_voice_chunks(&[], 1024).is_empty());
        assert!(create_voice_chunks(&[1, 2, 3], 0).is_empty());
    }
}
