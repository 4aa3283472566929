use s3etag_core::{ChunkingPolicy, Etag, MultipartThreshold, compute_etag};

/// Generate deterministic test data using a seeded pseudo-random generator
/// Same seed produces same output (reproducible tests)
pub fn seeded_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG (Linear Congruential Generator)
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    data
}

/// Local multipart ETag of `data` split into `part_size` parts.
#[allow(dead_code)]
pub fn multipart_etag(data: &[u8], part_size: u64) -> Etag {
    let policy = ChunkingPolicy::new(part_size, MultipartThreshold::Always).unwrap();
    compute_etag(data, data.len() as u64, &policy).unwrap()
}
