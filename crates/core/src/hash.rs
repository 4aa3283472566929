//! MD5 hash types and the ETag digest engine.

use crate::etag::Etag;
use crate::policy::ChunkingPolicy;
use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// Read buffer used when hashing files (1 MiB).
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// An MD5 hash represented as 16 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Hash([u8; 16]);

impl Md5Hash {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Compute the MD5 hash of data.
    pub fn compute(data: &[u8]) -> Self {
        Self(Md5::digest(data).into())
    }

    /// Create an incremental hasher.
    pub fn hasher() -> Md5Hasher {
        Md5Hasher(Md5::new())
    }

    /// Parse from a lowercase hex string.
    ///
    /// Object stores always emit lowercase digests, so uppercase input is
    /// rejected instead of being normalized.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() != 32 {
            return Err(crate::Error::InvalidEtag(format!(
                "expected 32 hex chars, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(crate::Error::InvalidEtag(format!(
                "not a lowercase hex digest: {s}"
            )));
        }
        let mut bytes = [0u8; 16];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex_str =
                std::str::from_utf8(chunk).map_err(|e| crate::Error::InvalidEtag(e.to_string()))?;
            bytes[i] = u8::from_str_radix(hex_str, 16)
                .map_err(|e| crate::Error::InvalidEtag(e.to_string()))?;
        }
        Ok(Self(bytes))
    }

    /// Encode as lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Md5Hash({})", self.to_hex())
    }
}

impl fmt::Display for Md5Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental MD5 hasher.
pub struct Md5Hasher(Md5);

impl Md5Hasher {
    /// Update the hasher with data.
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> Md5Hash {
        Md5Hash(self.0.finalize().into())
    }
}

impl Write for Md5Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Incremental hasher producing a multipart ETag.
///
/// Bytes are split into parts of `part_size`; each part is hashed as it
/// fills, and only the 16-byte part digests are kept.
pub struct EtagHasher {
    part_size: u64,
    current: Md5,
    current_len: u64,
    part_hashes: Vec<u8>,
    parts: u64,
}

impl EtagHasher {
    /// Create a hasher for the given part size.
    ///
    /// Returns an error if `part_size` is zero.
    pub fn new(part_size: u64) -> crate::Result<Self> {
        if part_size == 0 {
            return Err(crate::Error::InvalidChunkSize(part_size));
        }
        Ok(Self {
            part_size,
            current: Md5::new(),
            current_len: 0,
            part_hashes: Vec::new(),
            parts: 0,
        })
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let space_left = self.part_size - self.current_len;
            let take = usize::try_from(space_left).map_or(data.len(), |n| n.min(data.len()));

            self.current.update(&data[..take]);
            self.current_len += take as u64;
            data = &data[take..];

            if self.current_len == self.part_size {
                self.finish_part();
            }
        }
    }

    fn finish_part(&mut self) {
        let digest = std::mem::replace(&mut self.current, Md5::new()).finalize();
        self.part_hashes.extend_from_slice(&digest);
        self.current_len = 0;
        self.parts += 1;
    }

    /// Finalize and return the multipart ETag.
    ///
    /// A trailing partial part is hashed as the last part. If no data was
    /// fed at all, a single empty part is hashed so the part count is never
    /// zero. Fails if the part count does not fit an ETag.
    pub fn finalize(mut self) -> crate::Result<Etag> {
        if self.current_len > 0 || self.parts == 0 {
            self.finish_part();
        }
        let parts =
            u32::try_from(self.parts).map_err(|_| crate::Error::TooManyParts(self.parts))?;
        Ok(Etag::Multipart {
            hash: Md5Hash::compute(&self.part_hashes),
            parts,
        })
    }
}

impl Write for EtagHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compute the ETag of a stream of known length under a chunking policy.
///
/// `len` decides between the single-part and multipart shapes before any
/// bytes are read; the stream itself is consumed incrementally.
pub fn compute_etag<R: Read>(
    mut reader: R,
    len: u64,
    policy: &ChunkingPolicy,
) -> crate::Result<Etag> {
    if policy.is_multipart(len) {
        let mut hasher = EtagHasher::new(policy.chunk_size())?;
        io::copy(&mut reader, &mut hasher)?;
        hasher.finalize()
    } else {
        let mut hasher = Md5Hash::hasher();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Etag::Simple(hasher.finalize()))
    }
}

/// Compute the ETag of a local file under a chunking policy.
pub fn compute_file_etag(path: impl AsRef<Path>, policy: &ChunkingPolicy) -> crate::Result<Etag> {
    let file = File::open(path.as_ref())?;
    let len = file.metadata()?.len();
    compute_etag(
        BufReader::with_capacity(READ_BUFFER_SIZE, file),
        len,
        policy,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MultipartThreshold;

    const MIB: u64 = 1024 * 1024;

    fn multipart(chunk_size: u64) -> ChunkingPolicy {
        ChunkingPolicy::new(chunk_size, MultipartThreshold::Always).unwrap()
    }

    fn single_part(chunk_size: u64) -> ChunkingPolicy {
        ChunkingPolicy::new(chunk_size, MultipartThreshold::Never).unwrap()
    }

    fn etag_of(data: &[u8], policy: &ChunkingPolicy) -> String {
        compute_etag(data, data.len() as u64, policy)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_md5_hash_hex_roundtrip() {
        let hash = Md5Hash::compute(b"hello");
        assert_eq!(hash.to_hex(), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(Md5Hash::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_md5_hash_rejects_bad_hex() {
        assert!(Md5Hash::from_hex("5d41402abc4b2a76").is_err());
        assert!(Md5Hash::from_hex("5D41402ABC4B2A76B9719D911017C592").is_err());
        assert!(Md5Hash::from_hex("zz41402abc4b2a76b9719d911017c592").is_err());
    }

    #[test]
    fn test_simple_etag_ignores_chunk_size() {
        let data = b"0123456789";
        for chunk_size in [1, 3, 10, 8 * MIB] {
            assert_eq!(
                etag_of(data, &single_part(chunk_size)),
                "781e5e245d69b566979b86e28d23f2c7"
            );
        }
    }

    #[test]
    fn test_empty_stream_is_simple_under_default_policy() {
        assert_eq!(
            etag_of(b"", &ChunkingPolicy::default()),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_multipart_known_vectors() {
        assert_eq!(
            etag_of(b"hello", &multipart(8 * MIB)),
            "62109206880d38a4010a98e11243924a-1"
        );

        let large = vec![b'a'; (8 * MIB + 1) as usize];
        assert_eq!(
            etag_of(&large, &multipart(8 * MIB)),
            "b62778a5dbf858d29ac84f718e3a8374-2"
        );
        assert_eq!(
            etag_of(&large, &multipart(2 * MIB)),
            "2b26d4c146cf1500e532eed66eba4a36-5"
        );
    }

    #[test]
    fn test_multipart_part_boundaries() {
        let data = b"0123456789";
        // 4 + 4 + 2
        assert_eq!(
            etag_of(data, &multipart(4)),
            "61e3716e3a7767581863b67c4e785584-3"
        );
        // Exactly two full parts, no trailing empty part
        assert_eq!(
            etag_of(data, &multipart(5)),
            "9a6dbec798b1bfe66cc7659d2bb41720-2"
        );
        assert_eq!(
            etag_of(data, &multipart(10)),
            "8e938564cd1410f0ec1c1781466a6738-1"
        );
    }

    #[test]
    fn test_multipart_matches_manual_hash_of_hashes() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let mut concatenated = Vec::new();
        for part in data.chunks(128) {
            concatenated.extend_from_slice(Md5Hash::compute(part).as_bytes());
        }
        let expected = format!("{}-8", Md5Hash::compute(&concatenated));
        assert_eq!(etag_of(&data, &multipart(128)), expected);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let policy = ChunkingPolicy::new(4, MultipartThreshold::Bytes(10)).unwrap();
        assert_eq!(
            etag_of(b"0123456789", &policy),
            "781e5e245d69b566979b86e28d23f2c7"
        );
        assert!(etag_of(b"0123456789a", &policy).ends_with("-3"));
    }

    #[test]
    fn test_hasher_split_updates_match_single_update() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut whole = EtagHasher::new(7).unwrap();
        whole.update(data);

        let mut pieces = EtagHasher::new(7).unwrap();
        for piece in data.chunks(3) {
            pieces.update(piece);
        }
        assert_eq!(whole.finalize().unwrap(), pieces.finalize().unwrap());
    }

    #[test]
    fn test_hasher_never_emits_zero_parts() {
        let etag = EtagHasher::new(8).unwrap().finalize().unwrap();
        assert_eq!(etag.part_count(), Some(1));
    }

    #[test]
    fn test_empty_stream_forced_multipart_is_one_part() {
        let policy = ChunkingPolicy::new(8 * MIB, MultipartThreshold::Always).unwrap();
        assert_eq!(
            etag_of(b"", &policy),
            "59adb24ef3cdbe0297f05b395827453f-1"
        );
    }

    #[test]
    fn test_hasher_rejects_part_count_beyond_u32() {
        let mut hasher = EtagHasher::new(1).unwrap();
        hasher.parts = u64::from(u32::MAX);
        hasher.update(b"x");
        assert!(matches!(
            hasher.finalize(),
            Err(crate::Error::TooManyParts(n)) if n == u64::from(u32::MAX) + 1
        ));
    }

    #[test]
    fn test_hasher_rejects_zero_part_size() {
        assert!(matches!(
            EtagHasher::new(0),
            Err(crate::Error::InvalidChunkSize(0))
        ));
    }

    #[test]
    fn test_compute_file_etag_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("data.bin");
        std::fs::write(&path, vec![7u8; 3000]).unwrap();

        let policy = multipart(1024);
        let first = compute_file_etag(&path, &policy).unwrap();
        let second = compute_file_etag(&path, &policy).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.part_count(), Some(3));
    }

    #[test]
    fn test_compute_file_etag_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = compute_file_etag(temp.path().join("missing"), &ChunkingPolicy::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
