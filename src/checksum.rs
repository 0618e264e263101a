//! Integrity hashes the storage network expects with every object.
//!
//! The payload is cut into fixed-size segments. Each segment is hashed, then
//! split into data shards and extended with parity shards by Reed-Solomon
//! encoding, and every shard is hashed too. The final set is:
//!
//! * index 0: sha256 over the concatenated segment hashes
//! * index 1..: sha256 over the concatenated hashes of shard `i-1` across
//!   all segments
//!
//! The storage provider recomputes these on upload and rejects the object
//! on any mismatch, so the layout here must stay byte-exact.

use reed_solomon_erasure::galois_8::ReedSolomon;
use sha2::{Digest, Sha256};

use crate::{
    error::{ArtworkError, Result},
    models::ChecksumSet,
};

pub const SEGMENT_SIZE: usize = 16 * 1024 * 1024;
pub const DATA_BLOCKS: usize = 4;
pub const PARITY_BLOCKS: usize = 2;

pub struct ChecksumEncoder {
    segment_size: usize,
    rs: ReedSolomon,
}

impl ChecksumEncoder {
    pub fn new() -> Result<Self> {
        Self::with_segment_size(SEGMENT_SIZE)
    }

    pub fn with_segment_size(segment_size: usize) -> Result<Self> {
        if segment_size == 0 {
            return Err(ArtworkError::ChecksumError(
                "segment size must be positive".into(),
            ));
        }
        let rs = ReedSolomon::new(DATA_BLOCKS, PARITY_BLOCKS)
            .map_err(|e| ArtworkError::ChecksumError(format!("{:?}", e)))?;
        Ok(Self { segment_size, rs })
    }

    pub fn shard_count(&self) -> usize {
        DATA_BLOCKS + PARITY_BLOCKS
    }

    /// Compute the full set for `data`. Empty input yields hashes of empty
    /// concatenations.
    pub fn encode(&self, data: &[u8]) -> Result<ChecksumSet> {
        let mut segment_hashes = Vec::new();
        let mut shard_hashes: Vec<Vec<u8>> = vec![Vec::new(); self.shard_count()];

        for segment in data.chunks(self.segment_size) {
            segment_hashes.extend_from_slice(&Sha256::digest(segment));

            let shards = self.encode_segment(segment)?;
            for (i, shard) in shards.iter().enumerate() {
                shard_hashes[i].extend_from_slice(&Sha256::digest(shard));
            }
        }

        let mut checksums: Vec<[u8; 32]> = Vec::with_capacity(1 + self.shard_count());
        checksums.push(Sha256::digest(&segment_hashes).into());
        for hashes in &shard_hashes {
            checksums.push(Sha256::digest(hashes).into());
        }

        Ok(ChecksumSet(checksums))
    }

    /// Split into zero-padded data shards and append parity.
    fn encode_segment(&self, segment: &[u8]) -> Result<Vec<Vec<u8>>> {
        let shard_len = (segment.len() + DATA_BLOCKS - 1) / DATA_BLOCKS;

        let mut shards: Vec<Vec<u8>> = Vec::with_capacity(self.shard_count());
        for i in 0..DATA_BLOCKS {
            let start = (i * shard_len).min(segment.len());
            let end = ((i + 1) * shard_len).min(segment.len());
            let mut shard = segment[start..end].to_vec();
            shard.resize(shard_len, 0);
            shards.push(shard);
        }
        shards.extend((0..PARITY_BLOCKS).map(|_| vec![0u8; shard_len]));

        self.rs
            .encode(&mut shards)
            .map_err(|e| ArtworkError::ChecksumError(format!("{:?}", e)))?;

        Ok(shards)
    }
}

/// Checksums with the default segment size.
pub fn compute_checksums(data: &[u8]) -> Result<ChecksumSet> {
    ChecksumEncoder::new()?.encode(data)
}
