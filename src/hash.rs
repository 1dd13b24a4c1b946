//! Block digests: canonicalization, sealing and verification.
//!
//! A block's digest covers its position, its timestamp, the JSON form of the
//! whole block (payload and previous hash included) and the block's own hash
//! field as it stood before sealing. That last input is always the empty
//! string at construction time, so verification recomputes over a copy with
//! the hash field reset.

use crate::block::Block;
use crate::error::Result;
use chrono::SecondsFormat;
use sha2::{Digest, Sha256};

/// SHA-256 hex string identifying a sealed block.
pub type BlockHash = String;

/// Compute the SHA-256 hex digest of some data.
pub fn digest_hex(data: &[u8]) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute the digest of `block` from a snapshot of its current fields.
///
/// The block's own `hash` field is part of the input. Callers that want the
/// digest a block was sealed with must pass it with that field still empty.
pub fn compute_hash(block: &Block) -> Result<BlockHash> {
    let serialized = serde_json::to_string(block)?;
    let canonical = format!(
        "{}{}{}{}",
        block.position,
        block.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        serialized,
        block.hash,
    );
    Ok(digest_hex(canonical.as_bytes()))
}

/// Compute the digest and store it in the block's hash field.
pub(crate) fn seal(block: &mut Block) -> Result<()> {
    let digest = compute_hash(block)?;
    block.hash = digest;
    Ok(())
}

/// Recompute the digest `block` was sealed with and compare it to `claimed`.
pub fn verify_hash(block: &Block, claimed: &str) -> bool {
    let mut unsealed = block.clone();
    unsealed.hash.clear();
    match compute_hash(&unsealed) {
        Ok(digest) => digest == claimed,
        Err(_) => false,
    }
}
