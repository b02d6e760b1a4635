//! Content digests.
//!
//! A digest is the first [`DIGEST_LEN`] hex characters of the SHA-256 of the
//! content. The truncation to 64 bits is kept for on-disk compatibility with
//! existing repositories; a collision is treated as impossible.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 output.
pub const DIGEST_LEN: usize = 16;

/// Hashes `content` and returns its truncated hex digest.
pub fn digest_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(DIGEST_LEN);
    hex
}

/// Checks that `digest` is a well-formed lowercase hex digest.
///
/// Object paths are derived from digests, so anything reaching the
/// filesystem must pass this check first.
pub fn validate(digest: &str) -> Result<()> {
    let well_formed = digest.len() == DIGEST_LEN
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

    if well_formed {
        Ok(())
    } else {
        Err(Error::InvalidDigest(digest.to_string()))
    }
}
