//! Shared SHA-256 hex digest utility.
//!
//! Used to derive content-addressed keys for uploaded and promoted
//! artifacts, so the same bytes always land under the same key.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}
