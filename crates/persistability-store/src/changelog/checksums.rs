//! Changeset checksums
//!
//! Computes SHA256 checksums of a changeset's changes to detect edits made
//! after the changeset was applied

use crate::changelog::format::Change;
use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Checksum of a changeset's changes
///
/// Hashes the canonical JSON of the decoded changes, so YAML formatting and
/// comments do not affect it but any change to a table, column or statement
/// does.
pub fn changeset_checksum(changes: &[Change]) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_string(changes)?;
    Ok(compute_checksum(&canonical))
}
