//! Provider response cache entries with SHA-256 integrity checks.
//!
//! Tagged provider payloads are stored as JSON text next to a checksum. An entry
//! whose checksum no longer matches is treated as a miss and the provider is
//! called again.

use sha2::{Digest, Sha256};

use crate::normalizer::ProviderPayload;

/// Cached JSON text plus its checksum.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedCacheEntry {
    /// The cached provider payload (JSON text).
    pub data: String,
    /// SHA-256 checksum of the data (hex encoded).
    pub checksum: String,
}

impl ValidatedCacheEntry {
    pub fn new(data: String) -> Self {
        let checksum = Self::compute_checksum(&data);
        Self { data, checksum }
    }

    /// Serializes a provider payload into a checksummed entry.
    pub fn from_payload(payload: &ProviderPayload) -> Option<Self> {
        serde_json::to_string(payload).ok().map(Self::new)
    }

    fn compute_checksum(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns true if the checksum matches, false if tampered
    pub fn is_valid(&self) -> bool {
        Self::compute_checksum(&self.data) == self.checksum
    }

    /// Returns the cached payload if the entry is intact and decodes.
    pub fn into_payload(self) -> Option<ProviderPayload> {
        if !self.is_valid() {
            tracing::warn!(
                "Cache validation failed: checksum mismatch. Expected: {}, Data length: {}",
                self.checksum,
                self.data.len()
            );
            return None;
        }
        serde_json::from_str(&self.data).ok()
    }
}
