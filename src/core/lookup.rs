//! Lookup Identifiers
//!
//! The random value embedded in a QR image. It indexes an indirection store
//! entry and carries no ticket data itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Domain separator for log fingerprints.
const FINGERPRINT_DOMAIN: &[u8] = b"TICKET_QR_LOOKUP_V1:";

/// Random identifier for an indirection store entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupId(String);

impl LookupId {
    /// Mint a fresh random identifier (UUIDv4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an identifier submitted by a client.
    pub fn from_client(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Store key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hash for logs. Identifiers are bearer values and never logged raw.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_DOMAIN);
        hasher.update(self.0.as_bytes());
        let hash = hasher.finalize();
        hex::encode(&hash[..8])
    }
}

impl fmt::Debug for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LookupId({})", self.fingerprint())
    }
}

impl fmt::Display for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_generate_is_uuid_shaped() {
        let id = LookupId::generate();
        assert_eq!(id.as_str().len(), 36);
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_generate_unique() {
        let ids: BTreeSet<LookupId> = (0..1000).map(|_| LookupId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_fingerprint_stable_and_hides_value() {
        let id = LookupId::from_client("3f1c2a9e-0000-4000-8000-000000000001");
        assert_eq!(id.fingerprint(), id.fingerprint());
        assert_eq!(id.fingerprint().len(), 16);

        let shown = format!("{} {:?}", id, id);
        assert!(!shown.contains(id.as_str()));
    }
}
