//! # Revocation Ledger
//!
//! Monotonic set of revoked certificates. Entries are never removed and
//! inserting an existing hash is a no-op, so revocations arriving in any
//! order from any number of peers converge to the same ledger.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::{Certificate, CertificateHash};

use super::errors::TrustError;
use super::gate::hash_certificate;

/// Thread-safe revocation set keyed by certificate hash.
#[derive(Debug, Default)]
pub struct RevocationLedger {
    revoked: RwLock<HashMap<CertificateHash, Certificate>>,
}

impl RevocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `cert` as revoked. Returns `true` when it was not revoked before.
    pub fn revoke(&self, cert: Certificate) -> Result<bool, TrustError> {
        let hash = hash_certificate(&cert)?;
        Ok(self.insert(hash, cert))
    }

    /// Record an already hashed certificate. Returns `true` when newly added.
    pub fn insert(&self, hash: CertificateHash, cert: Certificate) -> bool {
        let mut revoked = self.revoked.write();
        if revoked.contains_key(&hash) {
            return false;
        }
        revoked.insert(hash, cert);
        true
    }

    pub fn is_revoked(&self, hash: &CertificateHash) -> bool {
        self.revoked.read().contains_key(hash)
    }

    /// The revoked certificate for `hash`, if any.
    pub fn get(&self, hash: &CertificateHash) -> Option<Certificate> {
        self.revoked.read().get(hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.revoked.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.read().is_empty()
    }

    /// Sorted list of revoked hashes.
    pub fn hashes(&self) -> Vec<CertificateHash> {
        let mut hashes: Vec<_> = self.revoked.read().keys().copied().collect();
        hashes.sort();
        hashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestPrincipal;
    use std::sync::Arc;

    #[test]
    fn test_revoke_is_idempotent() {
        let ledger = RevocationLedger::new();
        let cert = TestPrincipal::new("x").build().certificate().clone();
        let hash = hash_certificate(&cert).unwrap();

        assert!(ledger.revoke(cert.clone()).unwrap());
        let after_first = (ledger.len(), ledger.hashes(), ledger.get(&hash));
        assert!(!ledger.revoke(cert).unwrap());
        let after_second = (ledger.len(), ledger.hashes(), ledger.get(&hash));

        assert_eq!(after_first, after_second);
        assert!(ledger.is_revoked(&hash));
    }

    #[test]
    fn test_concurrent_inserts_converge() {
        let ledger = Arc::new(RevocationLedger::new());
        let certs: Vec<_> = (0..8)
            .map(|i| TestPrincipal::new(format!("c{i}")).build().certificate().clone())
            .collect();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let certs = certs.clone();
                std::thread::spawn(move || {
                    for cert in certs {
                        ledger.revoke(cert).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), 8);
    }

    #[test]
    fn test_unknown_hash_not_revoked() {
        let ledger = RevocationLedger::new();
        assert!(ledger.is_empty());
        assert!(!ledger.is_revoked(&CertificateHash::new([3; 32])));
        assert_eq!(ledger.get(&CertificateHash::new([3; 32])), None);
    }
}
