//! # Trust Verifier
//!
//! Decides whether a certificate is trusted for a set of usages.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. validity window `[valid_from, valid_from + valid_length)`
//! 2. required usages granted
//! 3. not in the revocation ledger
//! 4. non-empty subject
//! 5. issuer resolvable (self, or directly in the trust store)
//! 6. issuer signature verifies
//!
//! Trust is one hop. An issuer is never itself checked against the store.

use std::sync::Arc;

use shared_types::{Certificate, CertificateHash, CertificateUsage};

use super::gate;
use super::ledger::RevocationLedger;
use super::rejection::Rejection;
use super::trust_store::TrustStore;

/// How self-signed certificates are treated at step 5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelfSignedPolicy {
    /// A self-signed certificate is its own issuer.
    #[default]
    Accept,
    /// A self-signed certificate must also be present in the trust store.
    RequireAnchor,
}

/// Verifier over a trust store and a revocation ledger.
#[derive(Debug, Clone)]
pub struct TrustVerifier {
    store: Arc<TrustStore>,
    ledger: Arc<RevocationLedger>,
    self_signed: SelfSignedPolicy,
}

impl TrustVerifier {
    pub fn new(
        store: Arc<TrustStore>,
        ledger: Arc<RevocationLedger>,
        self_signed: SelfSignedPolicy,
    ) -> Self {
        Self {
            store,
            ledger,
            self_signed,
        }
    }

    pub fn ledger(&self) -> &Arc<RevocationLedger> {
        &self.ledger
    }

    pub fn store(&self) -> &Arc<TrustStore> {
        &self.store
    }

    /// Verify `cert` for `required` usages at time `now` (unix seconds).
    pub fn verify(
        &self,
        cert: &Certificate,
        required: &[CertificateUsage],
        now: u64,
    ) -> Result<(), Rejection> {
        // 1. time
        if now < cert.valid_from {
            return Err(Rejection::NotYetValid {
                valid_from: cert.valid_from,
                now,
            });
        }
        let valid_until = cert.valid_until();
        if now >= valid_until {
            return Err(Rejection::Expired { valid_until, now });
        }

        // 2. usage
        let missing: Vec<_> = required
            .iter()
            .copied()
            .filter(|usage| !cert.usages.contains(usage))
            .collect();
        if !missing.is_empty() {
            return Err(Rejection::UsageMismatch { missing });
        }

        // 3. revocation
        let hash = gate::hash_certificate(cert)
            .map_err(|e| Rejection::Malformed(format!("certificate cannot be encoded: {e}")))?;
        if self.ledger.is_revoked(&hash) {
            return Err(Rejection::Revoked { hash });
        }

        // 4. subject
        if cert.subject.is_empty() {
            return Err(Rejection::Malformed("certificate subject is empty".into()));
        }

        // 5. issuer
        let issuer = self.resolve_issuer(cert, &hash)?;

        // 6. signature
        gate::verify_certificate_signature(cert, &issuer.signing_public_key)
            .map_err(|e| Rejection::BadSignature(format!("issuer signature invalid: {e}")))
    }

    fn resolve_issuer<'a>(
        &'a self,
        cert: &'a Certificate,
        hash: &CertificateHash,
    ) -> Result<&'a Certificate, Rejection> {
        if cert.is_self_signed() {
            if self.self_signed == SelfSignedPolicy::RequireAnchor && !self.store.contains(hash) {
                return Err(Rejection::Untrusted(format!(
                    "self-signed certificate {hash} is not in the trust store"
                )));
            }
            return Ok(cert);
        }

        let issuer_hash = CertificateHash::from_slice(&cert.issuer_certificate_hash).ok_or_else(|| {
            Rejection::Untrusted(format!(
                "issuer hash has {} bytes, expected 32",
                cert.issuer_certificate_hash.len()
            ))
        })?;
        self.store.get(&issuer_hash).ok_or_else(|| {
            Rejection::Untrusted(format!("issuer {issuer_hash} is not in the trust store"))
        })
    }
}
