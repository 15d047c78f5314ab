//! # Inbound Ports (Driving Ports / API)
//!
//! What the peer protocol asks of the trust engine.

use shared_types::{Certificate, CertificateHash, CertificateUsage, SignedMessage};

use crate::domain::errors::TrustError;
use crate::domain::rejection::CertificateRejection;

/// Certificate trust and revocation queries.
pub trait TrustApi: Send + Sync {
    /// Verify `cert` for `required` usages at the current time.
    fn verify(
        &self,
        cert: &Certificate,
        required: &[CertificateUsage],
    ) -> Result<(), CertificateRejection>;

    /// Verify the sender certificate of `message` for `required` usages, then
    /// the message signature against that certificate.
    ///
    /// A signature failure is reported as `BAD_SIGNATURE`.
    fn verify_signed(
        &self,
        message: &SignedMessage,
        required: &[CertificateUsage],
    ) -> Result<(), CertificateRejection>;

    /// True when `hash` is in the revocation ledger.
    fn is_revoked(&self, hash: &CertificateHash) -> bool;

    /// Add `cert` to the revocation ledger. Returns `true` when newly added.
    fn record_revocation(&self, cert: Certificate) -> Result<bool, TrustError>;

    /// Number of revoked certificates.
    fn revoked_count(&self) -> usize;
}
