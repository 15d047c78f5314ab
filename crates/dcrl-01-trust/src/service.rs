//! # Trust Service
//!
//! Wires the domain verifier to a time source and implements [`TrustApi`].
//!
//! ```rust,ignore
//! let store = Arc::new(TrustStore::load_dir(Path::new("./trust"))?);
//! let service = TrustService::new(store, Arc::new(RevocationLedger::new()),
//!     SelfSignedPolicy::Accept, Arc::new(SystemTimeSource));
//! service.verify(&cert, &[CertificateUsage::Participation])?;
//! ```

use std::sync::Arc;

use shared_types::{Certificate, CertificateHash, CertificateUsage, SignedMessage};
use tracing::debug;

use crate::domain::errors::TrustError;
use crate::domain::gate;
use crate::domain::ledger::RevocationLedger;
use crate::domain::rejection::{CertificateRejection, Rejection};
use crate::domain::trust_store::TrustStore;
use crate::domain::verifier::{SelfSignedPolicy, TrustVerifier};
use crate::ports::{TimeSource, TrustApi};

/// Trust engine shared by every connection of a node.
pub struct TrustService {
    verifier: TrustVerifier,
    time_source: Arc<dyn TimeSource>,
}

impl TrustService {
    pub fn new(
        store: Arc<TrustStore>,
        ledger: Arc<RevocationLedger>,
        self_signed: SelfSignedPolicy,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            verifier: TrustVerifier::new(store, ledger, self_signed),
            time_source,
        }
    }

    pub fn ledger(&self) -> &Arc<RevocationLedger> {
        self.verifier.ledger()
    }

    pub fn store(&self) -> &Arc<TrustStore> {
        self.verifier.store()
    }
}

impl TrustApi for TrustService {
    fn verify(
        &self,
        cert: &Certificate,
        required: &[CertificateUsage],
    ) -> Result<(), CertificateRejection> {
        let now = self.time_source.now();
        self.verifier
            .verify(cert, required, now)
            .map_err(|reason| {
                debug!(subject = %cert.subject, kind = reason.kind(), %reason, "Certificate rejected");
                CertificateRejection::new(cert.subject.clone(), reason)
            })
    }

    fn verify_signed(
        &self,
        message: &SignedMessage,
        required: &[CertificateUsage],
    ) -> Result<(), CertificateRejection> {
        self.verify(&message.certificate, required)?;
        gate::verify_message_signature(message).map_err(|e| {
            CertificateRejection::new(
                message.certificate.subject.clone(),
                Rejection::BadSignature(format!("message signature invalid: {e}")),
            )
        })
    }

    fn is_revoked(&self, hash: &CertificateHash) -> bool {
        self.ledger().is_revoked(hash)
    }

    fn record_revocation(&self, cert: Certificate) -> Result<bool, TrustError> {
        self.ledger().revoke(cert)
    }

    fn revoked_count(&self) -> usize {
        self.ledger().len()
    }
}
