//! Test utilities for the trust engine.
//!
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use dcrl_01_trust::test_utils::{FixedTimeSource, TestPrincipal};
//! use dcrl_01_trust::TimeSource;
//!
//! let root = TestPrincipal::new("root").build();
//! let leaf = TestPrincipal::new("leaf").issued_by(&root).build();
//! assert!(!leaf.certificate().is_self_signed());
//! assert_eq!(FixedTimeSource::new(7).now(), 7);
//! ```

use shared_crypto::Ed25519KeyPair;
use shared_types::{Certificate, CertificateUsage};

use crate::domain::gate::sign_certificate;
use crate::domain::identity::NodeIdentity;
use crate::ports::outbound::TimeSource;

/// Validity length used when a test does not care (about 126 years).
pub const LONG_VALIDITY: u64 = 4_000_000_000;

/// A time source that returns a fixed timestamp (seconds).
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: u64,
}

impl FixedTimeSource {
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> u64 {
        self.timestamp
    }
}

/// Builder for signed certificates with fresh keys.
///
/// Defaults: PARTICIPATION usage, valid from 0 for [`LONG_VALIDITY`]
/// seconds, self-signed.
pub struct TestPrincipal<'a> {
    subject: String,
    usages: Vec<CertificateUsage>,
    valid_from: u64,
    valid_length: u64,
    issuer: Option<&'a NodeIdentity>,
}

impl<'a> TestPrincipal<'a> {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            usages: vec![CertificateUsage::Participation],
            valid_from: 0,
            valid_length: LONG_VALIDITY,
            issuer: None,
        }
    }

    /// Shorthand for an AUTHORITY + PARTICIPATION principal.
    pub fn authority(subject: impl Into<String>) -> Self {
        Self::new(subject).usages([CertificateUsage::Authority, CertificateUsage::Participation])
    }

    pub fn usages(mut self, usages: impl IntoIterator<Item = CertificateUsage>) -> Self {
        self.usages = usages.into_iter().collect();
        self
    }

    pub fn window(mut self, valid_from: u64, valid_length: u64) -> Self {
        self.valid_from = valid_from;
        self.valid_length = valid_length;
        self
    }

    pub fn issued_by(mut self, issuer: &'a NodeIdentity) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Generate a key, sign the certificate and return the identity.
    pub fn build(self) -> NodeIdentity {
        let keypair = Ed25519KeyPair::generate();
        let cert = Certificate::new(
            self.subject,
            self.valid_from,
            self.valid_length,
            self.usages,
            keypair.public_key().as_bytes().to_vec(),
        );
        let cert = match self.issuer {
            Some(issuer) => sign_certificate(cert, Some(issuer.certificate()), issuer.keypair()),
            None => sign_certificate(cert, None, &keypair),
        }
        .expect("test certificate signs");
        NodeIdentity::new(cert, keypair).expect("fresh key matches certificate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_time_source_returns_configured_value() {
        let source = FixedTimeSource::new(1000);
        assert_eq!(source.now(), 1000);
        assert_eq!(source.timestamp(), 1000);
    }

    #[test]
    fn test_authority_principal_has_both_usages() {
        let identity = TestPrincipal::authority("ca").build();
        assert!(identity
            .certificate()
            .has_usages(&[CertificateUsage::Authority, CertificateUsage::Participation]));
    }
}
