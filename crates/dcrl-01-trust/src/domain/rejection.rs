//! Reasons a certificate is not trusted.

use std::fmt;

use shared_types::{CertificateHash, CertificateUsage, FailureClass};
use thiserror::Error;

/// Why a certificate was rejected. The display text is the human readable
/// detail; [`Rejection::kind`] is the stable name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Current time is before `valid_from`.
    #[error("not valid before {valid_from} (now {now})")]
    NotYetValid { valid_from: u64, now: u64 },

    /// Current time is at or past `valid_from + valid_length`.
    #[error("expired at {valid_until} (now {now})")]
    Expired { valid_until: u64, now: u64 },

    /// A required usage is not granted.
    #[error("missing required usage {}", join_usages(.missing))]
    UsageMismatch { missing: Vec<CertificateUsage> },

    /// The certificate is in the revocation ledger.
    #[error("certificate {hash} is revoked")]
    Revoked { hash: CertificateHash },

    /// The certificate is structurally unusable.
    #[error("{0}")]
    Malformed(String),

    /// No issuer could be resolved.
    #[error("{0}")]
    Untrusted(String),

    /// The issuer signature does not verify.
    #[error("{0}")]
    BadSignature(String),
}

fn join_usages(usages: &[CertificateUsage]) -> String {
    usages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Rejection {
    /// Stable kind name carried in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotYetValid { .. } | Self::Expired { .. } => "EXPIRED",
            Self::UsageMismatch { .. } => "USAGE_MISMATCH",
            Self::Revoked { .. } => "REVOKED",
            Self::Malformed(_) => "MALFORMED",
            Self::Untrusted(_) => "UNTRUSTED",
            Self::BadSignature(_) => "BAD_SIGNATURE",
        }
    }

    /// Failure class for connection handling.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::NotYetValid { .. }
            | Self::Expired { .. }
            | Self::UsageMismatch { .. }
            | Self::Revoked { .. } => FailureClass::Policy,
            Self::Malformed(_) | Self::Untrusted(_) | Self::BadSignature(_) => FailureClass::Auth,
        }
    }
}

/// A rejection bound to the subject of the certificate that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRejection {
    /// Subject of the rejected certificate (may be empty).
    pub subject: String,
    /// The reason.
    pub reason: Rejection,
}

impl CertificateRejection {
    pub fn new(subject: impl Into<String>, reason: Rejection) -> Self {
        Self {
            subject: subject.into(),
            reason,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.reason.kind()
    }
}

impl fmt::Display for CertificateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: certificate for '{}' rejected: {}",
            self.reason.kind(),
            self.subject,
            self.reason
        )
    }
}

impl std::error::Error for CertificateRejection {}
