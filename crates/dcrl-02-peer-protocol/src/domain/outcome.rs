//! Handler results and query-interface statuses.

use std::fmt;

use shared_types::DcrlMessage;

/// What a handler wants done on the connection the message arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Write this message back.
    Reply(DcrlMessage),
    /// Nothing to send.
    NoReply,
    /// Send an ErrorMessage with this reason. Signed when the node has an identity.
    Reject(String),
}

/// Result of a certificate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    NotRevoked,
    Revoked,
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRevoked => write!(f, "NOT_REVOKED"),
            Self::Revoked => write!(f, "REVOKED"),
        }
    }
}

/// Result of an authority revocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    Started,
    Rejected,
}

impl fmt::Display for RevocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "REVOCATION_STARTED"),
            Self::Rejected => write!(f, "REVOCATION_REJECTED"),
        }
    }
}
