//! Error types for the peer protocol.

use std::time::Duration;

use dcrl_01_trust::TrustError;
use shared_types::{FailureClass, NetworkIdentity, WireError};
use thiserror::Error;

/// Errors raised while talking to peers.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A frame did not decode, or its length header is out of bounds.
    #[error("Decode error: {0}")]
    Decode(#[from] WireError),

    /// Socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No open connection for this identity.
    #[error("Not connected to {0}")]
    NotConnected(NetworkIdentity),

    /// No peer available for the operation.
    #[error("No connected peers")]
    NoPeers,

    /// A response did not arrive in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The connection carrying a pending request went away.
    #[error("Request abandoned: {0}")]
    Abandoned(String),

    /// Signing or encoding through the trust engine failed.
    #[error("Trust error: {0}")]
    Trust(#[from] TrustError),
}

impl ProtocolError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Decode(_) => FailureClass::Decode,
            Self::Io(_) | Self::NotConnected(_) => FailureClass::Io,
            Self::NoPeers | Self::Timeout(_) | Self::Abandoned(_) | Self::Trust(_) => {
                FailureClass::Application
            }
        }
    }
}
