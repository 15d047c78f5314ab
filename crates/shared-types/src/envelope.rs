//! # Protocol Envelope
//!
//! Every frame on a peer connection carries exactly one `DcrlMessage`.
//!
//! ## Security Properties
//!
//! - **Signed payloads** carry the sender's certificate and an Ed25519
//!   signature over the canonical encoding of the payload.
//! - **Unsigned payloads** are limited to requests and errors that a node
//!   without an identity (an Observer) must be able to send.
//! - There is no replay protection; revocation application is idempotent.

use serde::{Deserialize, Serialize};

use crate::entities::{
    Announce, BlockMessage, BlockRequest, BlockResponse, BlockchainRequest, BlockchainResponse,
    Certificate, CertificateRevocation, ErrorMessage,
};

/// Top-level protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DcrlMessage {
    /// Payload sent without authentication.
    Unsigned(UnsignedMessage),
    /// Payload authenticated by the sender's certificate.
    Signed(SignedMessage),
}

impl DcrlMessage {
    /// Short name of the payload kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unsigned(msg) => msg.payload.kind(),
            Self::Signed(msg) => msg.payload.kind(),
        }
    }

    /// Wrap an unsigned payload.
    pub fn unsigned(payload: UnsignedPayload) -> Self {
        Self::Unsigned(UnsignedMessage { payload })
    }

    /// Unsigned error reply.
    pub fn unsigned_error(reason: impl Into<String>) -> Self {
        Self::unsigned(UnsignedPayload::Error(ErrorMessage::new(reason)))
    }
}

/// An unsigned message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedMessage {
    /// The payload.
    pub payload: UnsignedPayload,
}

/// Payloads that may travel without a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsignedPayload {
    /// Ask for the whole revocation history.
    BlockchainRequest(BlockchainRequest),
    /// Ask for a single block.
    BlockRequest(BlockRequest),
    /// Unauthenticated error report.
    Error(ErrorMessage),
}

impl UnsignedPayload {
    /// Short name of the payload kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BlockchainRequest(_) => "BlockchainRequest",
            Self::BlockRequest(_) => "BlockRequest",
            Self::Error(_) => "Error",
        }
    }
}

/// A signed message.
///
/// `signature` covers the canonical encoding of `payload` only, made with the
/// key bound in `certificate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// Sender certificate.
    pub certificate: Certificate,
    /// The payload.
    pub payload: SignedPayload,
    /// Ed25519 signature over the payload.
    pub signature: Vec<u8>,
}

/// Payloads that must be signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignedPayload {
    /// Authority revocation.
    CertificateRevocation(CertificateRevocation),
    /// A new block.
    Block(BlockMessage),
    /// Reply to `BlockchainRequest`.
    BlockchainResponse(BlockchainResponse),
    /// Reply to `BlockRequest`.
    BlockResponse(BlockResponse),
    /// Membership advertisement.
    Announce(Announce),
    /// Authenticated error report.
    Error(ErrorMessage),
}

impl SignedPayload {
    /// Short name of the payload kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CertificateRevocation(_) => "CertificateRevocation",
            Self::Block(_) => "Block",
            Self::BlockchainResponse(_) => "BlockchainResponse",
            Self::BlockResponse(_) => "BlockResponse",
            Self::Announce(_) => "Announce",
            Self::Error(_) => "Error",
        }
    }
}
