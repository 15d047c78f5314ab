//! # Core Domain Entities
//!
//! Value types for the certificate trust network.
//!
//! ## Clusters
//!
//! - **Networking**: `NetworkIdentity`
//! - **Certificates**: `Certificate`, `CertificateUsage`, `CertificateHash`
//! - **Revocation history**: `BlockMessage` and friends (shapes only, no consensus)

use std::collections::BTreeSet;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::IdentityParseError;

// =============================================================================
// CLUSTER A: NETWORKING
// =============================================================================

/// A `host:port` pair identifying a peer.
///
/// An identity is not a connection; the same identity can be reconnected many
/// times over the lifetime of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkIdentity {
    /// Host name or textual IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl NetworkIdentity {
    /// Create an identity from its parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `(host, port)` tuple usable with `TcpStream::connect`.
    pub fn as_connect_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl From<SocketAddr> for NetworkIdentity {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl FromStr for NetworkIdentity {
    type Err = IdentityParseError;

    /// Parses `"host:port"`. Bracketed IPv6 (`"[::1]:80"`) is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| IdentityParseError::MissingPort(s.to_string()))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(IdentityParseError::EmptyHost(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| IdentityParseError::InvalidPort(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

// =============================================================================
// CLUSTER B: CERTIFICATES
// =============================================================================

/// Capability tag carried by a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertificateUsage {
    /// May originate revocations.
    Authority,
    /// May speak on the gossip network.
    Participation,
}

impl fmt::Display for CertificateUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authority => write!(f, "AUTHORITY"),
            Self::Participation => write!(f, "PARTICIPATION"),
        }
    }
}

/// A certificate binding a subject to a signing key for a validity window.
///
/// `issuer_signature` is computed over the certificate with the signature
/// field itself cleared. An empty `issuer_certificate_hash` marks a
/// self-signed certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Who the certificate was issued to.
    pub subject: String,
    /// Start of validity, unix seconds.
    pub valid_from: u64,
    /// Validity length in seconds.
    pub valid_length: u64,
    /// Granted usages. A sorted set keeps the encoding canonical.
    pub usages: BTreeSet<CertificateUsage>,
    /// Ed25519 public key of the subject.
    pub signing_public_key: Vec<u8>,
    /// Hash of the issuer certificate, empty when self-signed.
    pub issuer_certificate_hash: Vec<u8>,
    /// Issuer signature over the signable digest.
    pub issuer_signature: Vec<u8>,
}

impl Certificate {
    /// Build an unsigned certificate.
    pub fn new(
        subject: impl Into<String>,
        valid_from: u64,
        valid_length: u64,
        usages: impl IntoIterator<Item = CertificateUsage>,
        signing_public_key: Vec<u8>,
    ) -> Self {
        Self {
            subject: subject.into(),
            valid_from,
            valid_length,
            usages: usages.into_iter().collect(),
            signing_public_key,
            issuer_certificate_hash: Vec::new(),
            issuer_signature: Vec::new(),
        }
    }

    /// True when the certificate names no issuer.
    pub fn is_self_signed(&self) -> bool {
        self.issuer_certificate_hash.is_empty()
    }

    /// Exclusive end of the validity window.
    pub fn valid_until(&self) -> u64 {
        self.valid_from.saturating_add(self.valid_length)
    }

    /// True when every usage in `required` is granted.
    pub fn has_usages(&self, required: &[CertificateUsage]) -> bool {
        required.iter().all(|usage| self.usages.contains(usage))
    }

    /// Copy of this certificate with `issuer_signature` cleared.
    pub fn without_signature(&self) -> Self {
        Self {
            issuer_signature: Vec::new(),
            ..self.clone()
        }
    }
}

/// SHA-256 digest of a certificate's canonical encoding.
///
/// This is the certificate's identity for trust and revocation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertificateHash(pub [u8; 32]);

impl CertificateHash {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Interpret a byte slice as a hash; `None` unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// URL-safe unpadded base64 rendering, the form used in query URLs.
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parse a hash given as hex or base64 (standard or URL-safe, padded or not).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.len() == 64 {
            if let Ok(bytes) = hex::decode(text) {
                return Self::from_slice(&bytes);
            }
        }
        [&URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD_NO_PAD, &STANDARD]
            .iter()
            .find_map(|engine| engine.decode(text).ok())
            .and_then(|bytes| Self::from_slice(&bytes))
    }
}

impl fmt::Display for CertificateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// =============================================================================
// CLUSTER C: REVOCATION HISTORY
// =============================================================================

/// Timestamp of the fixed genesis block (milliseconds).
pub const GENESIS_TIMESTAMP: u64 = 1_586_466_355_631;

/// Request to revoke `certificate`. Only meaningful when signed by an authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRevocation {
    /// The certificate being revoked.
    pub certificate: Certificate,
}

/// A block of revocations in the revocation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMessage {
    /// Creator of the block.
    pub certificate: Certificate,
    /// Height in the chain, genesis is 0.
    pub height: u64,
    /// Hash of the previous block.
    pub previous_block: Vec<u8>,
    /// Creation time in milliseconds.
    pub timestamp: u64,
    /// Merkle root over `certificate_revocations`, empty when there are none.
    pub merkle_root: Vec<u8>,
    /// Revocations recorded in this block.
    pub certificate_revocations: Vec<CertificateRevocation>,
}

impl BlockMessage {
    /// The fixed genesis block every node starts from.
    pub fn genesis() -> Self {
        Self {
            certificate: Certificate::default(),
            height: 0,
            previous_block: vec![0u8; 32],
            timestamp: GENESIS_TIMESTAMP,
            merkle_root: Vec::new(),
            certificate_revocations: Vec::new(),
        }
    }
}

/// Ask a peer for its whole revocation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainRequest;

/// A peer's whole revocation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainResponse {
    /// Blocks in height order.
    pub blocks: Vec<BlockMessage>,
}

/// Ask a peer for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRequest {
    /// Requested height.
    pub height: u64,
}

/// A single requested block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResponse {
    /// The block.
    pub block: BlockMessage,
}

/// Membership advertisement.
///
/// The nonce only makes repeated announces distinguishable; it is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announce {
    /// Random nonce.
    pub nonce: u64,
}

/// Human-readable error sent to a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Reason text.
    pub error: String,
}

impl ErrorMessage {
    /// Build from any displayable reason.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
