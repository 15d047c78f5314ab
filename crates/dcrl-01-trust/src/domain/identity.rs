//! # Node Identity
//!
//! A node's own certificate plus the private key matching its signing key.
//!
//! ## Key files
//!
//! Identities live on disk as three files sharing a base name:
//!
//! | File | Content |
//! |------|---------|
//! | `<base>.cert` | Encoded `Certificate` |
//! | `<base>.priv` | 32-byte Ed25519 seed, or 64 bytes of seed followed by the public key |
//! | `<base>.pub` | 32-byte public key (optional when loading) |

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use shared_crypto::Ed25519KeyPair;
use shared_types::{wire, Certificate, CertificateHash, SignedMessage, SignedPayload};
use tracing::info;

use super::errors::TrustError;
use super::gate;

pub const CERT_EXTENSION: &str = "cert";
pub const PRIVATE_KEY_EXTENSION: &str = "priv";
pub const PUBLIC_KEY_EXTENSION: &str = "pub";

/// `<base>.<extension>`, without replacing any dot already in `base`.
pub fn key_file_path(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// The certificate and key a node signs with.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    certificate: Certificate,
    keypair: Ed25519KeyPair,
}

impl NodeIdentity {
    /// Pair a certificate with its private key. Fails when the key does not
    /// match `certificate.signing_public_key`.
    pub fn new(certificate: Certificate, keypair: Ed25519KeyPair) -> Result<Self, TrustError> {
        if keypair.public_key().as_bytes()[..] != certificate.signing_public_key[..] {
            return Err(TrustError::KeyMismatch {
                path: PathBuf::from(&certificate.subject),
            });
        }
        Ok(Self {
            certificate,
            keypair,
        })
    }

    /// Load `<base>.cert` and `<base>.priv`, checking `<base>.pub` when present.
    pub fn load(base: &Path) -> Result<Self, TrustError> {
        let cert_path = key_file_path(base, CERT_EXTENSION);
        let priv_path = key_file_path(base, PRIVATE_KEY_EXTENSION);
        let pub_path = key_file_path(base, PUBLIC_KEY_EXTENSION);

        let cert_bytes = fs::read(&cert_path).map_err(|e| TrustError::io(&cert_path, e))?;
        let certificate: Certificate = wire::decode(&cert_bytes)?;

        let priv_bytes = fs::read(&priv_path).map_err(|e| TrustError::io(&priv_path, e))?;
        let keypair = Ed25519KeyPair::from_key_bytes(&priv_bytes)?;

        if keypair.public_key().as_bytes()[..] != certificate.signing_public_key[..] {
            return Err(TrustError::KeyMismatch { path: priv_path });
        }
        if pub_path.is_file() {
            let pub_bytes = fs::read(&pub_path).map_err(|e| TrustError::io(&pub_path, e))?;
            if pub_bytes[..] != certificate.signing_public_key[..] {
                return Err(TrustError::KeyMismatch { path: pub_path });
            }
        }

        info!(subject = %certificate.subject, base = %base.display(), "Loaded node identity");
        Ok(Self {
            certificate,
            keypair,
        })
    }

    /// Write the three key files for `base`.
    pub fn save(&self, base: &Path) -> Result<(), TrustError> {
        let cert_path = key_file_path(base, CERT_EXTENSION);
        let priv_path = key_file_path(base, PRIVATE_KEY_EXTENSION);
        let pub_path = key_file_path(base, PUBLIC_KEY_EXTENSION);

        fs::write(&cert_path, wire::encode(&self.certificate)?)
            .map_err(|e| TrustError::io(&cert_path, e))?;
        fs::write(&priv_path, self.keypair.to_seed()).map_err(|e| TrustError::io(&priv_path, e))?;
        fs::write(&pub_path, self.keypair.public_key().as_bytes())
            .map_err(|e| TrustError::io(&pub_path, e))?;
        Ok(())
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn subject(&self) -> &str {
        &self.certificate.subject
    }

    pub fn keypair(&self) -> &Ed25519KeyPair {
        &self.keypair
    }

    pub fn certificate_hash(&self) -> Result<CertificateHash, TrustError> {
        gate::hash_certificate(&self.certificate)
    }

    /// Sign `payload` as this node.
    pub fn seal(&self, payload: SignedPayload) -> Result<SignedMessage, TrustError> {
        gate::seal(&self.certificate, payload, &self.keypair)
    }
}
