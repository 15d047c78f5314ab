//! Error types for the trust engine.

use std::path::PathBuf;

use shared_crypto::CryptoError;
use shared_types::WireError;
use thiserror::Error;

/// Failures that are not certificate rejections: encoding, key material and
/// files on disk.
#[derive(Debug, Error)]
pub enum TrustError {
    /// A value could not be encoded or decoded canonically.
    #[error("Encoding error: {0}")]
    Wire(#[from] WireError),

    /// Key or signature material is unusable.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A file or directory could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The private key does not belong to the certificate it was loaded with.
    #[error("Key mismatch: {path} does not match the certificate's signing key")]
    KeyMismatch { path: PathBuf },
}

impl TrustError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
