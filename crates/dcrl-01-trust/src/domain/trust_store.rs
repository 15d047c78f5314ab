//! # Trust Store
//!
//! Certificates accepted as issuers, loaded once from a directory in which
//! every regular file holds one encoded certificate. Read-only after load.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use shared_types::{wire, Certificate, CertificateHash};
use tracing::{debug, info, warn};

use super::errors::TrustError;
use super::gate::hash_certificate;

/// Immutable map from certificate hash to trusted certificate.
#[derive(Debug, Default, Clone)]
pub struct TrustStore {
    certificates: HashMap<CertificateHash, Certificate>,
}

impl TrustStore {
    /// An empty store. Only self-signed certificates can be trusted with it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from certificates already in memory.
    pub fn from_certificates(
        certificates: impl IntoIterator<Item = Certificate>,
    ) -> Result<Self, TrustError> {
        let mut map = HashMap::new();
        for cert in certificates {
            map.insert(hash_certificate(&cert)?, cert);
        }
        Ok(Self { certificates: map })
    }

    /// Load every certificate file in `dir`.
    ///
    /// Subdirectories and files that do not decode are skipped with a
    /// warning. Failing to list the directory itself is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, TrustError> {
        let entries = fs::read_dir(dir).map_err(|e| TrustError::io(dir, e))?;
        let mut certificates = HashMap::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Skipping unreadable trust store entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                warn!(path = %path.display(), "Skipping non-file in trust store");
                continue;
            }
            let cert = match fs::read(&path)
                .map_err(|e| TrustError::io(&path, e))
                .and_then(|bytes| Ok(wire::decode::<Certificate>(&bytes)?))
            {
                Ok(cert) => cert,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unparsable trust store file");
                    continue;
                }
            };
            let hash = hash_certificate(&cert)?;
            debug!(path = %path.display(), subject = %cert.subject, %hash, "Loaded trusted certificate");
            certificates.insert(hash, cert);
        }

        info!(dir = %dir.display(), count = certificates.len(), "Trust store loaded");
        Ok(Self { certificates })
    }

    pub fn get(&self, hash: &CertificateHash) -> Option<&Certificate> {
        self.certificates.get(hash)
    }

    pub fn contains(&self, hash: &CertificateHash) -> bool {
        self.certificates.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}
