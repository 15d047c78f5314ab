//! # Canonical Wire Encoding
//!
//! Fixed-width little-endian bincode with trailing bytes rejected. The same
//! options are used for hashing and signing, so two nodes always produce the
//! same bytes for the same value.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::WireError;

/// Largest message accepted on a connection (16 MiB).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .with_limit(MAX_MESSAGE_SIZE as u64)
}

/// Canonical encoding of `value`.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, WireError> {
    options()
        .serialize(value)
        .map_err(|e| WireError::Encode(e.to_string()))
}

/// Decode a value, rejecting trailing bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    options()
        .deserialize(bytes)
        .map_err(|e| WireError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Certificate, CertificateUsage};
    use crate::envelope::DcrlMessage;

    #[test]
    fn test_encoding_is_deterministic() {
        let a = Certificate::new(
            "alice",
            1,
            2,
            [CertificateUsage::Participation, CertificateUsage::Authority],
            vec![9; 32],
        );
        let b = Certificate::new(
            "alice",
            1,
            2,
            [CertificateUsage::Authority, CertificateUsage::Participation],
            vec![9; 32],
        );
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&DcrlMessage::unsigned_error("boom")).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode::<DcrlMessage>(&bytes),
            Err(WireError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode::<DcrlMessage>(&[0xFF, 0xFF, 0xFF, 0xFF, 0x01]).is_err());
        assert!(decode::<DcrlMessage>(&[]).is_err());
    }
}
