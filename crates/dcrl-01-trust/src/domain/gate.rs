//! # Crypto Gate
//!
//! Certificate-aware wrappers around the signing primitive. Every signature
//! in the system is made over bytes produced here, so the canonical encoding
//! lives in exactly one place.

use shared_crypto::{merkle_root, sha256, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use shared_types::{
    wire, Certificate, CertificateHash, CertificateRevocation, SignedMessage, SignedPayload,
};

use super::errors::TrustError;

/// Hash of a certificate's canonical encoding, signature included.
pub fn hash_certificate(cert: &Certificate) -> Result<CertificateHash, TrustError> {
    Ok(CertificateHash::new(sha256(&wire::encode(cert)?)))
}

/// Digest an issuer signs: SHA-256 of the certificate with its
/// `issuer_signature` cleared.
pub fn signable_digest(cert: &Certificate) -> Result<[u8; 32], TrustError> {
    Ok(sha256(&wire::encode(&cert.without_signature())?))
}

/// Issue `cert` under `issuer`, or self-sign it when `issuer` is `None`.
///
/// When self-signing, `key` must be the subject's own key.
pub fn sign_certificate(
    mut cert: Certificate,
    issuer: Option<&Certificate>,
    key: &Ed25519KeyPair,
) -> Result<Certificate, TrustError> {
    cert.issuer_certificate_hash = match issuer {
        Some(issuer) => hash_certificate(issuer)?.as_bytes().to_vec(),
        None => Vec::new(),
    };
    cert.issuer_signature = Vec::new();
    let digest = signable_digest(&cert)?;
    cert.issuer_signature = key.sign(&digest).to_vec();
    Ok(cert)
}

/// Check `cert.issuer_signature` against an issuer public key.
pub fn verify_certificate_signature(
    cert: &Certificate,
    issuer_public_key: &[u8],
) -> Result<(), TrustError> {
    let key = Ed25519PublicKey::from_slice(issuer_public_key)?;
    let signature = Ed25519Signature::from_slice(&cert.issuer_signature)?;
    key.verify(&signable_digest(cert)?, &signature)?;
    Ok(())
}

/// Merkle root of a block's revocations, each leaf the SHA-256 of one
/// encoded revocation. Empty when there are none.
pub fn revocation_merkle_root(revocations: &[CertificateRevocation]) -> Result<Vec<u8>, TrustError> {
    let leaves = revocations
        .iter()
        .map(|revocation| Ok(sha256(&wire::encode(revocation)?)))
        .collect::<Result<Vec<_>, TrustError>>()?;
    Ok(merkle_root(&leaves))
}

/// Canonical bytes of a signed payload. The enum tag is included.
pub fn payload_bytes(payload: &SignedPayload) -> Result<Vec<u8>, TrustError> {
    Ok(wire::encode(payload)?)
}

/// Wrap `payload` in a `SignedMessage` from the holder of `certificate`.
pub fn seal(
    certificate: &Certificate,
    payload: SignedPayload,
    key: &Ed25519KeyPair,
) -> Result<SignedMessage, TrustError> {
    let signature = key.sign(&payload_bytes(&payload)?).to_vec();
    Ok(SignedMessage {
        certificate: certificate.clone(),
        payload,
        signature,
    })
}

/// Check a message signature against the certificate embedded in it.
///
/// This says nothing about whether that certificate is trusted.
pub fn verify_message_signature(message: &SignedMessage) -> Result<(), TrustError> {
    let key = Ed25519PublicKey::from_slice(&message.certificate.signing_public_key)?;
    let signature = Ed25519Signature::from_slice(&message.signature)?;
    key.verify(&payload_bytes(&message.payload)?, &signature)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestPrincipal;
    use shared_types::{Announce, CertificateUsage, ErrorMessage};

    fn self_signed(key: &Ed25519KeyPair) -> Certificate {
        let cert = Certificate::new(
            "alice",
            0,
            100,
            [CertificateUsage::Participation],
            key.public_key().as_bytes().to_vec(),
        );
        sign_certificate(cert, None, key).unwrap()
    }

    #[test]
    fn test_hash_covers_signature() {
        let key = Ed25519KeyPair::generate();
        let cert = self_signed(&key);
        let mut tampered = cert.clone();
        tampered.issuer_signature[0] ^= 1;
        assert_ne!(
            hash_certificate(&cert).unwrap(),
            hash_certificate(&tampered).unwrap()
        );
        assert_eq!(
            signable_digest(&cert).unwrap(),
            signable_digest(&tampered).unwrap()
        );
    }

    #[test]
    fn test_self_signed_verifies_against_own_key() {
        let key = Ed25519KeyPair::generate();
        let cert = self_signed(&key);
        assert!(cert.is_self_signed());
        assert!(verify_certificate_signature(&cert, &cert.signing_public_key).is_ok());
    }

    #[test]
    fn test_issued_certificate_names_issuer() {
        let root_key = Ed25519KeyPair::generate();
        let root = self_signed(&root_key);
        let leaf_key = Ed25519KeyPair::generate();
        let leaf = Certificate::new(
            "bob",
            0,
            100,
            [CertificateUsage::Participation],
            leaf_key.public_key().as_bytes().to_vec(),
        );
        let leaf = sign_certificate(leaf, Some(&root), &root_key).unwrap();

        assert_eq!(
            leaf.issuer_certificate_hash,
            hash_certificate(&root).unwrap().as_bytes().to_vec()
        );
        assert!(verify_certificate_signature(&leaf, &root.signing_public_key).is_ok());
        assert!(verify_certificate_signature(&leaf, &leaf.signing_public_key).is_err());
    }

    #[test]
    fn test_signature_binds_payload() {
        let key = Ed25519KeyPair::generate();
        let cert = self_signed(&key);
        let mut message = seal(&cert, SignedPayload::Announce(Announce { nonce: 1 }), &key).unwrap();
        assert!(verify_message_signature(&message).is_ok());

        message.payload = SignedPayload::Announce(Announce { nonce: 2 });
        assert!(verify_message_signature(&message).is_err());

        message.payload = SignedPayload::Error(ErrorMessage::new("swapped"));
        assert!(verify_message_signature(&message).is_err());
    }

    #[test]
    fn test_truncated_signature_is_error() {
        let key = Ed25519KeyPair::generate();
        let mut cert = self_signed(&key);
        cert.issuer_signature.truncate(10);
        assert!(matches!(
            verify_certificate_signature(&cert, &cert.signing_public_key),
            Err(TrustError::Crypto(_))
        ));
    }

    #[test]
    fn test_revocation_merkle_root() {
        assert!(revocation_merkle_root(&[]).unwrap().is_empty());

        let revocation = CertificateRevocation {
            certificate: TestPrincipal::new("victim").build().certificate().clone(),
        };
        let root = revocation_merkle_root(&[revocation.clone()]).unwrap();
        assert_eq!(root.len(), 32);
        assert_eq!(
            root,
            revocation_merkle_root(&[revocation.clone(), revocation]).unwrap()
        );
    }
}
