//! # Revocation Gossip
//!
//! An authority revokes a certificate; the peer it picked records it.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use dcrl_01_trust::hash_certificate;
use dcrl_01_trust::test_utils::TestPrincipal;
use dcrl_02_peer_protocol::{CertificateStatus, RevocationStatus};
use node_runtime::Role;
use shared_types::{
    wire, CertificateRevocation, DcrlMessage, SignedPayload, UnsignedPayload,
};

use super::fixtures::{addr_of, eventually, start, Harness, RawPeer};

#[tokio::test]
async fn test_authority_revocation_reaches_connected_observer() {
    let harness = Harness::new();
    let observer = start(harness.config(Role::Observer, None)).await;

    let ca = TestPrincipal::authority("ca").build();
    let mut config = harness.config(Role::Authority, Some(&ca));
    config.peers = vec![addr_of(&observer)];
    let authority = start(config).await;
    eventually("observer to see the authority", || observer.peers().len() == 1).await;

    let victim = TestPrincipal::new("victim").build();
    let hash = hash_certificate(victim.certificate()).unwrap();
    assert_eq!(
        observer.check_certificate(&hash.to_hex()),
        CertificateStatus::NotRevoked
    );

    let encoded = STANDARD.encode(wire::encode(victim.certificate()).unwrap());
    assert_eq!(
        authority.revoke_certificate(&encoded).await,
        RevocationStatus::Started
    );

    eventually("observer to record the revocation", || {
        observer.check_certificate(&hash.to_hex()) == CertificateStatus::Revoked
    })
    .await;
    // Base64 spelling of the same hash.
    assert_eq!(
        observer.check_certificate(&URL_SAFE_NO_PAD.encode(hash.as_bytes())),
        CertificateStatus::Revoked
    );
    assert_eq!(
        authority.check_certificate(&hash.to_hex()),
        CertificateStatus::Revoked
    );

    // Idempotent: a second revocation leaves one ledger entry.
    assert_eq!(
        authority.revoke_certificate(&encoded).await,
        RevocationStatus::Started
    );
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(observer.revoked_count(), 1);
    assert_eq!(authority.revoked_count(), 1);

    authority.shutdown().await;
    observer.shutdown().await;
}

#[tokio::test]
async fn test_revocation_without_peers_is_rejected() {
    let harness = Harness::new();
    let ca = TestPrincipal::authority("lonely-ca").build();
    let authority = start(harness.config(Role::Authority, Some(&ca))).await;

    let victim = TestPrincipal::new("victim").build();
    let encoded = STANDARD.encode(wire::encode(victim.certificate()).unwrap());
    assert_eq!(
        authority.revoke_certificate(&encoded).await,
        RevocationStatus::Rejected
    );
    assert_eq!(
        authority.revoke_certificate("not a certificate").await,
        RevocationStatus::Rejected
    );
    assert_eq!(authority.revoked_count(), 0);
    authority.shutdown().await;
}

#[tokio::test]
async fn test_participant_cannot_revoke() {
    let harness = Harness::new();
    let observer = start(harness.config(Role::Observer, None)).await;
    let me = TestPrincipal::new("participant").build();
    let mut config = harness.config(Role::Participant, Some(&me));
    config.peers = vec![addr_of(&observer)];
    let participant = start(config).await;

    let victim = TestPrincipal::new("victim").build();
    let encoded = STANDARD.encode(wire::encode(victim.certificate()).unwrap());
    assert_eq!(
        participant.revoke_certificate(&encoded).await,
        RevocationStatus::Rejected
    );
    participant.shutdown().await;
    observer.shutdown().await;
}

#[tokio::test]
async fn test_revocation_from_non_authority_signer_is_ignored() {
    // A participant certificate lacks AUTHORITY; signing a revocation with it
    // must not touch the receiving ledger.
    let harness = Harness::new();
    let observer = start(harness.config(Role::Observer, None)).await;
    let mut client = RawPeer::connect(&observer).await;

    let mallory = TestPrincipal::new("mallory").build();
    let victim = TestPrincipal::new("victim").build();
    let signed = mallory
        .seal(SignedPayload::CertificateRevocation(CertificateRevocation {
            certificate: victim.certificate().clone(),
        }))
        .unwrap();
    client.send(&DcrlMessage::Signed(signed)).await;

    let Some(DcrlMessage::Unsigned(reply)) = client.recv().await else {
        panic!("expected an unsigned error from the observer");
    };
    let UnsignedPayload::Error(error) = reply.payload else {
        panic!("expected an error payload");
    };
    assert!(error.error.starts_with("Bad revocation"));
    assert!(error.error.contains("USAGE_MISMATCH"));
    assert_eq!(observer.revoked_count(), 0);
    observer.shutdown().await;
}

#[tokio::test]
async fn test_anchored_policy_requires_trusted_authority() {
    let harness = Harness::new();
    let anchored_ca = TestPrincipal::authority("anchored-ca").build();
    harness.trust("anchored-ca.cert", anchored_ca.certificate());

    let mut observer_config = harness.config(Role::Observer, None);
    observer_config.require_anchored_self_signed = true;
    let observer = start(observer_config).await;

    let victim = TestPrincipal::new("victim").build();
    let hash = hash_certificate(victim.certificate()).unwrap().to_hex();
    let encoded = STANDARD.encode(wire::encode(victim.certificate()).unwrap());

    // Not in the trust store: the observer refuses the revocation.
    let rogue_ca = TestPrincipal::authority("rogue-ca").build();
    let mut config = harness.config(Role::Authority, Some(&rogue_ca));
    config.peers = vec![addr_of(&observer)];
    let rogue = start(config).await;
    assert_eq!(rogue.revoke_certificate(&encoded).await, RevocationStatus::Started);

    // Same signer over a raw connection: the refusal comes back as an error
    // reply, after which the ledger must still be empty.
    let mut client = RawPeer::connect(&observer).await;
    let signed = rogue_ca
        .seal(SignedPayload::CertificateRevocation(CertificateRevocation {
            certificate: victim.certificate().clone(),
        }))
        .unwrap();
    client.send(&DcrlMessage::Signed(signed)).await;
    let Some(DcrlMessage::Unsigned(reply)) = client.recv().await else {
        panic!("expected an unsigned error from the observer");
    };
    let UnsignedPayload::Error(error) = reply.payload else {
        panic!("expected an error payload");
    };
    assert!(error.error.contains("UNTRUSTED"), "{}", error.error);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(observer.check_certificate(&hash), CertificateStatus::NotRevoked);
    assert_eq!(observer.revoked_count(), 0);

    // In the trust store: accepted.
    let mut config = harness.config(Role::Authority, Some(&anchored_ca));
    config.peers = vec![addr_of(&observer)];
    let trusted = start(config).await;
    assert_eq!(trusted.revoke_certificate(&encoded).await, RevocationStatus::Started);

    eventually("anchored revocation", || {
        observer.check_certificate(&hash) == CertificateStatus::Revoked
    })
    .await;
    assert_eq!(observer.revoked_count(), 1);

    rogue.shutdown().await;
    trusted.shutdown().await;
    observer.shutdown().await;
}
