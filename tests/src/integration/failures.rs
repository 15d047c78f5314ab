//! # Failure Handling
//!
//! Policy failures are answered and the connection survives; decode failures
//! tear down exactly the offending connection.

use dcrl_01_trust::test_utils::TestPrincipal;
use dcrl_01_trust::verify_message_signature;
use node_runtime::Role;
use shared_types::{
    BlockMessage, BlockchainRequest, CertificateUsage, DcrlMessage, SignedPayload,
    UnsignedPayload,
};

use super::fixtures::{eventually, start, Harness, RawPeer};

#[tokio::test]
async fn test_block_from_non_participant_is_answered_and_connection_survives() {
    let harness = Harness::new();
    let q_identity = TestPrincipal::new("q").build();
    let q = start(harness.config(Role::Participant, Some(&q_identity))).await;
    let mut client = RawPeer::connect(&q).await;

    let mallory = TestPrincipal::new("mallory")
        .usages([CertificateUsage::Authority])
        .build();
    let block = mallory
        .seal(SignedPayload::Block(BlockMessage::genesis()))
        .unwrap();
    client.send(&DcrlMessage::Signed(block)).await;

    let Some(DcrlMessage::Signed(reply)) = client.recv().await else {
        panic!("participant errors are signed");
    };
    assert_eq!(&reply.certificate, q_identity.certificate());
    assert!(verify_message_signature(&reply).is_ok());
    let SignedPayload::Error(error) = reply.payload else {
        panic!("expected an error payload");
    };
    assert!(error.error.contains("USAGE_MISMATCH"), "{}", error.error);
    assert!(error.error.contains("mallory"), "{}", error.error);

    // Same connection, next request still served.
    client
        .send(&DcrlMessage::unsigned(UnsignedPayload::BlockchainRequest(
            BlockchainRequest,
        )))
        .await;
    let Some(DcrlMessage::Signed(reply)) = client.recv().await else {
        panic!("expected a signed blockchain response");
    };
    assert!(matches!(reply.payload, SignedPayload::BlockchainResponse(_)));
    assert_eq!(q.peers(), vec![client.identity()]);

    q.shutdown().await;
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let harness = Harness::new();
    let q = start(harness.config(
        Role::Participant,
        Some(&TestPrincipal::new("q").build()),
    ))
    .await;
    let mut client = RawPeer::connect(&q).await;

    let sender = TestPrincipal::new("sender").build();
    let mut signed = sender
        .seal(SignedPayload::Announce(shared_types::Announce { nonce: 1 }))
        .unwrap();
    signed.payload = SignedPayload::Announce(shared_types::Announce { nonce: 2 });
    client.send(&DcrlMessage::Signed(signed)).await;

    let Some(DcrlMessage::Signed(reply)) = client.recv().await else {
        panic!("expected a signed error");
    };
    let SignedPayload::Error(error) = reply.payload else {
        panic!("expected an error payload");
    };
    assert!(error.error.starts_with("BAD_SIGNATURE"), "{}", error.error);
    assert!(q.known_peers().is_empty());

    q.shutdown().await;
}

#[tokio::test]
async fn test_malformed_frame_tears_down_only_that_connection() {
    let harness = Harness::new();
    let observer = start(harness.config(Role::Observer, None)).await;
    let mut bad = RawPeer::connect(&observer).await;
    let mut good = RawPeer::connect(&observer).await;
    eventually("both connections accepted", || observer.peers().len() == 2).await;

    bad.send_frame(&[0xFF, 0xFF, 0xFF, 0xFF, 0x01]).await;
    assert!(bad.recv().await.is_none(), "node closes the malformed connection");
    eventually("bad entry removed", || observer.peers().len() == 1).await;
    assert_eq!(observer.peers(), vec![good.identity()]);

    good.send(&DcrlMessage::unsigned(UnsignedPayload::BlockchainRequest(
        BlockchainRequest,
    )))
    .await;
    let Some(DcrlMessage::Unsigned(reply)) = good.recv().await else {
        panic!("observer errors are unsigned");
    };
    let UnsignedPayload::Error(error) = reply.payload else {
        panic!("expected an error payload");
    };
    assert!(error.error.contains("not supported"));
    assert_eq!(observer.peers().len(), 1);

    observer.shutdown().await;
}

#[tokio::test]
async fn test_oversized_length_header_is_a_decode_failure() {
    let harness = Harness::new();
    let observer = start(harness.config(Role::Observer, None)).await;
    let mut client = RawPeer::connect(&observer).await;
    eventually("connection accepted", || observer.peers().len() == 1).await;

    // Length header only; the node must not wait for 4 GiB of payload.
    client.send_raw(&u32::MAX.to_be_bytes()).await;
    assert!(client.recv().await.is_none());
    eventually("entry removed", || observer.peers().is_empty()).await;

    observer.shutdown().await;
}
