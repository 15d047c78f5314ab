//! # Membership and Blockchain Plumbing

use dcrl_01_trust::test_utils::TestPrincipal;
use node_runtime::Role;
use shared_types::BlockMessage;

use super::fixtures::{addr_of, eventually, start, Harness};

#[tokio::test]
async fn test_announce_adds_participant_once() {
    let harness = Harness::new();
    let q_identity = TestPrincipal::new("q").build();
    let q = start(harness.config(Role::Participant, Some(&q_identity))).await;

    let p_identity = TestPrincipal::new("p").build();
    let mut config = harness.config(Role::Participant, Some(&p_identity));
    config.peers = vec![addr_of(&q)];
    let p = start(config).await;

    // P learned Q from its own configuration.
    assert_eq!(p.known_peers(), p.peers());
    assert_eq!(p.known_peers().len(), 1);

    eventually("Q to learn P from its announce", || q.known_peers().len() == 1).await;
    // Q knows P under the address it observed on the inbound connection.
    assert_eq!(q.known_peers(), q.peers());

    // Second announce, different nonce.
    assert_eq!(p.announce().await, 1);
    // Messages on one connection are handled in order: once the reply to
    // this request is back, Q has processed the second announce.
    let chain = p.request_blockchain().await.unwrap();
    assert_eq!(chain.blocks, vec![BlockMessage::genesis()]);
    assert_eq!(q.known_peers().len(), 1);

    p.shutdown().await;
    q.shutdown().await;
}

#[tokio::test]
async fn test_observer_pulls_blockchain_from_preferred_peer() {
    let harness = Harness::new();
    let first = start(harness.config(
        Role::Participant,
        Some(&TestPrincipal::new("first").build()),
    ))
    .await;
    let second = start(harness.config(
        Role::Participant,
        Some(&TestPrincipal::new("second").build()),
    ))
    .await;

    let mut config = harness.config(Role::Observer, None);
    config.peers = vec![addr_of(&first), addr_of(&second)];
    config.preferred_peers = vec![addr_of(&second)];
    let observer = start(config).await;
    assert_eq!(observer.peers().len(), 2);
    // Observers never announce.
    assert_eq!(observer.announce().await, 0);

    let chain = observer.request_blockchain().await.unwrap();
    assert_eq!(chain.blocks, vec![BlockMessage::genesis()]);

    observer.shutdown().await;
    first.shutdown().await;
    second.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_connections_on_both_sides() {
    let harness = Harness::new();
    let q = start(harness.config(
        Role::Participant,
        Some(&TestPrincipal::new("q").build()),
    ))
    .await;
    let mut config = harness.config(Role::Observer, None);
    config.peers = vec![addr_of(&q)];
    let observer = start(config).await;
    eventually("Q to see the observer", || q.peers().len() == 1).await;

    observer.shutdown().await;
    eventually("Q to drop the closed connection", || q.peers().is_empty()).await;
    q.shutdown().await;
}
