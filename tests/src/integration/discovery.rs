//! # Rendezvous Discovery

use dcrl_01_trust::test_utils::TestPrincipal;
use node_runtime::{NodeError, NodeRuntime, Role};
use shared_types::ServerAddress;

use super::fixtures::{eventually, start, Harness, MiniRendezvous};

#[tokio::test]
async fn test_nodes_find_each_other_through_rendezvous() {
    let harness = Harness::new();
    let rendezvous = MiniRendezvous::start().await;

    let mut config = harness.config(Role::Participant, Some(&TestPrincipal::new("a").build()));
    config.discovery = Some(rendezvous.addr());
    config.become_discoverable = true;
    let a = start(config).await;
    // The list returned to A includes A itself; it must not dial itself.
    assert!(a.peers().is_empty());
    assert_eq!(
        rendezvous.servers(),
        vec![ServerAddress {
            ip_address: "127.0.0.1".into(),
            port_number: a.local_addr().port(),
        }]
    );

    // Query-only hello: B learns A but is not listed.
    let mut config = harness.config(Role::Participant, Some(&TestPrincipal::new("b").build()));
    config.discovery = Some(rendezvous.addr());
    let b = start(config).await;
    assert_eq!(b.peers().len(), 1);
    assert_eq!(rendezvous.servers().len(), 1);
    eventually("A to learn B", || a.known_peers().len() == 1).await;

    b.shutdown().await;
    a.shutdown().await;
    eventually("goodbye to deregister A", || rendezvous.servers().is_empty()).await;
}

#[tokio::test]
async fn test_unreachable_rendezvous_fails_startup() {
    let harness = Harness::new();
    let vacant = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut config = harness.config(Role::Observer, None);
    config.discovery = Some(vacant.to_string());
    assert!(matches!(
        NodeRuntime::new(config).start().await,
        Err(NodeError::Rendezvous(_))
    ));
}
