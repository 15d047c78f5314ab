//! # Node Runtime
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration, bind the listener
//! 2. Load the trust store and (for participants and authorities) the identity
//! 3. Rendezvous hello, merged with the static peer list
//! 4. Connect to every peer; unreachable peers are skipped
//! 5. Build the role and dispatcher; seed known peers with the connected ones
//! 6. Attach a supervisor to each outbound connection
//! 7. Announce (participants and authorities)
//! 8. Spawn the accept loop
//!
//! ## Shutdown
//!
//! Stop accepting, close every connection, say goodbye to the rendezvous
//! service when registered. Cleanup failures are logged and swallowed.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use dcrl_01_trust::{
    NodeIdentity, RevocationLedger, SystemTimeSource, TrustApi, TrustError, TrustService,
    TrustStore,
};
use dcrl_02_peer_protocol::{
    attach, CertificateStatus, Dispatcher, KnownPeers, NoOpBlockchainPolicy, ObserverSettings,
    PeerTable, ProtocolError, RendezvousClient, RevocationStatus, RoleContext,
};
use shared_types::{BlockchainResponse, NetworkIdentity};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, NodeConfig, Role};
use crate::role::NodeRole;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Startup errors.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Trust engine error: {0}")]
    Trust(#[from] TrustError),

    #[error("Rendezvous failed: {0}")]
    Rendezvous(#[source] ProtocolError),
}

/// Builds and starts a node.
pub struct NodeRuntime {
    config: NodeConfig,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub async fn start(self) -> Result<RunningNode, NodeError> {
        let config = self.config;
        config.validate()?;

        let listen = config.listen_socket()?;
        let listener = TcpListener::bind(listen)
            .await
            .map_err(|source| NodeError::Bind {
                addr: listen,
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, role = %config.role, "Listening");

        let store = Arc::new(TrustStore::load_dir(&config.trust_store)?);
        info!(path = %config.trust_store.display(), certificates = store.len(), "Trust store loaded");
        let identity = config
            .identity
            .as_deref()
            .map(NodeIdentity::load)
            .transpose()?;
        if let Some(identity) = &identity {
            info!(subject = identity.subject(), "Identity loaded");
        }

        let trust: Arc<dyn TrustApi> = Arc::new(TrustService::new(
            store,
            Arc::new(RevocationLedger::new()),
            config.self_signed_policy(),
            Arc::new(SystemTimeSource),
        ));

        let rendezvous = config.discovery_identity()?.map(RendezvousClient::new);
        let registered_port = config.become_discoverable.then_some(local_addr.port());
        let mut targets = Vec::new();
        if let Some(client) = &rendezvous {
            let servers = client
                .hello(registered_port)
                .await
                .map_err(NodeError::Rendezvous)?;
            targets.extend(servers.into_iter().filter(|s| !is_self(s, local_addr)));
        }
        for peer in config.peer_identities()? {
            if !targets.contains(&peer) {
                targets.push(peer);
            }
        }

        let mut outbound = Vec::new();
        for target in targets {
            match TcpStream::connect(target.as_connect_target()).await {
                Ok(stream) => {
                    info!(peer = %target, "Connected");
                    outbound.push((target, stream));
                }
                Err(e) => warn!(peer = %target, error = %e, "Could not connect to peer"),
            }
        }

        let peers = Arc::new(PeerTable::new());
        let known = Arc::new(KnownPeers::new());
        let context = RoleContext {
            trust: Arc::clone(&trust),
            peers: Arc::clone(&peers),
            known: Arc::clone(&known),
            policy: Arc::new(NoOpBlockchainPolicy),
        };
        let settings = ObserverSettings {
            preferred_peers: config.preferred_identities()?,
            blockchain_timeout: config.blockchain_timeout(),
        };
        let role = NodeRole::build(config.role, context, settings, identity)?;
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&trust), role.handler()));

        for (peer, stream) in outbound {
            known.insert(peer.clone());
            attach(stream, peer, Arc::clone(&dispatcher), Arc::clone(&peers));
        }

        if let Some(participant) = role.participant() {
            participant.announce_all().await;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&dispatcher),
            Arc::clone(&peers),
            shutdown_rx,
        ));

        info!(
            %local_addr,
            role = %config.role,
            peers = peers.len(),
            registered = registered_port.is_some(),
            "Node started"
        );

        Ok(RunningNode {
            local_addr,
            role,
            trust,
            peers,
            known,
            rendezvous,
            registered_port,
            shutdown_tx,
            accept_task,
        })
    }
}

/// A rendezvous entry naming this node's own listener.
fn is_self(entry: &NetworkIdentity, local_addr: SocketAddr) -> bool {
    if entry.port != local_addr.port() {
        return false;
    }
    match entry.host.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback() || ip.is_unspecified() || ip == local_addr.ip(),
        Err(_) => entry.host == "localhost",
    }
}

async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    peers: Arc<PeerTable>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("Accept loop stopping");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, remote)) => {
                    let peer = NetworkIdentity::from(remote);
                    info!(%peer, "Accepted connection");
                    attach(stream, peer, Arc::clone(&dispatcher), Arc::clone(&peers));
                }
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

/// Handle to a started node: the certificate query interface plus shutdown.
pub struct RunningNode {
    local_addr: SocketAddr,
    role: NodeRole,
    trust: Arc<dyn TrustApi>,
    peers: Arc<PeerTable>,
    known: Arc<KnownPeers>,
    rendezvous: Option<RendezvousClient>,
    registered_port: Option<u16>,
    shutdown_tx: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl RunningNode {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn role(&self) -> Role {
        self.role.role()
    }

    pub fn identity(&self) -> Option<&NodeIdentity> {
        self.role.identity()
    }

    /// NOT_REVOKED or REVOKED for a certificate hash in hex or base64.
    pub fn check_certificate(&self, hash: &str) -> CertificateStatus {
        self.role.observer().check_certificate(hash)
    }

    /// Start revoking a base64-encoded certificate. Only authorities can.
    pub async fn revoke_certificate(&self, encoded: &str) -> RevocationStatus {
        match self.role.authority() {
            Some(authority) => authority.revoke_encoded(encoded).await,
            None => {
                warn!(role = %self.role(), "Revocation requested from a non-authority node");
                RevocationStatus::Rejected
            }
        }
    }

    pub async fn request_blockchain(&self) -> Result<BlockchainResponse, ProtocolError> {
        self.role.observer().request_blockchain().await
    }

    /// Announce again to every known peer. Observers never announce.
    pub async fn announce(&self) -> usize {
        match self.role.participant() {
            Some(participant) => participant.announce_all().await,
            None => 0,
        }
    }

    /// Currently connected peers.
    pub fn peers(&self) -> Vec<NetworkIdentity> {
        self.peers.identities()
    }

    /// Known participants and authorities.
    pub fn known_peers(&self) -> Vec<NetworkIdentity> {
        self.known.snapshot()
    }

    pub fn revoked_count(&self) -> usize {
        self.trust.revoked_count()
    }

    pub async fn shutdown(self) {
        info!(local_addr = %self.local_addr, "Shutting down");
        // Err only when the accept loop already ended.
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.accept_task.await {
            warn!(error = %e, "Accept loop ended abnormally");
        }

        self.peers.close_all().await;

        if let (Some(client), Some(port)) = (&self.rendezvous, self.registered_port) {
            if let Err(e) = client.goodbye(port).await {
                warn!(rendezvous = %client.addr(), error = %e, "Goodbye failed");
            }
        }
        info!("Shutdown complete");
    }
}
