//! # Observer Role
//!
//! Read-only member of the network: answers revocation queries from its
//! ledger, accepts authority revocations, and can pull a chain from a peer.
//! Observers hold no identity, so everything they send is unsigned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dcrl_01_trust::{NodeIdentity, TrustApi};
use parking_lot::Mutex;
use shared_types::{
    Announce, BlockMessage, BlockRequest, BlockResponse, BlockchainRequest, BlockchainResponse,
    Certificate, CertificateHash, CertificateRevocation, CertificateUsage, DcrlMessage,
    NetworkIdentity, UnsignedPayload,
};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::domain::errors::ProtocolError;
use crate::domain::known_peers::KnownPeers;
use crate::domain::outcome::{CertificateStatus, Outcome};
use crate::domain::peer_table::PeerTable;
use crate::ports::{BlockchainPolicy, ProtocolHandler};

/// State every role shares, passed in at construction.
#[derive(Clone)]
pub struct RoleContext {
    pub trust: Arc<dyn TrustApi>,
    pub peers: Arc<PeerTable>,
    pub known: Arc<KnownPeers>,
    pub policy: Arc<dyn BlockchainPolicy>,
}

/// Observer settings.
#[derive(Debug, Clone)]
pub struct ObserverSettings {
    /// Peers asked first by `request_blockchain`, in order.
    pub preferred_peers: Vec<NetworkIdentity>,
    /// Bound on waiting for a BlockchainResponse.
    pub blockchain_timeout: Duration,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            preferred_peers: Vec::new(),
            blockchain_timeout: Duration::from_secs(10),
        }
    }
}

/// A pending `request_blockchain`, answered only by the peer it asked.
struct Waiter {
    id: u64,
    peer: NetworkIdentity,
    tx: oneshot::Sender<BlockchainResponse>,
}

pub struct ObserverHandler {
    context: RoleContext,
    settings: ObserverSettings,
    next_waiter: AtomicU64,
    waiters: Mutex<Vec<Waiter>>,
}

impl ObserverHandler {
    pub fn new(context: RoleContext, settings: ObserverSettings) -> Self {
        Self {
            context,
            settings,
            next_waiter: AtomicU64::new(0),
            waiters: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &RoleContext {
        &self.context
    }

    /// Ledger lookup for a hash given as hex or base64.
    ///
    /// Text that is not a hash cannot name a revoked certificate and reports
    /// NOT_REVOKED.
    pub fn check_certificate(&self, hash: &str) -> CertificateStatus {
        match CertificateHash::parse(hash) {
            Some(hash) => self.check_hash(&hash),
            None => {
                debug!(input = hash, "Certificate query is not a hash");
                CertificateStatus::NotRevoked
            }
        }
    }

    pub fn check_hash(&self, hash: &CertificateHash) -> CertificateStatus {
        if self.context.trust.is_revoked(hash) {
            CertificateStatus::Revoked
        } else {
            CertificateStatus::NotRevoked
        }
    }

    /// Ask a peer for its chain and wait for the next BlockchainResponse.
    ///
    /// The first connected preferred peer is asked, otherwise any connected peer.
    pub async fn request_blockchain(&self) -> Result<BlockchainResponse, ProtocolError> {
        let target = self.pick_blockchain_peer().ok_or(ProtocolError::NoPeers)?;
        let id = self.next_waiter.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().push(Waiter {
            id,
            peer: target.clone(),
            tx,
        });

        let result = self.await_blockchain(&target, rx).await;
        // No-op when the response already took the waiter.
        self.waiters.lock().retain(|waiter| waiter.id != id);
        result
    }

    async fn await_blockchain(
        &self,
        target: &NetworkIdentity,
        rx: oneshot::Receiver<BlockchainResponse>,
    ) -> Result<BlockchainResponse, ProtocolError> {
        let request = DcrlMessage::unsigned(UnsignedPayload::BlockchainRequest(BlockchainRequest));
        self.context.peers.send_to(target, &request).await?;
        info!(peer = %target, "Requested blockchain");

        match tokio::time::timeout(self.settings.blockchain_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(ProtocolError::Abandoned("blockchain request".into())),
            Err(_) => Err(ProtocolError::Timeout(self.settings.blockchain_timeout)),
        }
    }

    fn pick_blockchain_peer(&self) -> Option<NetworkIdentity> {
        let peers = &self.context.peers;
        self.settings
            .preferred_peers
            .iter()
            .find(|peer| peers.contains(peer))
            .cloned()
            .or_else(|| peers.identities().into_iter().next())
    }

    /// Hand `response` to the oldest live request sent to `from`.
    fn complete_waiter(&self, from: &NetworkIdentity, response: BlockchainResponse) {
        let mut waiters = self.waiters.lock();
        // Requests whose caller went away.
        waiters.retain(|waiter| !waiter.tx.is_closed());
        match waiters.iter().position(|waiter| &waiter.peer == from) {
            Some(index) => {
                // A receiver dropped since the retain is fine.
                let _ = waiters.remove(index).tx.send(response);
            }
            None => debug!(%from, "Blockchain response nobody asked this peer for"),
        }
    }

    fn unsupported(&self, from: &NetworkIdentity, what: &str) -> Outcome {
        debug!(%from, what, "Unsupported request for observer");
        Outcome::Reject(format!("{what} not supported by this node."))
    }
}

impl ProtocolHandler for ObserverHandler {
    fn identity(&self) -> Option<&NodeIdentity> {
        None
    }

    fn on_blockchain_request(&self, from: &NetworkIdentity) -> Outcome {
        self.unsupported(from, "BlockchainRequest")
    }

    fn on_block_request(&self, from: &NetworkIdentity, _request: BlockRequest) -> Outcome {
        self.unsupported(from, "BlockRequest")
    }

    fn on_revocation(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        revocation: CertificateRevocation,
    ) -> Outcome {
        if let Err(rejection) = self
            .context
            .trust
            .verify(signer, &[CertificateUsage::Authority])
        {
            warn!(%from, %rejection, "Revocation from non-authority");
            return Outcome::Reject(format!("Bad revocation: {rejection}"));
        }
        let subject = revocation.certificate.subject.clone();
        match self.context.trust.record_revocation(revocation.certificate) {
            Ok(true) => {
                info!(%from, authority = %signer.subject, %subject, "Certificate revoked");
                Outcome::NoReply
            }
            Ok(false) => {
                debug!(%from, %subject, "Revocation already known");
                Outcome::NoReply
            }
            Err(e) => Outcome::Reject(format!("Bad revocation: {e}")),
        }
    }

    fn on_block(&self, from: &NetworkIdentity, _signer: &Certificate, block: BlockMessage) -> Outcome {
        debug!(%from, height = block.height, "Observer ignores blocks");
        Outcome::NoReply
    }

    fn on_blockchain_response(
        &self,
        from: &NetworkIdentity,
        _signer: &Certificate,
        response: BlockchainResponse,
    ) -> Outcome {
        if response.blocks.is_empty() {
            return Outcome::Reject("Empty blockchain.".into());
        }
        info!(%from, len = response.blocks.len(), "Received blockchain");
        self.context.policy.apply_chain(from, &response.blocks);
        self.complete_waiter(from, response);
        Outcome::NoReply
    }

    fn on_block_response(
        &self,
        from: &NetworkIdentity,
        _signer: &Certificate,
        response: BlockResponse,
    ) -> Outcome {
        debug!(%from, height = response.block.height, "Received block response");
        Outcome::NoReply
    }

    fn on_announce(&self, from: &NetworkIdentity, _signer: &Certificate, _announce: Announce) -> Outcome {
        debug!(%from, "Observer ignores announce");
        Outcome::NoReply
    }
}
