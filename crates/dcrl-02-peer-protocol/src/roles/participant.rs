//! # Participant Role
//!
//! An observer with an identity. Announces itself to known peers, tracks
//! who announced to it, re-validates block senders, and serves its chain
//! with signed replies.

use dcrl_01_trust::{revocation_merkle_root, NodeIdentity};
use shared_types::{
    Announce, BlockMessage, BlockRequest, BlockResponse, BlockchainResponse, Certificate,
    CertificateRevocation, CertificateUsage, DcrlMessage, NetworkIdentity, SignedPayload,
};
use tracing::{debug, info, warn};

use crate::domain::outcome::Outcome;
use crate::ports::ProtocolHandler;

use super::observer::{ObserverHandler, RoleContext};

pub struct ParticipantHandler {
    observer: ObserverHandler,
    identity: NodeIdentity,
}

impl ParticipantHandler {
    /// Build the handler. Call [`announce_all`](Self::announce_all) once the
    /// startup connections are in the peer table.
    pub fn new(observer: ObserverHandler, identity: NodeIdentity) -> Self {
        Self { observer, identity }
    }

    pub fn observer(&self) -> &ObserverHandler {
        &self.observer
    }

    pub fn context(&self) -> &RoleContext {
        self.observer.context()
    }

    pub fn node_identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Send a freshly signed Announce with a random nonce to every known peer.
    /// Returns how many peers it reached.
    pub async fn announce_all(&self) -> usize {
        let message = match self.identity.seal(SignedPayload::Announce(Announce {
            nonce: rand::random(),
        })) {
            Ok(signed) => DcrlMessage::Signed(signed),
            Err(e) => {
                warn!(error = %e, "Could not sign announce");
                return 0;
            }
        };

        let mut reached = 0;
        for peer in self.context().known.snapshot() {
            match self.context().peers.send_to(&peer, &message).await {
                Ok(()) => reached += 1,
                Err(e) => warn!(%peer, error = %e, "Announce failed"),
            }
        }
        info!(reached, subject = %self.identity.subject(), "Announced to known peers");
        reached
    }

    fn signed_reply(&self, payload: SignedPayload) -> Outcome {
        match self.identity.seal(payload) {
            Ok(signed) => Outcome::Reply(DcrlMessage::Signed(signed)),
            Err(e) => Outcome::Reject(format!("Could not sign reply: {e}")),
        }
    }
}

impl ProtocolHandler for ParticipantHandler {
    fn identity(&self) -> Option<&NodeIdentity> {
        Some(&self.identity)
    }

    fn on_blockchain_request(&self, from: &NetworkIdentity) -> Outcome {
        let blocks = self.context().policy.chain();
        debug!(%from, len = blocks.len(), "Serving blockchain");
        self.signed_reply(SignedPayload::BlockchainResponse(BlockchainResponse {
            blocks,
        }))
    }

    fn on_block_request(&self, from: &NetworkIdentity, request: BlockRequest) -> Outcome {
        match self.context().policy.block_at(request.height) {
            Some(block) => {
                debug!(%from, height = request.height, "Serving block");
                self.signed_reply(SignedPayload::BlockResponse(BlockResponse { block }))
            }
            None => Outcome::Reject(format!("Unknown block height {}.", request.height)),
        }
    }

    fn on_revocation(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        revocation: CertificateRevocation,
    ) -> Outcome {
        self.observer.on_revocation(from, signer, revocation)
    }

    fn on_block(&self, from: &NetworkIdentity, signer: &Certificate, block: BlockMessage) -> Outcome {
        let trust = &self.context().trust;
        if let Err(rejection) = trust.verify(signer, &[CertificateUsage::Participation]) {
            warn!(%from, %rejection, "Rejected block sender");
            return Outcome::Reject(rejection.to_string());
        }
        if block.certificate != *signer {
            if let Err(rejection) =
                trust.verify(&block.certificate, &[CertificateUsage::Participation])
            {
                warn!(%from, %rejection, "Rejected block creator");
                return Outcome::Reject(format!("Bad block: {rejection}"));
            }
        }
        match revocation_merkle_root(&block.certificate_revocations) {
            Ok(root) if root == block.merkle_root => {}
            Ok(_) => {
                warn!(%from, height = block.height, "Block merkle root mismatch");
                return Outcome::Reject("Bad block: merkle root mismatch".into());
            }
            Err(e) => return Outcome::Reject(format!("Bad block: {e}")),
        }
        self.context().policy.apply_block(from, &block);
        self.observer.on_block(from, signer, block)
    }

    fn on_blockchain_response(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        response: BlockchainResponse,
    ) -> Outcome {
        self.observer.on_blockchain_response(from, signer, response)
    }

    fn on_block_response(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        response: BlockResponse,
    ) -> Outcome {
        self.observer.on_block_response(from, signer, response)
    }

    fn on_announce(&self, from: &NetworkIdentity, signer: &Certificate, announce: Announce) -> Outcome {
        if self.context().known.insert(from.clone()) {
            info!(%from, subject = %signer.subject, "New peer announced");
        } else {
            debug!(%from, nonce = announce.nonce, "Repeated announce");
        }
        Outcome::NoReply
    }
}
