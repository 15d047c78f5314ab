//! # Authority Role
//!
//! A participant that may originate revocations. A new revocation goes to
//! one randomly chosen known peer; spreading it further is left to that peer.

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use dcrl_01_trust::NodeIdentity;
use shared_types::{
    wire, Announce, BlockMessage, BlockRequest, BlockResponse, BlockchainResponse, Certificate,
    CertificateRevocation, DcrlMessage, NetworkIdentity, SignedPayload,
};
use tracing::{info, warn};

use crate::domain::errors::ProtocolError;
use crate::domain::outcome::{Outcome, RevocationStatus};
use crate::ports::ProtocolHandler;

use super::observer::RoleContext;
use super::participant::ParticipantHandler;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&base64::alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&base64::alphabet::URL_SAFE, LENIENT);

pub struct AuthorityHandler {
    participant: ParticipantHandler,
}

impl AuthorityHandler {
    pub fn new(participant: ParticipantHandler) -> Self {
        Self { participant }
    }

    pub fn participant(&self) -> &ParticipantHandler {
        &self.participant
    }

    pub fn context(&self) -> &RoleContext {
        self.participant.context()
    }

    /// Revoke a certificate given as base64 text of its encoding.
    pub async fn revoke_encoded(&self, encoded: &str) -> RevocationStatus {
        match decode_certificate_text(encoded) {
            Some(cert) => self.revoke(cert).await,
            None => {
                warn!("Revocation input is not an encoded certificate");
                RevocationStatus::Rejected
            }
        }
    }

    /// Revoke a certificate given as its raw encoding.
    pub async fn revoke_bytes(&self, bytes: &[u8]) -> RevocationStatus {
        match wire::decode::<Certificate>(bytes) {
            Ok(cert) => self.revoke(cert).await,
            Err(e) => {
                warn!(error = %e, "Revocation input does not decode");
                RevocationStatus::Rejected
            }
        }
    }

    /// Sign a revocation for `cert` and send it to one random known peer.
    ///
    /// On success the certificate is also recorded in the local ledger.
    pub async fn revoke(&self, cert: Certificate) -> RevocationStatus {
        let subject = cert.subject.clone();
        match self.try_revoke(cert).await {
            Ok(peer) => {
                info!(%subject, %peer, "Revocation started");
                RevocationStatus::Started
            }
            Err(e) => {
                warn!(%subject, error = %e, "Revocation rejected");
                RevocationStatus::Rejected
            }
        }
    }

    async fn try_revoke(&self, cert: Certificate) -> Result<NetworkIdentity, ProtocolError> {
        let ctx = self.context();
        let message = self
            .participant
            .node_identity()
            .seal(SignedPayload::CertificateRevocation(CertificateRevocation {
                certificate: cert.clone(),
            }))?;
        let peer = ctx
            .known
            .choose_where(|peer| ctx.peers.contains(peer))
            .ok_or(ProtocolError::NoPeers)?;
        ctx.peers
            .send_to(&peer, &DcrlMessage::Signed(message))
            .await?;
        ctx.trust.record_revocation(cert)?;
        Ok(peer)
    }
}

/// Base64 in either alphabet, padded or not.
fn decode_certificate_text(text: &str) -> Option<Certificate> {
    let text = text.trim();
    [&STANDARD_LENIENT, &URL_SAFE_LENIENT]
        .iter()
        .find_map(|engine| engine.decode(text).ok())
        .and_then(|bytes| wire::decode(&bytes).ok())
}

impl ProtocolHandler for AuthorityHandler {
    fn identity(&self) -> Option<&NodeIdentity> {
        self.participant.identity()
    }

    fn on_blockchain_request(&self, from: &NetworkIdentity) -> Outcome {
        self.participant.on_blockchain_request(from)
    }

    fn on_block_request(&self, from: &NetworkIdentity, request: BlockRequest) -> Outcome {
        self.participant.on_block_request(from, request)
    }

    fn on_revocation(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        revocation: CertificateRevocation,
    ) -> Outcome {
        self.participant.on_revocation(from, signer, revocation)
    }

    fn on_block(&self, from: &NetworkIdentity, signer: &Certificate, block: BlockMessage) -> Outcome {
        self.participant.on_block(from, signer, block)
    }

    fn on_blockchain_response(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        response: BlockchainResponse,
    ) -> Outcome {
        self.participant.on_blockchain_response(from, signer, response)
    }

    fn on_block_response(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        response: BlockResponse,
    ) -> Outcome {
        self.participant.on_block_response(from, signer, response)
    }

    fn on_announce(&self, from: &NetworkIdentity, signer: &Certificate, announce: Announce) -> Outcome {
        self.participant.on_announce(from, signer, announce)
    }
}
