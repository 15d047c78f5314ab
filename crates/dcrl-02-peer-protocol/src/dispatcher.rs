//! # Protocol Dispatcher
//!
//! Routes one decoded `DcrlMessage` to the role handler and turns the
//! handler's [`Outcome`] into the reply for the same connection.
//!
//! Signed messages pass two gates before any handler runs: the sender
//! certificate must be trusted for PARTICIPATION, then the signature must
//! verify against it. A failed gate is answered with an ErrorMessage and the
//! connection stays open. Error messages themselves are logged, never answered.

use std::sync::Arc;

use dcrl_01_trust::TrustApi;
use shared_types::{
    CertificateUsage, DcrlMessage, ErrorMessage, NetworkIdentity, SignedMessage, SignedPayload,
    UnsignedPayload,
};
use tracing::{debug, warn};

use crate::domain::outcome::Outcome;
use crate::ports::ProtocolHandler;

/// Authentication plus payload routing, shared by every supervisor of a node.
pub struct Dispatcher {
    trust: Arc<dyn TrustApi>,
    handler: Arc<dyn ProtocolHandler>,
}

impl Dispatcher {
    pub fn new(trust: Arc<dyn TrustApi>, handler: Arc<dyn ProtocolHandler>) -> Self {
        Self { trust, handler }
    }

    /// Handle `message` from `from`. Returns the reply to write back, if any.
    pub fn dispatch(&self, from: &NetworkIdentity, message: DcrlMessage) -> Option<DcrlMessage> {
        debug!(%from, kind = message.kind(), "Dispatching message");
        let outcome = match message {
            DcrlMessage::Unsigned(unsigned) => self.route_unsigned(from, unsigned.payload),
            DcrlMessage::Signed(signed) => self.route_signed(from, signed),
        };
        self.finish(from, outcome)
    }

    fn route_unsigned(&self, from: &NetworkIdentity, payload: UnsignedPayload) -> Outcome {
        match payload {
            UnsignedPayload::BlockchainRequest(_) => self.handler.on_blockchain_request(from),
            UnsignedPayload::BlockRequest(request) => self.handler.on_block_request(from, request),
            UnsignedPayload::Error(error) => {
                warn!(%from, error = %error.error, "Peer reported error (unsigned)");
                Outcome::NoReply
            }
        }
    }

    fn route_signed(&self, from: &NetworkIdentity, message: SignedMessage) -> Outcome {
        if let Err(rejection) = self
            .trust
            .verify_signed(&message, &[CertificateUsage::Participation])
        {
            warn!(%from, kind = message.payload.kind(), %rejection, "Rejected signed message");
            return Outcome::Reject(rejection.to_string());
        }

        let signer = &message.certificate;
        match message.payload {
            SignedPayload::CertificateRevocation(revocation) => {
                self.handler.on_revocation(from, signer, revocation)
            }
            SignedPayload::Block(block) => self.handler.on_block(from, signer, block),
            SignedPayload::BlockchainResponse(response) => {
                self.handler.on_blockchain_response(from, signer, response)
            }
            SignedPayload::BlockResponse(response) => {
                self.handler.on_block_response(from, signer, response)
            }
            SignedPayload::Announce(announce) => self.handler.on_announce(from, signer, announce),
            SignedPayload::Error(error) => {
                warn!(%from, subject = %signer.subject, error = %error.error, "Peer reported error");
                Outcome::NoReply
            }
        }
    }

    fn finish(&self, from: &NetworkIdentity, outcome: Outcome) -> Option<DcrlMessage> {
        match outcome {
            Outcome::Reply(reply) => Some(reply),
            Outcome::NoReply => None,
            Outcome::Reject(reason) => {
                debug!(%from, %reason, "Replying with error");
                Some(error_message(self.handler.as_ref(), reason))
            }
        }
    }
}

/// ErrorMessage signed with the handler's identity, or unsigned without one.
pub fn error_message(handler: &dyn ProtocolHandler, reason: String) -> DcrlMessage {
    let Some(identity) = handler.identity() else {
        return DcrlMessage::unsigned_error(reason);
    };
    match identity.seal(SignedPayload::Error(ErrorMessage::new(reason.clone()))) {
        Ok(signed) => DcrlMessage::Signed(signed),
        Err(e) => {
            warn!(error = %e, "Could not sign error message, sending unsigned");
            DcrlMessage::unsigned_error(reason)
        }
    }
}
