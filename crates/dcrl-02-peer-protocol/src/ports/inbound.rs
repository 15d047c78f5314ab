//! # Inbound Ports (Driving Ports / API)
//!
//! The role-handler seam the dispatcher routes into. Signed payloads only
//! reach a handler after the sender certificate and message signature have
//! been verified, so `signer` is always authenticated.

use dcrl_01_trust::NodeIdentity;
use shared_types::{
    Announce, BlockMessage, BlockRequest, BlockResponse, BlockchainResponse, Certificate,
    CertificateRevocation, NetworkIdentity,
};

use crate::domain::outcome::Outcome;

/// Per-payload handling for one role.
///
/// Handlers run to completion on the connection's task; they must not block.
pub trait ProtocolHandler: Send + Sync {
    /// Identity used to sign replies and errors. `None` for observers.
    fn identity(&self) -> Option<&NodeIdentity>;

    /// Unsigned request for the whole chain.
    fn on_blockchain_request(&self, from: &NetworkIdentity) -> Outcome;

    /// Unsigned request for one block.
    fn on_block_request(&self, from: &NetworkIdentity, request: BlockRequest) -> Outcome;

    fn on_revocation(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        revocation: CertificateRevocation,
    ) -> Outcome;

    fn on_block(&self, from: &NetworkIdentity, signer: &Certificate, block: BlockMessage)
        -> Outcome;

    fn on_blockchain_response(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        response: BlockchainResponse,
    ) -> Outcome;

    fn on_block_response(
        &self,
        from: &NetworkIdentity,
        signer: &Certificate,
        response: BlockResponse,
    ) -> Outcome;

    fn on_announce(&self, from: &NetworkIdentity, signer: &Certificate, announce: Announce)
        -> Outcome;
}
