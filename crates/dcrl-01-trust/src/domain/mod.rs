//! Domain layer: pure trust logic, no sockets.

pub mod errors;
pub mod gate;
pub mod identity;
pub mod ledger;
pub mod rejection;
pub mod trust_store;
pub mod verifier;

pub use errors::TrustError;
pub use identity::NodeIdentity;
pub use ledger::RevocationLedger;
pub use rejection::{CertificateRejection, Rejection};
pub use trust_store::TrustStore;
pub use verifier::{SelfSignedPolicy, TrustVerifier};
