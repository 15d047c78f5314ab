//! # Certificate Trust Engine (DCRL-01)
//!
//! Decides which certificates a node believes, and remembers which ones have
//! been revoked.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): crypto gate, trust store, revocation
//!   ledger, verifier, node identity. No sockets.
//! - **Ports Layer** (`ports/`): `TrustApi` (driving) and `TimeSource` (driven).
//! - **Service Layer** (`service.rs`): `TrustService`, the verifier plus a clock.
//!
//! ## Trust Model
//!
//! A certificate is trusted when it is inside its validity window, grants the
//! required usages, is not revoked, names a subject, and is signed either by
//! itself or by a certificate present in the trust store. There is no chain
//! walking beyond that single hop.

pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (FixedTimeSource, TestPrincipal).
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::gate::{
    hash_certificate, payload_bytes, revocation_merkle_root, seal, sign_certificate,
    signable_digest, verify_certificate_signature, verify_message_signature,
};
pub use domain::{
    CertificateRejection, NodeIdentity, Rejection, RevocationLedger, SelfSignedPolicy, TrustError,
    TrustStore, TrustVerifier,
};
pub use ports::{SystemTimeSource, TimeSource, TrustApi};
pub use service::TrustService;
