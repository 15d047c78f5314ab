//! # Peer Protocol (DCRL-02)
//!
//! Everything between a TCP socket and the trust engine: framing, the peer
//! table, message dispatch, role handlers and connection supervisors.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): peer table, known-peer set, handler outcomes.
//! - **Ports Layer** (`ports/`): `ProtocolHandler` (driving) and
//!   `BlockchainPolicy` (driven).
//! - **Dispatcher** (`dispatcher.rs`): authenticates signed envelopes and
//!   routes payloads to the role handler.
//! - **Roles** (`roles/`): observer, participant, authority.
//! - **Adapters** (`adapters/`): connection supervisor, rendezvous client.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! connect / accept ──→ PeerTable::insert ──→ supervisor task
//!                                               │
//!          read frame ──→ dispatch ──→ reply ───┘ (loop)
//!                                               │
//!          EOF / decode / I/O error ──→ remove own entry ──→ close
//! ```

pub mod adapters;
pub mod codec;
pub mod dispatcher;
pub mod domain;
pub mod ports;
pub mod roles;

pub use adapters::{attach, RendezvousClient, Teardown};
pub use dispatcher::{error_message, Dispatcher};
pub use domain::{
    CertificateStatus, KnownPeers, Outcome, PeerConnection, PeerTable, ProtocolError,
    RevocationStatus,
};
pub use ports::{BlockchainPolicy, NoOpBlockchainPolicy, ProtocolHandler};
pub use roles::{AuthorityHandler, ObserverHandler, ObserverSettings, ParticipantHandler, RoleContext};
