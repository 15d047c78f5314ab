//! Domain layer: connection bookkeeping and handler results.

pub mod errors;
pub mod known_peers;
pub mod outcome;
pub mod peer_table;

pub use errors::ProtocolError;
pub use known_peers::KnownPeers;
pub use outcome::{CertificateStatus, Outcome, RevocationStatus};
pub use peer_table::{BoxedWriter, ConnectionId, PeerConnection, PeerTable};
