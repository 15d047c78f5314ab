//! Ports layer.

pub mod inbound;
pub mod outbound;

pub use inbound::ProtocolHandler;
pub use outbound::{BlockchainPolicy, NoOpBlockchainPolicy};
