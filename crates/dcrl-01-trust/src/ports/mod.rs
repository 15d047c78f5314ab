//! Ports layer.

pub mod inbound;
pub mod outbound;

pub use inbound::TrustApi;
pub use outbound::{SystemTimeSource, TimeSource};
