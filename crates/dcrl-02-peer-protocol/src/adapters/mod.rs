//! Adapters layer: sockets.

pub mod rendezvous;
pub mod supervisor;

pub use rendezvous::RendezvousClient;
pub use supervisor::{attach, ConnectionSupervisor, Teardown};
