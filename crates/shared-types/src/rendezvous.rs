//! # Rendezvous Messages
//!
//! A rendezvous server keeps a list of discoverable nodes. A node sends
//! `Hello` once at startup (with its port when it wants to be listed) and
//! receives the current list; `Goodbye` removes it again.

use serde::{Deserialize, Serialize};

use crate::entities::NetworkIdentity;

/// Request sent to a rendezvous server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendezvousRequest {
    /// Register (optionally) and fetch the server list.
    Hello(Hello),
    /// Deregister.
    Goodbye(Goodbye),
}

/// Hello. `port` is `None` for nodes that should not be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub port: Option<u16>,
}

/// Goodbye for the node listening on `port` at the sender's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goodbye {
    pub port: u16,
}

/// One listed server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    pub ip_address: String,
    pub port_number: u16,
}

impl From<&ServerAddress> for NetworkIdentity {
    fn from(addr: &ServerAddress) -> Self {
        NetworkIdentity::new(addr.ip_address.clone(), addr.port_number)
    }
}

/// Reply to `Hello`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendezvousResponse {
    pub servers: Vec<ServerAddress>,
}
