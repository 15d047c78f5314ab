//! # Rendezvous Client
//!
//! Short-lived connections to the discovery service, one per request.

use shared_types::{Goodbye, Hello, NetworkIdentity, RendezvousRequest, RendezvousResponse};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::codec;
use crate::domain::errors::ProtocolError;

#[derive(Debug, Clone)]
pub struct RendezvousClient {
    addr: NetworkIdentity,
}

impl RendezvousClient {
    pub fn new(addr: NetworkIdentity) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> &NetworkIdentity {
        &self.addr
    }

    /// Fetch the server list. With `Some(port)` the node also registers
    /// itself as listening on `port`.
    pub async fn hello(&self, port: Option<u16>) -> Result<Vec<NetworkIdentity>, ProtocolError> {
        let mut stream = TcpStream::connect(self.addr.as_connect_target()).await?;
        codec::write_message(&mut stream, &RendezvousRequest::Hello(Hello { port })).await?;
        let response: RendezvousResponse = codec::read_message(&mut stream)
            .await?
            .ok_or_else(|| ProtocolError::Abandoned(format!("rendezvous {} closed", self.addr)))?;

        let servers: Vec<NetworkIdentity> =
            response.servers.iter().map(NetworkIdentity::from).collect();
        info!(rendezvous = %self.addr, registered = port.is_some(), servers = servers.len(), "Rendezvous hello");
        Ok(servers)
    }

    /// Deregister the node listening on `port`.
    pub async fn goodbye(&self, port: u16) -> Result<(), ProtocolError> {
        let mut stream = TcpStream::connect(self.addr.as_connect_target()).await?;
        codec::write_message(&mut stream, &RendezvousRequest::Goodbye(Goodbye { port })).await?;
        stream.shutdown().await?;
        debug!(rendezvous = %self.addr, port, "Rendezvous goodbye");
        Ok(())
    }
}
