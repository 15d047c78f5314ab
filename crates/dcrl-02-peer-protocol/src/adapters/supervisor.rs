//! # Connection Supervisor
//!
//! One task per connection. Reads frames in order, hands each message to the
//! dispatcher, writes any reply back on the same connection. The first
//! failure ends the loop; teardown removes this connection's own peer-table
//! entry and closes the socket.

use std::sync::Arc;

use shared_types::{DcrlMessage, NetworkIdentity};
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec;
use crate::dispatcher::Dispatcher;
use crate::domain::errors::ProtocolError;
use crate::domain::peer_table::{PeerConnection, PeerTable};

/// Why a supervisor stopped.
#[derive(Debug)]
pub enum Teardown {
    /// The peer closed the connection between frames.
    PeerClosed,
    /// The connection was closed locally (shutdown or replacement).
    Closed,
    /// A decode or I/O failure.
    Failed(ProtocolError),
}

pub struct ConnectionSupervisor<R> {
    peer: NetworkIdentity,
    connection: Arc<PeerConnection>,
    reader: R,
    dispatcher: Arc<Dispatcher>,
    peers: Arc<PeerTable>,
}

impl<R> ConnectionSupervisor<R>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    pub fn new(
        peer: NetworkIdentity,
        connection: Arc<PeerConnection>,
        reader: R,
        dispatcher: Arc<Dispatcher>,
        peers: Arc<PeerTable>,
    ) -> Self {
        Self {
            peer,
            connection,
            reader,
            dispatcher,
            peers,
        }
    }

    /// Run until the connection ends, then tear down.
    pub async fn run(mut self) -> Teardown {
        let reason = self.receive_loop().await;

        let removed = self.peers.remove_owned(&self.peer, self.connection.id());
        self.connection.close().await;

        match &reason {
            Teardown::PeerClosed => info!(peer = %self.peer, removed, "Peer disconnected"),
            Teardown::Closed => debug!(peer = %self.peer, removed, "Connection closed locally"),
            Teardown::Failed(e) => {
                warn!(peer = %self.peer, removed, class = ?e.class(), error = %e, "Connection torn down")
            }
        }
        reason
    }

    async fn receive_loop(&mut self) -> Teardown {
        loop {
            let next = tokio::select! {
                _ = self.connection.close_requested() => return Teardown::Closed,
                next = codec::read_message::<DcrlMessage, _>(&mut self.reader) => next,
            };
            let message = match next {
                Ok(Some(message)) => message,
                Ok(None) => return Teardown::PeerClosed,
                Err(e) => return Teardown::Failed(e),
            };
            if let Some(reply) = self.dispatcher.dispatch(&self.peer, message) {
                let sent = tokio::select! {
                    _ = self.connection.close_requested() => return Teardown::Closed,
                    sent = self.connection.send(&reply) => sent,
                };
                if let Err(e) = sent {
                    return Teardown::Failed(e);
                }
            }
        }
    }
}

/// Register `stream` under `peer` and spawn its supervisor.
pub fn attach(
    stream: TcpStream,
    peer: NetworkIdentity,
    dispatcher: Arc<Dispatcher>,
    peers: Arc<PeerTable>,
) -> JoinHandle<Teardown> {
    let (reader, writer) = stream.into_split();
    let connection = peers.insert(peer.clone(), Box::new(writer));
    debug!(%peer, connection = connection.id(), "Connection attached");
    let supervisor = ConnectionSupervisor::new(peer, connection, reader, dispatcher, peers);
    tokio::spawn(supervisor.run())
}
