//! # Peer Table
//!
//! Live map from peer identity to the write side of its connection.
//!
//! Each entry carries a connection id. Only the supervisor that owns a
//! connection removes it, and only while the entry still holds that id, so a
//! reconnect under the same identity is never removed by the old supervisor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared_types::{DcrlMessage, NetworkIdentity};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::codec;
use crate::domain::errors::ProtocolError;

pub type ConnectionId = u64;

/// How long `close` waits for an in-flight send to release the writer.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Write half of any connection.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// One open connection's outbound side.
pub struct PeerConnection {
    id: ConnectionId,
    writer: Mutex<BoxedWriter>,
    close_requested: Notify,
}

impl PeerConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Write one framed message. Concurrent senders are serialized.
    pub async fn send(&self, message: &DcrlMessage) -> Result<(), ProtocolError> {
        let mut writer = self.writer.lock().await;
        codec::write_message(&mut *writer, message).await
    }

    /// Shut the write side down and wake the owning supervisor.
    ///
    /// Closing an already closed connection is not an error. A send stuck on
    /// a peer that stopped reading holds the writer; after [`CLOSE_TIMEOUT`]
    /// the shutdown is skipped and the socket closes when the writer drops.
    pub async fn close(&self) {
        self.close_requested.notify_one();
        let Ok(mut writer) = tokio::time::timeout(CLOSE_TIMEOUT, self.writer.lock()).await else {
            warn!(connection = self.id, "Writer busy, skipping shutdown");
            return;
        };
        let shutdown = tokio::time::timeout(CLOSE_TIMEOUT, writer.shutdown()).await;
        match shutdown {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(connection = self.id, error = %e, "Shutdown on closed connection"),
            Err(_) => warn!(connection = self.id, "Shutdown timed out"),
        }
    }

    /// Resolves once `close` has been called.
    pub async fn close_requested(&self) {
        self.close_requested.notified().await;
    }
}

/// Concurrent identity → connection map.
#[derive(Default)]
pub struct PeerTable {
    next_id: AtomicU64,
    entries: RwLock<HashMap<NetworkIdentity, Arc<PeerConnection>>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. An existing entry for `peer` is replaced and
    /// asked to close.
    pub fn insert(&self, peer: NetworkIdentity, writer: BoxedWriter) -> Arc<PeerConnection> {
        let connection = Arc::new(PeerConnection {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            writer: Mutex::new(writer),
            close_requested: Notify::new(),
        });
        let replaced = self.entries.write().insert(peer, Arc::clone(&connection));
        if let Some(old) = replaced {
            old.close_requested.notify_one();
        }
        connection
    }

    /// Remove `peer` only if its entry is still connection `id`.
    pub fn remove_owned(&self, peer: &NetworkIdentity, id: ConnectionId) -> bool {
        let mut entries = self.entries.write();
        match entries.get(peer) {
            Some(connection) if connection.id == id => {
                entries.remove(peer);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, peer: &NetworkIdentity) -> Option<Arc<PeerConnection>> {
        self.entries.read().get(peer).cloned()
    }

    pub fn contains(&self, peer: &NetworkIdentity) -> bool {
        self.entries.read().contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Sorted identities of all open connections.
    pub fn identities(&self) -> Vec<NetworkIdentity> {
        let mut peers: Vec<_> = self.entries.read().keys().cloned().collect();
        peers.sort();
        peers
    }

    /// Send `message` to `peer`.
    pub async fn send_to(
        &self,
        peer: &NetworkIdentity,
        message: &DcrlMessage,
    ) -> Result<(), ProtocolError> {
        let connection = self
            .get(peer)
            .ok_or_else(|| ProtocolError::NotConnected(peer.clone()))?;
        connection.send(message).await
    }

    /// Ask every connection to close. Entries are removed by their supervisors.
    pub async fn close_all(&self) {
        let connections: Vec<_> = self.entries.read().values().cloned().collect();
        for connection in connections {
            connection.close().await;
        }
    }
}
