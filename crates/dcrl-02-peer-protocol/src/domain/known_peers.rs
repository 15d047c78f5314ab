//! Known participants and authorities.
//!
//! Identities here are peer-table keys: outbound peers dialled at startup and
//! the observed address of every inbound peer that announced itself.

use std::collections::HashSet;

use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use shared_types::NetworkIdentity;

#[derive(Debug, Default)]
pub struct KnownPeers {
    peers: RwLock<HashSet<NetworkIdentity>>,
}

impl KnownPeers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `peer`. Returns `true` when it was not known before.
    pub fn insert(&self, peer: NetworkIdentity) -> bool {
        self.peers.write().insert(peer)
    }

    pub fn contains(&self, peer: &NetworkIdentity) -> bool {
        self.peers.read().contains(peer)
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Sorted copy of the set.
    pub fn snapshot(&self) -> Vec<NetworkIdentity> {
        let mut peers: Vec<_> = self.peers.read().iter().cloned().collect();
        peers.sort();
        peers
    }

    /// A uniformly random member satisfying `filter`.
    pub fn choose_where(
        &self,
        filter: impl Fn(&NetworkIdentity) -> bool,
    ) -> Option<NetworkIdentity> {
        self.peers
            .read()
            .iter()
            .filter(|peer| filter(peer))
            .choose(&mut rand::thread_rng())
            .cloned()
    }
}
