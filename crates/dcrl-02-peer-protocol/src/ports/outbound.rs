//! # Outbound Ports (Driven Ports / SPI)
//!
//! Revocation history storage and consensus are not part of this crate. The
//! roles serve and receive blocks through [`BlockchainPolicy`]; what a node
//! does with a received block or chain is entirely up to the implementation.

use shared_types::{BlockMessage, NetworkIdentity};
use tracing::debug;

/// Source and sink of revocation history.
pub trait BlockchainPolicy: Send + Sync {
    /// The local chain, genesis first.
    fn chain(&self) -> Vec<BlockMessage>;

    /// Block at `height`, if known.
    fn block_at(&self, height: u64) -> Option<BlockMessage>;

    /// A verified block arrived from a participant.
    fn apply_block(&self, from: &NetworkIdentity, block: &BlockMessage);

    /// A verified chain arrived in reply to a request.
    fn apply_chain(&self, from: &NetworkIdentity, blocks: &[BlockMessage]);
}

/// Holds only the genesis block and ignores everything received.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBlockchainPolicy;

impl BlockchainPolicy for NoOpBlockchainPolicy {
    fn chain(&self) -> Vec<BlockMessage> {
        vec![BlockMessage::genesis()]
    }

    fn block_at(&self, height: u64) -> Option<BlockMessage> {
        (height == 0).then(BlockMessage::genesis)
    }

    fn apply_block(&self, from: &NetworkIdentity, block: &BlockMessage) {
        debug!(%from, height = block.height, "Ignoring received block");
    }

    fn apply_chain(&self, from: &NetworkIdentity, blocks: &[BlockMessage]) {
        debug!(%from, len = blocks.len(), "Ignoring received blockchain");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_serves_genesis_only() {
        let policy = NoOpBlockchainPolicy;
        assert_eq!(policy.chain(), vec![BlockMessage::genesis()]);
        assert_eq!(policy.block_at(0), Some(BlockMessage::genesis()));
        assert_eq!(policy.block_at(1), None);
    }
}
