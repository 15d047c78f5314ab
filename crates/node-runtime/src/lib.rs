//! # DCRL Node Runtime
//!
//! Wires the trust engine and the peer protocol into a running node: loads
//! configuration, talks to the rendezvous service, connects to peers, runs
//! the accept loop and exposes the certificate query interface.
//!
//! The `node-runtime` binary is a thin wrapper around [`NodeRuntime`].
//!
//! ```text
//! NodeConfig ──→ NodeRuntime::start ──→ RunningNode
//!                    │                     ├── check_certificate
//!                    │                     ├── revoke_certificate (authority)
//!                    │                     ├── request_blockchain
//!                    │                     └── shutdown
//!                    └── accept loop ──→ one supervisor per connection
//! ```

pub mod config;
pub mod role;
pub mod runtime;

pub use config::{ConfigError, NodeConfig, Role};
pub use role::NodeRole;
pub use runtime::{NodeError, NodeRuntime, RunningNode};
