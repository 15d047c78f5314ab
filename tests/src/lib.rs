//! # DCRL Test Suite
//!
//! End-to-end scenarios that start real nodes on loopback and talk to them
//! over TCP, either node-to-node or with a raw framed client.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # Harness, raw client, in-test rendezvous service
//!     ├── revocation.rs   # Authority → observer revocation, anchoring
//!     ├── membership.rs   # Announce, blockchain request
//!     ├── failures.rs     # Rejected blocks, malformed frames
//!     └── discovery.rs    # Rendezvous registration and goodbye
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dcrl-tests
//! cargo test -p dcrl-tests integration::failures::
//! ```

pub mod integration;
