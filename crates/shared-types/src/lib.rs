//! # Shared Types Crate
//!
//! Certificates, network identities, protocol messages and the canonical
//! encoding every DCRL node agrees on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a socket is defined here.
//! - **Canonical Bytes**: hashing and signing use the same encoding as the wire
//!   (see [`wire`]), so a certificate has exactly one hash.
//! - **Closed Sets**: payloads are enums; an unknown tag is a decode failure.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod rendezvous;
pub mod wire;

pub use entities::*;
pub use envelope::*;
pub use errors::*;
pub use rendezvous::*;
