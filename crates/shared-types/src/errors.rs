//! # Error Types
//!
//! Errors shared by every crate that touches the wire.

use thiserror::Error;

/// Failure while encoding or decoding a wire value.
#[derive(Debug, Error)]
pub enum WireError {
    /// Bytes did not decode to the expected type.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// Value could not be encoded (for instance over the size limit).
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Frame length header exceeds the configured maximum.
    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

/// Failure parsing a `host:port` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityParseError {
    /// No `:port` suffix.
    #[error("Missing port in '{0}'")]
    MissingPort(String),

    /// Port is not a valid u16.
    #[error("Invalid port in '{0}'")]
    InvalidPort(String),

    /// Host part is empty.
    #[error("Empty host in '{0}'")]
    EmptyHost(String),
}

/// Coarse classification of a failure observed on a connection.
///
/// Decides whether a connection survives the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// A frame did not decode.
    Decode,
    /// Certificate or signature did not verify.
    Auth,
    /// Payload kind not accepted by the local role.
    Policy,
    /// Transport failure.
    Io,
    /// Handler-level failure.
    Application,
}

impl FailureClass {
    /// Decode and I/O failures leave the byte stream in an unknown state.
    pub fn is_fatal_to_connection(self) -> bool {
        matches!(self, Self::Decode | Self::Io)
    }
}
