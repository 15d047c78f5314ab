//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the trust engine needs from its environment.

/// Abstract time source for testability.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the unix epoch.
    fn now(&self) -> u64;
}

/// System time implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
