//! Error types for bitradix

use thiserror::Error;

/// Result type alias for bitradix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported to callers that break an operation's preconditions.
///
/// Broken tree invariants are not represented here: they panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid prefix length {bits}: must be between 1 and {width}")]
    InvalidPrefixLength { bits: u32, width: u32 },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid CIDR prefix: {0}")]
    InvalidCidr(String),

    #[error("prefix length {bits} exceeds maximum of {max}")]
    PrefixTooLong { bits: u32, max: u32 },
}
