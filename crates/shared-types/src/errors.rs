//! # Error Types
//!
//! Errors raised while decoding shared types from external input.

use thiserror::Error;

/// Errors from parsing addresses and codes supplied by configuration or callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded address has the wrong number of bytes.
    #[error("Invalid address length: expected {expected} bytes, got {actual}")]
    InvalidAddressLength { expected: usize, actual: usize },
}
