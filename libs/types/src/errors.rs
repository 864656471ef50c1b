//! Error types for identifier parsing and pair key construction

use thiserror::Error;

/// Errors produced when ordering two identifiers into a pair key
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Both sides of the pair are the same identifier
    #[error("identical identifiers cannot form a pair")]
    IdenticalIdentifiers,
}

/// Errors produced when parsing a fixed-width identifier from hex text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Input contained characters outside `[0-9a-fA-F]`
    #[error("invalid hex in '{input}'")]
    InvalidHex { input: String },

    /// Decoded byte count did not match the identifier width
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
