//! Core error types.

use thiserror::Error;

/// Errors raised by the store and the record operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Data file could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Data file contents could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lot name was empty after trimming.
    #[error("lot name must not be empty")]
    EmptyName,

    /// Price input could not be parsed as a number.
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),

    /// Price parsed but was negative.
    #[error("price must not be negative: {0}")]
    NegativePrice(f64),

    /// No lot with the given code exists.
    #[error("lot {0} not found")]
    CodeNotFound(String),

    /// Generated code collided with an existing lot.
    ///
    /// The generator always produces a fresh code, so hitting this means the
    /// code table violated its uniqueness invariant, not that the user erred.
    #[error("lot code {0} already exists")]
    DuplicateCode(String),

    /// Another lot already carries this name.
    ///
    /// Soft failure: callers may confirm with the user and retry the
    /// operation with duplicate names allowed.
    #[error("a lot named {0:?} already exists")]
    DuplicateName(String),
}

impl Error {
    /// Whether the error only needs user confirmation rather than a fix.
    pub fn is_confirmable(&self) -> bool {
        matches!(self, Error::DuplicateName(_))
    }
}
