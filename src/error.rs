use std::io;
use thiserror::Error;

use crate::image::CardVariant;
use crate::transport::KeyType;

/// Failure reported by the radio transport for a single sector operation.
///
/// The three causes are equally fatal to the stage that triggered the
/// operation, but stay distinguishable for diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("key {key_type} rejected for sector {sector}")]
    KeyRejected { sector: u8, key_type: KeyType },

    #[error("transport timeout")]
    Timeout,

    #[error("transport fault: {0}")]
    Fault(String),
}

/// The primary error type for the `volna-rs` library.
#[derive(Error, Debug)]
pub enum VolnaError {
    #[error("sector handshake failed: {0}")]
    Auth(#[from] AuthError),

    #[error("unsupported card variant: {0}")]
    UnsupportedVariant(CardVariant),

    #[error("stored key for sector {sector} does not match the deployment key")]
    UntrustedKey { sector: u8 },

    #[error("malformed field: {0}")]
    MalformedField(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("block {block} out of bounds for {total}-block image")]
    BlockOutOfBounds { block: usize, total: usize },

    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("invalid dump: {0}")]
    InvalidDump(String),
}
