//! Chunk decoding errors.

use thiserror::Error;

/// Errors that can occur while decoding or encoding a chunk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// Payload is shorter than the chunk header.
    #[error("chunk too short: {0} bytes")]
    TooShort(usize),

    /// The payload could not be parsed.
    #[error("corrupt xor chunk: {0}")]
    Corrupt(String),

    /// Encoding is not a float XOR chunk.
    #[error("unsupported chunk encoding: {0}")]
    UnsupportedEncoding(i32),

    /// The samples cannot be written as one chunk.
    #[error("cannot encode xor chunk: {0}")]
    Encode(String),
}

impl ChunkError {
    /// Returns true if the payload itself is malformed.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::TooShort(_) | Self::Corrupt(_))
    }
}
