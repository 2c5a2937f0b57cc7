//! Errors returned by the remote-read client.

use promread_chunkenc::ChunkError;
use promread_types::QueryError;
use thiserror::Error;

use crate::FrameError;

/// Error type a stream callback may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while reading from a remote source.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Client configuration is unusable.
    #[error("invalid config: {0}")]
    Config(String),

    /// The query could not be built.
    #[error("error preparing stream query: {0}")]
    Query(#[from] QueryError),

    /// HTTP client construction or health-check request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The read request could not be sent.
    #[error("error while sending request to {url}: {source}; data len {len}")]
    Transport {
        /// Redacted request URL.
        url: String,
        /// Compressed request size in bytes.
        len: usize,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// The server answered with a status other than 200 or 204.
    #[error("unexpected response code {status} for {url}. Response body {body:?}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Redacted request URL.
        url: String,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A response frame could not be read.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// A chunk payload could not be decoded.
    #[error("error reading chunk: {0}")]
    Chunk(#[from] ChunkError),

    /// Snappy compression or decompression failed.
    #[error("snappy error: {0}")]
    Snappy(#[from] snap::Error),

    /// A sampled response could not be decoded.
    #[error("cannot decode read response: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The stream callback returned an error.
    #[error("stream callback failed: {0}")]
    Callback(#[source] BoxError),

    /// The attempt was canceled.
    #[error("request canceled")]
    Canceled,

    /// The read was canceled; no further attempts are made.
    #[error("process stopped")]
    Stopped,

    /// Every attempt failed.
    #[error("failed to fetch data after {attempts} attempts: {source}")]
    AttemptsExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error of the last attempt.
        source: Box<ReadError>,
    },

    /// The health endpoint did not answer 200.
    #[error("bad status code: {status}")]
    Unhealthy {
        /// HTTP status code.
        status: u16,
    },
}

impl ReadError {
    /// Returns true if a fresh attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::UnexpectedStatus { .. }
                | Self::Frame(_)
                | Self::Chunk(_)
                | Self::Snappy(_)
                | Self::Decode(_)
                | Self::Callback(_)
        )
    }

    /// Returns the error of the last attempt if every attempt failed.
    #[must_use]
    pub fn last_attempt_error(&self) -> Option<&Self> {
        match self {
            Self::AttemptsExhausted { source, .. } => Some(source),
            _ => None,
        }
    }
}
