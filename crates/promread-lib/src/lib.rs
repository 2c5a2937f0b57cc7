//! Streaming Prometheus remote-read client.
//!
//! This is a facade crate that re-exports functionality from the promread
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use promread_lib::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RemoteReadClient::with_addr("http://localhost:9090")?;
//!     let filter = Filter::new(1_700_000_000_000, 1_700_003_600_000);
//!
//!     client
//!         .read(&CancellationToken::new(), &filter, |series| {
//!             println!("{series}: {} samples", series.len());
//!             Ok(())
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/promread/promread/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use promread_types::*;

// Re-export the chunk decoder
pub use promread_chunkenc::{ChunkError, Encoding, decode_chunk, decode_xor};

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use promread_fetch::{
    BoxError, ClientConfig, DEFAULT_MAX_FRAME_SIZE, FrameError, ReadError, RemoteReadClient,
};

/// Prelude module for convenient imports.
///
/// ```
/// use promread_lib::prelude::*;
/// ```
pub mod prelude {
    pub use promread_types::{Filter, Label, Query, QueryError, Sample, TimeSeries};

    pub use promread_chunkenc::ChunkError;

    #[cfg(feature = "fetch")]
    pub use promread_fetch::{BoxError, ClientConfig, ReadError, RemoteReadClient};
}
