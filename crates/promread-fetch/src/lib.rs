//! Streaming remote-read client for promread.
//!
//! This crate provides the remote-read pipeline:
//!
//! - [`url`] - Endpoint URL construction
//! - [`prompb`] - Remote-read protobuf messages
//! - [`encode_read_request`] - Query to compressed request body
//! - [`FrameReader`] - Incremental reader for length-delimited response frames
//! - [`BufferPool`] - Reusable scratch buffers for frame assembly
//! - [`RemoteReadClient`] - HTTP client with streaming reads, retries, and health checks

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/promread/promread/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod frame;
mod pool;
pub mod prompb;
mod request;
mod response;
pub mod url;

pub use client::{ClientConfig, RemoteReadClient};
pub use error::{BoxError, ReadError};
pub use frame::{DEFAULT_MAX_FRAME_SIZE, FrameError, FrameReader, encode_frame};
pub use pool::{BufferPool, PooledBuffer};
pub use request::{
    PROTOBUF_CONTENT_TYPE, READ_VERSION, READ_VERSION_HEADER, STREAMED_CONTENT_TYPE,
    decode_read_request, encode_read_request, read_request,
};
pub use response::{decode_chunked_series, encode_read_response};
