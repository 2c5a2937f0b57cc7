//! Prometheus chunk decoding for promread.
//!
//! Remote-read responses carry samples as opaque chunks. This crate turns a
//! chunk payload back into ordered samples:
//!
//! - [`decode_chunk`] - Decodes a payload of a given [`Encoding`]
//! - [`decode_xor`] - Decodes an XOR chunk
//! - [`encode_xor`] - Builds XOR chunks (fixtures, mock servers)

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/promread/promread/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod encoding;
mod error;
mod xor;

pub use encoding::{Encoding, decode_chunk};
pub use error::ChunkError;
pub use xor::{decode_xor, encode_xor};
