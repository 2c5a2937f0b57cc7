//! Length-delimited response frames.
//!
//! A streamed response is a sequence of frames, each laid out as
//! `uvarint(len) | u32 big-endian CRC32-C of data | data`, where `data` is
//! a protobuf-encoded [`ChunkedReadResponse`].

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use prost::Message;
use thiserror::Error;

use crate::prompb::ChunkedReadResponse;
use crate::{BoxError, PooledBuffer};

/// Default upper bound on the size of a single frame (50 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 50_000_000;

/// Size of the checksum that follows the length prefix.
const CRC_SIZE: usize = 4;

/// Maximum encoded length of a 64-bit uvarint.
const MAX_VARINT_LEN: usize = 10;

/// Errors that can occur while reading frames.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Reading the response body failed.
    #[error("error reading response body: {0}")]
    Body(#[source] BoxError),

    /// The body ended inside a frame.
    #[error("unexpected end of stream inside a frame")]
    UnexpectedEof,

    /// The length prefix is not a valid uvarint.
    #[error("invalid frame length prefix")]
    InvalidLength,

    /// The frame exceeds the configured limit.
    #[error("frame size exceeded the limit of {limit} bytes; got {size} bytes")]
    TooLarge {
        /// Announced frame size.
        size: u64,
        /// Configured limit.
        limit: usize,
    },

    /// The frame checksum does not match its data.
    #[error("frame checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum from the frame header.
        expected: u32,
        /// Checksum of the received data.
        actual: u32,
    },

    /// The frame data is not a valid message.
    #[error("cannot decode frame: {0}")]
    Decode(#[from] prost::DecodeError),
}

enum Uvarint {
    Value(u64, usize),
    Incomplete,
    Overflow,
}

fn decode_uvarint(buf: &[u8]) -> Uvarint {
    let mut x = 0u64;
    let mut shift = 0u32;
    for (i, &b) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        if b < 0x80 {
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                return Uvarint::Overflow;
            }
            return Uvarint::Value(x | u64::from(b) << shift, i + 1);
        }
        x |= u64::from(b & 0x7f) << shift;
        shift += 7;
    }
    if buf.len() >= MAX_VARINT_LEN {
        Uvarint::Overflow
    } else {
        Uvarint::Incomplete
    }
}

/// Reads frames incrementally from a response body.
///
/// Only the bytes of the frame being decoded are held in memory. They are
/// assembled in a pooled scratch buffer that returns to its pool when the
/// reader is dropped.
#[derive(Debug)]
pub struct FrameReader<'p, S> {
    body: S,
    buf: PooledBuffer<'p>,
    pos: usize,
    max_frame_size: usize,
}

impl<'p, S, E> FrameReader<'p, S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<BoxError>,
{
    /// Creates a reader over `body`, rejecting frames larger than
    /// `max_frame_size`.
    pub fn new(body: S, max_frame_size: usize, mut scratch: PooledBuffer<'p>) -> Self {
        scratch.clear();
        Self {
            body,
            buf: scratch,
            pos: 0,
            max_frame_size,
        }
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the body ends cleanly between frames.
    ///
    /// # Errors
    ///
    /// Returns an error if the body fails, ends mid-frame, or the frame is
    /// oversized, corrupted, or not a valid message.
    pub async fn next_frame(&mut self) -> Result<Option<ChunkedReadResponse>, FrameError> {
        self.compact();

        let size = loop {
            match decode_uvarint(self.available()) {
                Uvarint::Value(size, n) => {
                    self.pos += n;
                    break size;
                }
                Uvarint::Overflow => return Err(FrameError::InvalidLength),
                Uvarint::Incomplete => {
                    let have = self.available().len();
                    if !self.fill(have + 1).await? {
                        return if have == 0 {
                            Ok(None)
                        } else {
                            Err(FrameError::UnexpectedEof)
                        };
                    }
                }
            }
        };

        let len = usize::try_from(size)
            .ok()
            .filter(|&len| len <= self.max_frame_size)
            .ok_or(FrameError::TooLarge {
                size,
                limit: self.max_frame_size,
            })?;

        if !self.fill(CRC_SIZE + len).await? {
            return Err(FrameError::UnexpectedEof);
        }

        let frame = &self.buf[self.pos..self.pos + CRC_SIZE + len];
        let expected = BigEndian::read_u32(&frame[..CRC_SIZE]);
        let data = &frame[CRC_SIZE..];
        let actual = crc32c::crc32c(data);
        if expected != actual {
            return Err(FrameError::ChecksumMismatch { expected, actual });
        }

        let message = ChunkedReadResponse::decode(data)?;
        self.pos += CRC_SIZE + len;
        tracing::trace!(
            size = len,
            series = message.chunked_series.len(),
            "read frame"
        );
        Ok(Some(message))
    }

    fn available(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Drops consumed bytes from the front of the buffer.
    fn compact(&mut self) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }

    /// Pulls body chunks until at least `n` unread bytes are buffered.
    ///
    /// Returns false if the body ends first.
    async fn fill(&mut self, n: usize) -> Result<bool, FrameError> {
        while self.buf.len() - self.pos < n {
            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(FrameError::Body(e.into())),
                None => return Ok(false),
            }
        }
        Ok(true)
    }
}

/// Encodes a message as one frame.
#[must_use]
pub fn encode_frame(message: &ChunkedReadResponse) -> Vec<u8> {
    let data = message.encode_to_vec();
    let mut out = Vec::with_capacity(MAX_VARINT_LEN + CRC_SIZE + data.len());
    prost::encoding::encode_varint(data.len() as u64, &mut out);
    let mut crc = [0u8; CRC_SIZE];
    BigEndian::write_u32(&mut crc, crc32c::crc32c(&data));
    out.extend_from_slice(&crc);
    out.extend_from_slice(&data);
    out
}
