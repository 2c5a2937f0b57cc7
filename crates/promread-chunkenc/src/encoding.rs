//! Chunk encodings and dispatch.

use promread_types::Sample;

use crate::{ChunkError, decode_xor};

/// Encoding of a chunk payload, as tagged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Float samples, delta-of-delta timestamps and XOR values.
    Xor,
    /// Native histogram samples.
    Histogram,
    /// Native float histogram samples.
    FloatHistogram,
}

impl Encoding {
    /// Returns the wire tag for this encoding.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Xor => 1,
            Self::Histogram => 2,
            Self::FloatHistogram => 3,
        }
    }

    /// Returns the encoding name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Xor => "XOR",
            Self::Histogram => "HISTOGRAM",
            Self::FloatHistogram => "FLOAT_HISTOGRAM",
        }
    }
}

impl TryFrom<i32> for Encoding {
    type Error = ChunkError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::Xor),
            2 => Ok(Self::Histogram),
            3 => Ok(Self::FloatHistogram),
            _ => Err(ChunkError::UnsupportedEncoding(tag)),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes a chunk payload into time-ordered samples.
///
/// Values are returned exactly as decoded; NaN and infinities pass through.
///
/// # Errors
///
/// Returns [`ChunkError::UnsupportedEncoding`] for histogram chunks and a
/// corruption error if the payload cannot be parsed.
///
/// # Example
///
/// ```
/// use promread_chunkenc::{Encoding, decode_chunk, encode_xor};
/// use promread_types::Sample;
///
/// let payload = encode_xor(&[Sample::new(1000, 1.0), Sample::new(2000, 2.0)]).unwrap();
/// let samples = decode_chunk(Encoding::Xor, &payload).unwrap();
/// assert_eq!(samples.len(), 2);
/// ```
pub fn decode_chunk(encoding: Encoding, payload: &[u8]) -> Result<Vec<Sample>, ChunkError> {
    match encoding {
        Encoding::Xor => decode_xor(payload),
        Encoding::Histogram | Encoding::FloatHistogram => {
            Err(ChunkError::UnsupportedEncoding(encoding.as_i32()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_xor;

    #[test]
    fn test_encoding_from_tag() {
        assert_eq!(Encoding::try_from(1).unwrap(), Encoding::Xor);
        assert_eq!(Encoding::try_from(2).unwrap(), Encoding::Histogram);
        assert_eq!(Encoding::try_from(3).unwrap(), Encoding::FloatHistogram);
        assert_eq!(
            Encoding::try_from(0),
            Err(ChunkError::UnsupportedEncoding(0))
        );
        assert_eq!(
            Encoding::try_from(42),
            Err(ChunkError::UnsupportedEncoding(42))
        );
    }

    #[test]
    fn test_decode_xor_dispatch() {
        let input = vec![
            Sample::new(1000, 1.0),
            Sample::new(2000, 2.0),
            Sample::new(3000, 3.5),
        ];
        let payload = encode_xor(&input).unwrap();
        assert_eq!(decode_chunk(Encoding::Xor, &payload).unwrap(), input);
    }

    #[test]
    fn test_histogram_unsupported() {
        let err = decode_chunk(Encoding::Histogram, &[0, 0]).unwrap_err();
        assert_eq!(err, ChunkError::UnsupportedEncoding(2));
        assert!(!err.is_corrupt());
    }

    #[test]
    fn test_corrupt_payload() {
        let err = decode_chunk(Encoding::Xor, &[0x00, 0x05, 0x01]).unwrap_err();
        assert!(err.is_corrupt());
    }
}
