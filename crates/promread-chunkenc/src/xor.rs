//! XOR chunks, parsed and written by `rusty-chunkenc`.

use byteorder::{BigEndian, ByteOrder};
use promread_types::Sample;
use rusty_chunkenc::XORSample;
use rusty_chunkenc::xor::{XORChunk, read_xor_chunk_data};

use crate::ChunkError;

/// Size of the big-endian sample-count header.
const HEADER_SIZE: usize = 2;

fn parse_error(err: nom::Err<nom::error::Error<&[u8]>>) -> ChunkError {
    match err {
        nom::Err::Incomplete(_) => ChunkError::Corrupt("unexpected end of chunk data".to_string()),
        nom::Err::Error(e) | nom::Err::Failure(e) => ChunkError::Corrupt(format!(
            "{:?} with {} bytes left",
            e.code,
            e.input.len()
        )),
    }
}

/// Decodes every sample of an XOR chunk payload.
///
/// # Errors
///
/// Returns an error if the payload is malformed or truncated. No partial
/// result is returned.
pub fn decode_xor(payload: &[u8]) -> Result<Vec<Sample>, ChunkError> {
    if payload.len() < HEADER_SIZE {
        return Err(ChunkError::TooShort(payload.len()));
    }
    // The parser always expects a first sample after the header.
    if BigEndian::read_u16(payload) == 0 {
        return Ok(Vec::new());
    }

    let (_, chunk) = read_xor_chunk_data(payload).map_err(parse_error)?;
    Ok(chunk
        .samples()
        .iter()
        .map(|s| Sample::new(s.timestamp, s.value))
        .collect())
}

/// Encodes samples as an XOR chunk payload.
///
/// # Errors
///
/// Returns an error if timestamps decrease or there are more than
/// `u16::MAX` samples.
pub fn encode_xor(samples: &[Sample]) -> Result<Vec<u8>, ChunkError> {
    if samples.is_empty() {
        return Ok(vec![0; HEADER_SIZE]);
    }
    let chunk = XORChunk::new(
        samples
            .iter()
            .map(|s| XORSample {
                timestamp: s.timestamp,
                value: s.value,
            })
            .collect(),
    );
    let mut out = Vec::new();
    chunk
        .write(&mut out)
        .map_err(|e| ChunkError::Encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two samples as written by Prometheus' own encoder.
    const PROMETHEUS_CHUNK: [u8; 18] = [
        0x00, 0x02, 0x80, 0xF4, 0xEE, 0x06, 0x40, 0xC7, 0x70, 0x00, 0x00, 0x00, 0x00, 0x00, 0xE8,
        0x07, 0xF0, 0x0C,
    ];

    #[test]
    fn test_decode_prometheus_chunk() {
        assert_eq!(
            decode_xor(&PROMETHEUS_CHUNK).unwrap(),
            vec![Sample::new(7_200_000, 12000.0), Sample::new(7_201_000, 12001.0)]
        );
    }

    #[test]
    fn test_encode_matches_prometheus() {
        let encoded =
            encode_xor(&[Sample::new(7_200_000, 12000.0), Sample::new(7_201_000, 12001.0)]).unwrap();
        assert_eq!(encoded, PROMETHEUS_CHUNK);
    }

    #[test]
    fn test_irregular_intervals() {
        let samples = vec![
            Sample::new(1000, 1.0),
            Sample::new(2000, 1.0),
            Sample::new(3000, 2.5),
            Sample::new(3001, -7.25),
            Sample::new(303_003, 0.0),
            Sample::new(1_000_000_000, 1e300),
        ];
        assert_eq!(decode_xor(&encode_xor(&samples).unwrap()).unwrap(), samples);
    }

    #[test]
    fn test_special_values_pass_through() {
        let stale = f64::from_bits(0x7ff0_0000_0000_0002);
        let samples = [
            Sample::new(1, f64::NAN),
            Sample::new(2, stale),
            Sample::new(3, f64::INFINITY),
            Sample::new(4, f64::NEG_INFINITY),
            Sample::new(5, -0.0),
        ];
        let decoded = decode_xor(&encode_xor(&samples).unwrap()).unwrap();
        let bits: Vec<u64> = decoded.iter().map(|s| s.value.to_bits()).collect();
        let expected: Vec<u64> = samples.iter().map(|s| s.value.to_bits()).collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_empty_chunk() {
        let encoded = encode_xor(&[]).unwrap();
        assert_eq!(encoded, [0x00, 0x00]);
        assert!(decode_xor(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(decode_xor(&[0x01]), Err(ChunkError::TooShort(1)));
        assert_eq!(decode_xor(&[]), Err(ChunkError::TooShort(0)));
    }

    #[test]
    fn test_truncated_payload() {
        let samples = [
            Sample::new(1000, 1.0),
            Sample::new(2000, 2.0),
            Sample::new(3000, 3.0),
        ];
        let encoded = encode_xor(&samples).unwrap();
        let err = decode_xor(&encoded[..6]).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_count_without_samples() {
        let err = decode_xor(&[0x00, 0x03, 0x80]).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_decreasing_timestamps_rejected() {
        let err = encode_xor(&[Sample::new(10, 1.0), Sample::new(5, 1.0)]).unwrap_err();
        assert!(matches!(err, ChunkError::Encode(_)));
        assert!(!err.is_corrupt());
    }
}
