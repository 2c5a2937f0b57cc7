//! Response decoding.

use prost::Message;
use promread_chunkenc::{ChunkError, Encoding, decode_chunk};
use promread_types::TimeSeries;

use crate::ReadError;
use crate::prompb;

/// Decodes one streamed series entry into labels and samples.
///
/// Chunks are decoded in wire order and their samples concatenated without
/// re-sorting.
///
/// # Errors
///
/// Returns an error if any chunk has an unsupported encoding or a corrupt
/// payload. No partial series is returned.
pub fn decode_chunked_series(series: prompb::ChunkedSeries) -> Result<TimeSeries, ChunkError> {
    let mut decoded = TimeSeries::new(series.labels.into_iter().map(Into::into).collect());
    for chunk in &series.chunks {
        let encoding = Encoding::try_from(chunk.r#type)?;
        decoded
            .samples
            .extend(decode_chunk(encoding, &chunk.data)?);
    }
    Ok(decoded)
}

/// Decompresses and decodes a sampled (non-streamed) response body.
pub(crate) fn decode_read_response(body: &[u8]) -> Result<prompb::ReadResponse, ReadError> {
    let data = snap::raw::Decoder::new().decompress_vec(body)?;
    Ok(prompb::ReadResponse::decode(data.as_slice())?)
}

/// Encodes and snappy-compresses a sampled response.
///
/// # Errors
///
/// Returns an error if compression fails.
pub fn encode_read_response(response: &prompb::ReadResponse) -> Result<Vec<u8>, ReadError> {
    Ok(snap::raw::Encoder::new().compress_vec(&response.encode_to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompb::{Chunk, ChunkedSeries, Label, QueryResult, ReadResponse, chunk};
    use promread_chunkenc::encode_xor;
    use promread_types::Sample;

    fn xor_chunk(samples: &[Sample]) -> Chunk {
        Chunk {
            min_time_ms: samples.first().map_or(0, |s| s.timestamp),
            max_time_ms: samples.last().map_or(0, |s| s.timestamp),
            r#type: chunk::Encoding::Xor as i32,
            data: encode_xor(samples).unwrap(),
        }
    }

    fn label(name: &str, value: &str) -> Label {
        Label {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_chunks_concatenated_in_wire_order() {
        let first = [Sample::new(1000, 1.0), Sample::new(2000, 2.0)];
        let second = [Sample::new(3000, 3.5)];
        let series = ChunkedSeries {
            labels: vec![label("__name__", "up"), label("job", "node")],
            chunks: vec![xor_chunk(&first), xor_chunk(&second)],
        };

        let decoded = decode_chunked_series(series).unwrap();
        assert_eq!(decoded.metric_name(), Some("up"));
        assert_eq!(decoded.labels.len(), 2);
        assert_eq!(
            decoded.samples,
            vec![
                Sample::new(1000, 1.0),
                Sample::new(2000, 2.0),
                Sample::new(3000, 3.5)
            ]
        );
    }

    #[test]
    fn test_chunks_not_resorted() {
        let late = [Sample::new(5000, 5.0)];
        let early = [Sample::new(1000, 1.0)];
        let series = ChunkedSeries {
            labels: vec![label("__name__", "up")],
            chunks: vec![xor_chunk(&late), xor_chunk(&early)],
        };
        let decoded = decode_chunked_series(series).unwrap();
        assert_eq!(decoded.samples[0].timestamp, 5000);
        assert_eq!(decoded.samples[1].timestamp, 1000);
    }

    #[test]
    fn test_corrupt_chunk_fails_whole_series() {
        let mut bad = xor_chunk(&[Sample::new(1000, 1.0), Sample::new(2000, 2.0)]);
        bad.data.truncate(5);
        let series = ChunkedSeries {
            labels: vec![label("__name__", "up")],
            chunks: vec![xor_chunk(&[Sample::new(0, 0.0)]), bad],
        };
        let err = decode_chunked_series(series).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_histogram_chunk_rejected() {
        let series = ChunkedSeries {
            labels: vec![],
            chunks: vec![Chunk {
                min_time_ms: 0,
                max_time_ms: 0,
                r#type: chunk::Encoding::Histogram as i32,
                data: vec![0, 0],
            }],
        };
        assert_eq!(
            decode_chunked_series(series),
            Err(ChunkError::UnsupportedEncoding(2))
        );
    }

    #[test]
    fn test_sampled_response_roundtrip() {
        let response = ReadResponse {
            results: vec![QueryResult {
                timeseries: vec![prompb::TimeSeries {
                    labels: vec![label("__name__", "up")],
                    samples: vec![prompb::Sample {
                        value: 1.0,
                        timestamp: 1000,
                    }],
                }],
            }],
        };
        let body = encode_read_response(&response).unwrap();
        assert_eq!(decode_read_response(&body).unwrap(), response);
    }
}
