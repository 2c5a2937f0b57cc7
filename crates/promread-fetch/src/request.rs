//! Read request encoding.

use bytes::Bytes;
use prost::Message;
use promread_types::Query;

use crate::ReadError;
use crate::prompb::{self, read_request::ResponseType};

/// Header carrying the remote-read protocol version.
pub const READ_VERSION_HEADER: &str = "X-Prometheus-Remote-Read-Version";

/// Remote-read protocol version sent with every request.
pub const READ_VERSION: &str = "0.1.0";

/// Content type of requests and sampled responses.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Content type of streamed responses.
pub const STREAMED_CONTENT_TYPE: &str =
    "application/x-streamed-protobuf; proto=prometheus.ChunkedReadResponse";

/// Builds the wire request for a query, asking for streamed XOR chunks.
#[must_use]
pub fn read_request(query: &Query) -> prompb::ReadRequest {
    prompb::ReadRequest {
        queries: vec![prompb::Query {
            start_timestamp_ms: query.start_ms,
            end_timestamp_ms: query.end_ms,
            matchers: query.matchers.iter().map(Into::into).collect(),
            hints: None,
        }],
        accepted_response_types: vec![ResponseType::StreamedXorChunks as i32],
    }
}

/// Encodes and snappy-compresses the read request for a query.
///
/// # Errors
///
/// Returns an error if compression fails.
pub fn encode_read_request(query: &Query) -> Result<Bytes, ReadError> {
    let data = read_request(query).encode_to_vec();
    let compressed = snap::raw::Encoder::new().compress_vec(&data)?;
    Ok(Bytes::from(compressed))
}

/// Decompresses and decodes a read request body.
///
/// # Errors
///
/// Returns an error if the body is not snappy-compressed or not a valid
/// request.
pub fn decode_read_request(body: &[u8]) -> Result<prompb::ReadRequest, ReadError> {
    let data = snap::raw::Decoder::new().decompress_vec(body)?;
    Ok(prompb::ReadRequest::decode(data.as_slice())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompb::label_matcher;
    use promread_types::Filter;

    #[test]
    fn test_request_roundtrip() {
        let query = Query::from_filter(&Filter::new(1000, 5000).with_label("job", "node")).unwrap();
        let body = encode_read_request(&query).unwrap();
        let request = decode_read_request(&body).unwrap();

        assert_eq!(request.queries.len(), 1);
        let q = &request.queries[0];
        assert_eq!(q.start_timestamp_ms, 1000);
        assert_eq!(q.end_timestamp_ms, 4999);
        assert_eq!(q.matchers.len(), 1);
        assert_eq!(q.matchers[0].r#type(), label_matcher::Type::Re);
        assert_eq!(q.matchers[0].name, "job");
        assert_eq!(q.matchers[0].value, "node");
        assert_eq!(
            request.accepted_response_types().collect::<Vec<_>>(),
            vec![ResponseType::StreamedXorChunks]
        );
    }

    #[test]
    fn test_body_is_snappy() {
        let query = Query::from_filter(&Filter::new(0, 1)).unwrap();
        let body = encode_read_request(&query).unwrap();
        let raw = read_request(&query).encode_to_vec();
        assert_eq!(snap::raw::decompress_len(&body).unwrap(), raw.len());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_read_request(b"not snappy").is_err());
    }
}
