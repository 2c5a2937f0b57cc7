//! Remote-read protobuf messages.
//!
//! Hand-written prost definitions for the subset of `prometheus/prompb`
//! exchanged by the remote-read endpoint.

use promread_types::{MatchType, Matcher};

/// A label name/value pair.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Label {
    /// Label name.
    #[prost(string, tag = "1")]
    pub name: String,
    /// Label value.
    #[prost(string, tag = "2")]
    pub value: String,
}

/// A raw sample.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Sample {
    /// Sample value.
    #[prost(double, tag = "1")]
    pub value: f64,
    /// Unix timestamp in milliseconds.
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

/// Labels and raw samples of one series.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TimeSeries {
    /// Series labels.
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    /// Samples ordered by time.
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<Sample>,
}

/// A remote-read request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ReadRequest {
    /// Queries to evaluate.
    #[prost(message, repeated, tag = "1")]
    pub queries: Vec<Query>,
    /// Response types the client accepts, in order of preference.
    #[prost(enumeration = "read_request::ResponseType", repeated, tag = "2")]
    pub accepted_response_types: Vec<i32>,
}

/// Nested types of [`ReadRequest`].
pub mod read_request {
    /// Response encodings a server may choose from.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum ResponseType {
        /// A single snappy-compressed `ReadResponse` with raw samples.
        Samples = 0,
        /// A stream of length-delimited `ChunkedReadResponse` frames.
        StreamedXorChunks = 1,
    }
}

/// A sampled remote-read response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ReadResponse {
    /// One result per query, in request order.
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<QueryResult>,
}

/// Query parameters.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Query {
    /// First timestamp included.
    #[prost(int64, tag = "1")]
    pub start_timestamp_ms: i64,
    /// Last timestamp included.
    #[prost(int64, tag = "2")]
    pub end_timestamp_ms: i64,
    /// Label matchers, AND-combined by the server.
    #[prost(message, repeated, tag = "3")]
    pub matchers: Vec<LabelMatcher>,
    /// Optional query hints.
    #[prost(message, optional, tag = "4")]
    pub hints: Option<ReadHints>,
}

/// Result of one query in a sampled response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryResult {
    /// Matching series.
    #[prost(message, repeated, tag = "1")]
    pub timeseries: Vec<TimeSeries>,
}

/// A predicate on one label's value.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct LabelMatcher {
    /// Match type.
    #[prost(enumeration = "label_matcher::Type", tag = "1")]
    pub r#type: i32,
    /// Label name.
    #[prost(string, tag = "2")]
    pub name: String,
    /// Value or pattern.
    #[prost(string, tag = "3")]
    pub value: String,
}

/// Nested types of [`LabelMatcher`].
pub mod label_matcher {
    /// Wire match types.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        /// `=`
        Eq = 0,
        /// `!=`
        Neq = 1,
        /// `=~`
        Re = 2,
        /// `!~`
        Nre = 3,
    }
}

/// Hints about how the query will be evaluated.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ReadHints {
    /// Query step size in milliseconds.
    #[prost(int64, tag = "1")]
    pub step_ms: i64,
    /// Surrounding function name.
    #[prost(string, tag = "2")]
    pub func: String,
    /// Start time in milliseconds.
    #[prost(int64, tag = "3")]
    pub start_ms: i64,
    /// End time in milliseconds.
    #[prost(int64, tag = "4")]
    pub end_ms: i64,
    /// Grouping labels.
    #[prost(string, repeated, tag = "5")]
    pub grouping: Vec<String>,
    /// Whether grouping is `by` (true) or `without` (false).
    #[prost(bool, tag = "6")]
    pub by: bool,
    /// Range vector selector range in milliseconds.
    #[prost(int64, tag = "7")]
    pub range_ms: i64,
}

/// One frame of a streamed response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChunkedReadResponse {
    /// Series entries carried by this frame.
    #[prost(message, repeated, tag = "1")]
    pub chunked_series: Vec<ChunkedSeries>,
    /// Index of the request query these series answer.
    #[prost(int64, tag = "2")]
    pub query_index: i64,
}

/// Labels and encoded chunks of one series.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChunkedSeries {
    /// Series labels.
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    /// Chunks ordered by time.
    #[prost(message, repeated, tag = "2")]
    pub chunks: Vec<Chunk>,
}

/// An encoded run of samples.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Chunk {
    /// Timestamp of the first sample.
    #[prost(int64, tag = "1")]
    pub min_time_ms: i64,
    /// Timestamp of the last sample.
    #[prost(int64, tag = "2")]
    pub max_time_ms: i64,
    /// Payload encoding.
    #[prost(enumeration = "chunk::Encoding", tag = "3")]
    pub r#type: i32,
    /// Encoded samples.
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
}

/// Nested types of [`Chunk`].
pub mod chunk {
    /// Chunk payload encodings.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum Encoding {
        /// Unset.
        Unknown = 0,
        /// Float XOR chunk.
        Xor = 1,
        /// Native histogram chunk.
        Histogram = 2,
        /// Native float histogram chunk.
        FloatHistogram = 3,
    }
}

impl From<&Matcher> for LabelMatcher {
    fn from(matcher: &Matcher) -> Self {
        let kind = match matcher.kind() {
            MatchType::Equal => label_matcher::Type::Eq,
            MatchType::NotEqual => label_matcher::Type::Neq,
            MatchType::Regex => label_matcher::Type::Re,
            MatchType::NotRegex => label_matcher::Type::Nre,
        };
        Self {
            r#type: kind as i32,
            name: matcher.name().to_string(),
            value: matcher.value().to_string(),
        }
    }
}

impl From<Label> for promread_types::Label {
    fn from(label: Label) -> Self {
        Self {
            name: label.name,
            value: label.value,
        }
    }
}

impl From<&promread_types::Label> for Label {
    fn from(label: &promread_types::Label) -> Self {
        Self {
            name: label.name.clone(),
            value: label.value.clone(),
        }
    }
}

impl From<TimeSeries> for promread_types::TimeSeries {
    fn from(series: TimeSeries) -> Self {
        Self {
            labels: series.labels.into_iter().map(Into::into).collect(),
            samples: series
                .samples
                .into_iter()
                .map(|s| promread_types::Sample::new(s.timestamp, s.value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_matcher_to_wire() {
        let m = Matcher::new(MatchType::Regex, "job", "node.*").unwrap();
        let wire = LabelMatcher::from(&m);
        assert_eq!(wire.r#type(), label_matcher::Type::Re);
        assert_eq!(wire.name, "job");
        assert_eq!(wire.value, "node.*");
    }

    #[test]
    fn test_timeseries_conversion() {
        let wire = TimeSeries {
            labels: vec![Label {
                name: "__name__".to_string(),
                value: "up".to_string(),
            }],
            samples: vec![Sample {
                value: 1.0,
                timestamp: 1000,
            }],
        };
        let series = promread_types::TimeSeries::from(wire);
        assert_eq!(series.metric_name(), Some("up"));
        assert_eq!(series.samples, vec![promread_types::Sample::new(1000, 1.0)]);
    }

    #[test]
    fn test_chunk_message_decodes() {
        let frame = ChunkedReadResponse {
            chunked_series: vec![ChunkedSeries {
                labels: vec![],
                chunks: vec![Chunk {
                    min_time_ms: 1,
                    max_time_ms: 2,
                    r#type: chunk::Encoding::Xor as i32,
                    data: vec![0, 0],
                }],
            }],
            query_index: 0,
        };
        let decoded = ChunkedReadResponse::decode(frame.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(
            decoded.chunked_series[0].chunks[0].r#type(),
            chunk::Encoding::Xor
        );
    }
}
