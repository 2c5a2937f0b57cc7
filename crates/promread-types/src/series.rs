//! Decoded time series.

use serde::{Deserialize, Serialize};

use crate::METRIC_NAME;

/// A label name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
    /// Label value.
    pub value: String,
}

impl Label {
    /// Creates a new label.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single (timestamp, value) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    /// Sample value, passed through as decoded.
    pub value: f64,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Labels and samples of one series entry delivered to a stream callback.
///
/// Samples keep the order they were decoded in: ascending within a chunk,
/// concatenated chunk by chunk. They are never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Series labels, in wire order.
    pub labels: Vec<Label>,
    /// Decoded samples.
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    /// Creates a series with the given labels and no samples.
    #[must_use]
    pub const fn new(labels: Vec<Label>) -> Self {
        Self {
            labels,
            samples: Vec::new(),
        }
    }

    /// Returns the value of a label, if present.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// Returns the metric name, if present.
    #[must_use]
    pub fn metric_name(&self) -> Option<&str> {
        self.label(METRIC_NAME)
    }

    /// Returns true if the series has no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the number of samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }
}

impl std::fmt::Display for TimeSeries {
    /// Formats the label set in PromQL selector notation.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.metric_name() {
            f.write_str(name)?;
        }
        f.write_str("{")?;
        let mut first = true;
        for label in self.labels.iter().filter(|l| l.name != METRIC_NAME) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={:?}", label.name, label.value)?;
            first = false;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TimeSeries {
        TimeSeries {
            labels: vec![
                Label::new(METRIC_NAME, "up"),
                Label::new("instance", "localhost:9090"),
                Label::new("job", "prometheus"),
            ],
            samples: vec![Sample::new(1000, 1.0), Sample::new(2000, 0.0)],
        }
    }

    #[test]
    fn test_label_lookup() {
        let s = series();
        assert_eq!(s.metric_name(), Some("up"));
        assert_eq!(s.label("job"), Some("prometheus"));
        assert_eq!(s.label("missing"), None);
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            series().to_string(),
            "up{instance=\"localhost:9090\", job=\"prometheus\"}"
        );
        assert_eq!(TimeSeries::default().to_string(), "{}");
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&Sample::new(5, 1.5)).unwrap();
        assert_eq!(json, r#"{"timestamp":5,"value":1.5}"#);
    }
}
