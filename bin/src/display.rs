//! Output formatting for the promread CLI.

use clap::ValueEnum;
use promread_lib::prelude::*;
use serde::{Serialize, Serializer};
use std::io::{self, Write};

/// Output format for streamed series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// One JSON object per series
    Ndjson,
    /// One line per sample: `selector value @timestamp`
    Text,
}

impl Format {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Ndjson => "ndjson",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ndjson form of a series.
///
/// Non-finite sample values are written as the strings `"NaN"`, `"+Inf"` and
/// `"-Inf"`, as the Prometheus HTTP API does, since JSON numbers cannot hold
/// them.
#[derive(Serialize)]
struct JsonSeries<'a> {
    labels: &'a [Label],
    samples: Vec<JsonSample>,
}

#[derive(Serialize)]
struct JsonSample {
    timestamp: i64,
    #[serde(serialize_with = "serialize_value")]
    value: f64,
}

impl<'a> From<&'a TimeSeries> for JsonSeries<'a> {
    fn from(series: &'a TimeSeries) -> Self {
        Self {
            labels: &series.labels,
            samples: series
                .samples
                .iter()
                .map(|s| JsonSample {
                    timestamp: s.timestamp,
                    value: s.value,
                })
                .collect(),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_value<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Writes series to an output as they arrive.
pub(crate) struct SeriesWriter<W> {
    out: W,
    format: Format,
}

impl<W: Write> SeriesWriter<W> {
    pub(crate) const fn new(out: W, format: Format) -> Self {
        Self { out, format }
    }

    /// Write one series.
    pub(crate) fn write(&mut self, series: &TimeSeries) -> io::Result<()> {
        match self.format {
            Format::Ndjson => {
                serde_json::to_writer(&mut self.out, &JsonSeries::from(series))?;
                writeln!(self.out)
            }
            Format::Text => {
                for sample in &series.samples {
                    writeln!(self.out, "{series} {} @{}", sample.value, sample.timestamp)?;
                }
                Ok(())
            }
        }
    }

    /// Flush buffered output and return the underlying writer.
    pub(crate) fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TimeSeries {
        TimeSeries {
            labels: vec![Label::new("__name__", "up"), Label::new("job", "node")],
            samples: vec![Sample::new(1000, 1.0), Sample::new(2000, 0.5)],
        }
    }

    fn render(format: Format) -> String {
        let mut writer = SeriesWriter::new(Vec::new(), format);
        writer.write(&series()).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_text_output() {
        assert_eq!(
            render(Format::Text),
            "up{job=\"node\"} 1 @1000\nup{job=\"node\"} 0.5 @2000\n"
        );
    }

    #[test]
    fn test_ndjson_output() {
        let out = render(Format::Ndjson);
        assert!(out.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["labels"][0]["name"], "__name__");
        assert_eq!(value["labels"][0]["value"], "up");
        assert_eq!(value["samples"][1]["timestamp"], 2000);
        assert_eq!(value["samples"][1]["value"], 0.5);
    }

    #[test]
    fn test_ndjson_non_finite_values() {
        let series = TimeSeries {
            labels: vec![Label::new("__name__", "up")],
            samples: vec![
                Sample::new(1000, f64::NAN),
                Sample::new(2000, f64::INFINITY),
                Sample::new(3000, f64::NEG_INFINITY),
                Sample::new(4000, 2.0),
            ],
        };
        let mut writer = SeriesWriter::new(Vec::new(), Format::Ndjson);
        writer.write(&series).unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();

        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["samples"][0]["value"], "NaN");
        assert_eq!(value["samples"][1]["value"], "+Inf");
        assert_eq!(value["samples"][2]["value"], "-Inf");
        assert_eq!(value["samples"][3]["value"], 2.0);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(Format::Ndjson.to_string(), "ndjson");
        assert_eq!(Format::Text.to_string(), "text");
    }
}
