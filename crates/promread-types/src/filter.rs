//! Read filter supplied by the caller.

use serde::{Deserialize, Serialize};

/// Scope of a single read: a half-open time range `[min, max)` in
/// milliseconds plus an optional label filter.
///
/// When both `label` and `label_value` are empty the filter selects every
/// series with a non-empty metric name. Otherwise `label_value` is a regular
/// expression matched against `label`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Start of the range (inclusive), Unix milliseconds.
    pub min: i64,
    /// End of the range (exclusive), Unix milliseconds.
    pub max: i64,
    /// Label name to filter on.
    pub label: String,
    /// Regular expression for the label value.
    pub label_value: String,
}

impl Filter {
    /// Creates a filter over `[min, max)` selecting every series.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            label: String::new(),
            label_value: String::new(),
        }
    }

    /// Restricts the filter to series whose `label` matches `value`.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.label = label.into();
        self.label_value = value.into();
        self
    }

    /// Returns true if no label filter is set.
    #[must_use]
    pub const fn is_catch_all(&self) -> bool {
        self.label.is_empty() && self.label_value.is_empty()
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_catch_all() {
            write!(f, "[{}, {}) all series", self.min, self.max)
        } else {
            write!(
                f,
                "[{}, {}) {}=~{:?}",
                self.min, self.max, self.label, self.label_value
            )
        }
    }
}
