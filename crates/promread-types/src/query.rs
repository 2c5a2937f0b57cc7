//! Query construction.

use crate::{Filter, METRIC_NAME, MatchType, Matcher, QueryError};

/// Pattern selecting any non-empty metric name.
const ANY_METRIC: &str = ".+";

/// Request descriptor for one read.
///
/// The wire protocol uses an inclusive end timestamp, so the exclusive
/// `Filter::max` is shifted down by one millisecond.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// First timestamp included, Unix milliseconds.
    pub start_ms: i64,
    /// Last timestamp included, Unix milliseconds.
    pub end_ms: i64,
    /// Label matchers. Always exactly one when built from a [`Filter`].
    pub matchers: Vec<Matcher>,
}

impl Query {
    /// Builds the query for a filter.
    ///
    /// An empty filter selects every series with a non-empty metric name;
    /// otherwise the filter's label value is used as a regex on its label.
    ///
    /// # Errors
    ///
    /// Returns an error if the matcher cannot be built.
    ///
    /// # Example
    ///
    /// ```
    /// use promread_types::{Filter, Query};
    ///
    /// let query = Query::from_filter(&Filter::new(1000, 2000)).unwrap();
    /// assert_eq!(query.start_ms, 1000);
    /// assert_eq!(query.end_ms, 1999);
    /// assert_eq!(query.matchers[0].name(), "__name__");
    /// ```
    pub fn from_filter(filter: &Filter) -> Result<Self, QueryError> {
        let matcher = if filter.is_catch_all() {
            Matcher::new(MatchType::Regex, METRIC_NAME, ANY_METRIC)?
        } else {
            Matcher::new(MatchType::Regex, &filter.label, &filter.label_value)?
        };
        Ok(Self {
            start_ms: filter.min,
            end_ms: filter.max.saturating_sub(1),
            matchers: vec![matcher],
        })
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let matchers: Vec<String> = self.matchers.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{{{}}} [{}, {}]",
            matchers.join(", "),
            self.start_ms,
            self.end_ms
        )
    }
}
