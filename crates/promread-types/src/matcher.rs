//! Label matchers.

use crate::QueryError;

/// Reserved label holding the metric name.
pub const METRIC_NAME: &str = "__name__";

/// How a [`Matcher`] compares a label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// Value equals the matcher value (`=`).
    Equal,
    /// Value differs from the matcher value (`!=`).
    NotEqual,
    /// Value matches the regular expression (`=~`).
    Regex,
    /// Value does not match the regular expression (`!~`).
    NotRegex,
}

impl MatchType {
    /// Returns the PromQL operator for this match type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Regex => "=~",
            Self::NotRegex => "!~",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate on one label's value.
///
/// Patterns are sent as given and evaluated by the remote source with its
/// own regex dialect; they are never compiled locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matcher {
    kind: MatchType,
    name: String,
    value: String,
}

impl Matcher {
    /// Creates a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidMatcher`] if `name` is empty. A matcher on
    /// the empty label name cannot select any series.
    pub fn new(
        kind: MatchType,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, QueryError> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() {
            return Err(QueryError::InvalidMatcher(format!(
                "empty label name for {kind}{value:?}"
            )));
        }
        Ok(Self { kind, name, value })
    }

    /// Returns the match type.
    #[must_use]
    pub const fn kind(&self) -> MatchType {
        self.kind
    }

    /// Returns the label name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value or pattern.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_kept_verbatim() {
        // RE2 literal quoting, which the regex crate does not accept.
        let m = Matcher::new(MatchType::Regex, "instance", r"\Qhost.example:9100\E").unwrap();
        assert_eq!(m.value(), r"\Qhost.example:9100\E");

        let m = Matcher::new(MatchType::Regex, "job", "(unclosed").unwrap();
        assert_eq!(m.value(), "(unclosed");
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Matcher::new(MatchType::Regex, "", "x").unwrap_err();
        assert!(matches!(err, QueryError::InvalidMatcher(_)));
    }

    #[test]
    fn test_display() {
        let m = Matcher::new(MatchType::Regex, METRIC_NAME, ".+").unwrap();
        assert_eq!(m.to_string(), "__name__=~\".+\"");
        let m = Matcher::new(MatchType::NotEqual, "env", "prod").unwrap();
        assert_eq!(m.to_string(), "env!=\"prod\"");
    }
}
