#![forbid(unsafe_code)]

//! Legacy `pattern` filter.
//!
//! The source follows the HTML `pattern` attribute convention: it must match
//! the whole value, so it is compiled as `^(?:source)$`. A binding with a
//! pattern only applies while the control's value does **not** match it.

use std::fmt;

use regex::Regex;

/// Pattern as given to the property setter.
#[derive(Debug, Clone)]
pub enum PatternSource {
    /// Uncompiled source text.
    Source(String),
    /// A compiled regex; its source is reused.
    Compiled(Regex),
}

impl PatternSource {
    /// Source text reflected to the `pattern` attribute.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Source(s) => s,
            Self::Compiled(re) => re.as_str(),
        }
    }
}

impl From<&str> for PatternSource {
    fn from(source: &str) -> Self {
        Self::Source(source.to_owned())
    }
}

impl From<String> for PatternSource {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<Regex> for PatternSource {
    fn from(regex: Regex) -> Self {
        Self::Compiled(regex)
    }
}

/// A compiled whole-value pattern.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    source: String,
    anchored: Regex,
}

impl PatternFilter {
    /// Compile `source`. Returns `Ok(None)` for an empty source.
    pub fn compile(source: &str) -> Result<Option<Self>, PatternError> {
        if source.is_empty() {
            return Ok(None);
        }
        let fail = |error| PatternError {
            source: source.to_owned(),
            error,
        };
        // The source must stand alone, or a stray `)` could close the wrapper
        // group and drop the anchors.
        Regex::new(source).map_err(fail)?;
        let anchored = Regex::new(&format!("^(?:{source})$")).map_err(fail)?;
        Ok(Some(Self {
            source: source.to_owned(),
            anchored,
        }))
    }

    /// Source text, without the added anchors.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `value` matches.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }

    /// Whether `value` fails the pattern (the binding applies).
    #[must_use]
    pub fn rejects(&self, value: &str) -> bool {
        !self.is_match(value)
    }
}

impl PartialEq for PatternFilter {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PatternFilter {}

/// A pattern source that does not compile.
#[derive(Debug, Clone)]
pub struct PatternError {
    source: String,
    error: regex::Error,
}

impl PatternError {
    /// The offending source text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pattern {:?}: {}", self.source, self.error)
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_value_match() {
        let filter = PatternFilter::compile("[a-z]+@[a-z]+").unwrap().unwrap();
        assert!(filter.is_match("x@y"));
        assert!(!filter.is_match("x@y.com"));
        assert!(filter.rejects(" x@y"));
        assert_eq!(filter.source(), "[a-z]+@[a-z]+");
    }

    #[test]
    fn alternation_is_grouped_before_anchoring() {
        let filter = PatternFilter::compile("a|b").unwrap().unwrap();
        assert!(filter.is_match("a"));
        assert!(filter.is_match("b"));
        assert!(!filter.is_match("ab"));
    }

    #[test]
    fn empty_source_is_no_filter() {
        assert!(PatternFilter::compile("").unwrap().is_none());
    }

    #[test]
    fn malformed_source_errors() {
        let err = PatternFilter::compile("(unclosed").unwrap_err();
        assert_eq!(err.pattern(), "(unclosed");
        assert!(err.to_string().starts_with("invalid pattern \"(unclosed\""));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unbalanced_group_cannot_escape_anchors() {
        let err = PatternFilter::compile("a)|(?:b").unwrap_err();
        assert_eq!(err.pattern(), "a)|(?:b");
        assert!(PatternFilter::compile("a)").is_err());
    }

    #[test]
    fn source_from_regex_keeps_text() {
        let source = PatternSource::from(Regex::new(r"\d{3}").unwrap());
        assert_eq!(source.as_str(), r"\d{3}");
        assert_eq!(PatternSource::from("abc").as_str(), "abc");
    }
}
