//! Primary dex class name filtering.

use crate::bucketer::{Error, Result};
use regex::RegexSet;

/// Decides whether a class must live in the primary dex.
///
/// Implementations must be pure: the same class name always yields the same
/// answer within one bucketing run.
pub trait ClassNamePredicate {
    /// Returns `true` if `class_name` is pinned to the primary dex.
    fn matches(&self, class_name: &str) -> bool;
}

impl<F> ClassNamePredicate for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, class_name: &str) -> bool {
        self(class_name)
    }
}

/// Regex-backed filter built from the configured primary dex patterns.
///
/// Patterns are unanchored; use `^` and `$` to pin a prefix or suffix.
/// An empty pattern list matches nothing.
#[derive(Debug, Clone)]
pub struct PrimaryDexFilter {
    patterns: RegexSet,
}

impl PrimaryDexFilter {
    /// Compiles `patterns`, rejecting the first one that is not a valid regex.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        // RegexSet only reports that *some* pattern failed; compile one by one
        // to name the culprit.
        for pattern in &patterns {
            if let Err(source) = regex::Regex::new(pattern) {
                return Err(Error::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                });
            }
        }

        let patterns = RegexSet::new(&patterns).map_err(|source| Error::InvalidPattern {
            pattern: patterns.join(" | "),
            source,
        })?;
        Ok(Self { patterns })
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern was configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl ClassNamePredicate for PrimaryDexFilter {
    fn matches(&self, class_name: &str) -> bool {
        self.patterns.is_match(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_package_pattern_matches_members() {
        let filter = PrimaryDexFilter::new([r"com\.x\..*"]).unwrap();
        assert!(filter.matches("com.x.D"));
        assert!(!filter.matches("com.y.D"));
    }

    #[test]
    fn anchors_are_honoured() {
        let filter = PrimaryDexFilter::new(["^com/app/", "Application$"]).unwrap();
        assert!(filter.matches("com/app/Main"));
        assert!(!filter.matches("org/com/app/Main"));
        assert!(filter.matches("org/MyApplication"));
        assert!(!filter.matches("org/MyApplicationHelper"));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = PrimaryDexFilter::new(Vec::<String>::new()).unwrap();
        assert!(filter.is_empty());
        assert!(!filter.matches("anything"));
    }

    #[test]
    fn bad_pattern_is_named() {
        let err = PrimaryDexFilter::new(["ok", "(unclosed"]).unwrap_err();
        match err {
            Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn closures_are_predicates() {
        let pred = |name: &str| name.ends_with("R");
        assert!(ClassNamePredicate::matches(&pred, "com.app.R"));
    }
}
