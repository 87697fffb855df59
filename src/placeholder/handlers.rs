//! Placeholder keyword handlers.
//!
//! A handler owns the verdict for one placeholder keyword. The evaluator
//! isolates the keyword and arguments from the control text and hands the
//! test side's value to the handler; the handler alone decides the outcome.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::diff::ComparisonResult;

/// A handler for one placeholder keyword.
///
/// Implementations must be pure functions of their inputs and must tolerate
/// an absent test value (the placeholder may stand in for a text node or
/// attribute the test document does not have at all).
pub trait PlaceholderHandler: Send + Sync {
    /// The keyword this handler is registered under.
    fn keyword(&self) -> &str;

    /// Decides the outcome for the given test value and arguments.
    fn evaluate(&self, test_text: Option<&str>, args: &[String]) -> ComparisonResult;
}

/// `${xmlunit.ignore}` - the comparison is equal no matter what the test
/// side holds, including nothing at all.
pub struct IgnorePlaceholderHandler;

impl PlaceholderHandler for IgnorePlaceholderHandler {
    fn keyword(&self) -> &str {
        "ignore"
    }

    fn evaluate(&self, _test_text: Option<&str>, _args: &[String]) -> ComparisonResult {
        ComparisonResult::Equal
    }
}

/// `${xmlunit.isNull}` - equal only if the test side has no value.
pub struct IsNullPlaceholderHandler;

impl PlaceholderHandler for IsNullPlaceholderHandler {
    fn keyword(&self) -> &str {
        "isNull"
    }

    fn evaluate(&self, test_text: Option<&str>, _args: &[String]) -> ComparisonResult {
        if test_text.is_none() {
            ComparisonResult::Equal
        } else {
            ComparisonResult::Different
        }
    }
}

/// `${xmlunit.isNumber}` - equal if the test value parses as a number.
pub struct IsNumberPlaceholderHandler;

impl PlaceholderHandler for IsNumberPlaceholderHandler {
    fn keyword(&self) -> &str {
        "isNumber"
    }

    fn evaluate(&self, test_text: Option<&str>, _args: &[String]) -> ComparisonResult {
        match test_text {
            Some(t) if t.trim().parse::<f64>().is_ok() => ComparisonResult::Equal,
            _ => ComparisonResult::Different,
        }
    }
}

/// `${xmlunit.isDateTime}` or `${xmlunit.isDateTime(format)}` - equal if the
/// test value parses as a date or date-time.
///
/// Without an argument a fixed set of common formats is tried; with an
/// argument only the supplied chrono format string is used.
pub struct IsDateTimePlaceholderHandler;

/// Date-time formats tried when no explicit format argument is given.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only formats tried when no explicit format argument is given.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

impl IsDateTimePlaceholderHandler {
    fn parses(&self, value: &str, args: &[String]) -> bool {
        if let Some(format) = args.first() {
            let format = format.trim();
            return NaiveDateTime::parse_from_str(value, format).is_ok()
                || NaiveDate::parse_from_str(value, format).is_ok();
        }
        DateTime::parse_from_rfc3339(value).is_ok()
            || DATE_TIME_FORMATS
                .iter()
                .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
            || DATE_FORMATS
                .iter()
                .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
    }
}

impl PlaceholderHandler for IsDateTimePlaceholderHandler {
    fn keyword(&self) -> &str {
        "isDateTime"
    }

    fn evaluate(&self, test_text: Option<&str>, args: &[String]) -> ComparisonResult {
        match test_text {
            Some(t) if !t.trim().is_empty() && self.parses(t.trim(), args) => {
                ComparisonResult::Equal
            }
            _ => ComparisonResult::Different,
        }
    }
}

/// `${xmlunit.matchesRegex(pattern)}` - equal if the test value matches the
/// pattern given as the first argument.
///
/// A missing test value, a missing pattern, or a pattern that fails to
/// compile all yield Different.
pub struct MatchesRegexPlaceholderHandler;

impl PlaceholderHandler for MatchesRegexPlaceholderHandler {
    fn keyword(&self) -> &str {
        "matchesRegex"
    }

    fn evaluate(&self, test_text: Option<&str>, args: &[String]) -> ComparisonResult {
        let (Some(text), Some(pattern)) = (test_text, args.first()) else {
            return ComparisonResult::Different;
        };
        match Regex::new(pattern.trim()) {
            Ok(re) if re.is_match(text) => ComparisonResult::Equal,
            _ => ComparisonResult::Different,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ComparisonResult::{Different, Equal};

    #[test]
    fn test_ignore_accepts_anything() {
        let h = IgnorePlaceholderHandler;
        assert_eq!(h.evaluate(Some("anything"), &[]), Equal);
        assert_eq!(h.evaluate(None, &[]), Equal);
    }

    #[test]
    fn test_is_null() {
        let h = IsNullPlaceholderHandler;
        assert_eq!(h.evaluate(None, &[]), Equal);
        assert_eq!(h.evaluate(Some(""), &[]), Different);
        assert_eq!(h.evaluate(Some("value"), &[]), Different);
    }

    #[test]
    fn test_is_number() {
        let h = IsNumberPlaceholderHandler;
        assert_eq!(h.evaluate(Some("123"), &[]), Equal);
        assert_eq!(h.evaluate(Some("-1.5e3"), &[]), Equal);
        assert_eq!(h.evaluate(Some(" 42 "), &[]), Equal);
        assert_eq!(h.evaluate(Some("abc"), &[]), Different);
        assert_eq!(h.evaluate(None, &[]), Different);
    }

    #[test]
    fn test_is_date_time_default_formats() {
        let h = IsDateTimePlaceholderHandler;
        assert_eq!(h.evaluate(Some("2024-01-31"), &[]), Equal);
        assert_eq!(h.evaluate(Some("2024-01-31T10:20:30"), &[]), Equal);
        assert_eq!(h.evaluate(Some("2024-01-31T10:20:30+01:00"), &[]), Equal);
        assert_eq!(h.evaluate(Some("31.01.2024"), &[]), Equal);
        assert_eq!(h.evaluate(Some("not a date"), &[]), Different);
        assert_eq!(h.evaluate(None, &[]), Different);
    }

    #[test]
    fn test_is_date_time_explicit_format() {
        let h = IsDateTimePlaceholderHandler;
        let args = vec!["%Y/%m/%d".to_string()];
        assert_eq!(h.evaluate(Some("2024/01/31"), &args), Equal);
        assert_eq!(h.evaluate(Some("2024-01-31"), &args), Different);
    }

    #[test]
    fn test_matches_regex() {
        let h = MatchesRegexPlaceholderHandler;
        let args = vec![r"^\d+$".to_string()];
        assert_eq!(h.evaluate(Some("12345"), &args), Equal);
        assert_eq!(h.evaluate(Some("12a45"), &args), Different);
        assert_eq!(h.evaluate(None, &args), Different);
        assert_eq!(h.evaluate(Some("x"), &[]), Different);
    }

    #[test]
    fn test_matches_regex_trims_pattern() {
        let h = MatchesRegexPlaceholderHandler;
        let args = vec![r" ^\d+$ ".to_string()];
        assert_eq!(h.evaluate(Some("12345"), &args), Equal);
    }

    #[test]
    fn test_matches_regex_invalid_pattern() {
        let h = MatchesRegexPlaceholderHandler;
        let args = vec!["(unclosed".to_string()];
        assert_eq!(h.evaluate(Some("anything"), &args), Different);
    }
}
