//! Placeholder-aware difference evaluation.
//!
//! [`PlaceholderEvaluator`] is installed as a post-processing step in a diff
//! engine's evaluation pipeline. For every comparison it inspects the control
//! side's text for a placeholder token; when one is found and its keyword is
//! registered, the matching handler decides the final outcome instead of the
//! engine's tentative one.
//!
//! Default delimiters for a placeholder are `${` and `}`. Arguments are by
//! default enclosed in `(` and `)` and separated by `,` - whitespace is
//! significant, arguments are not quoted. All five delimiters can be replaced
//! by custom regular-expression fragments at construction time.

use regex::Regex;

use crate::diff::{Comparison, ComparisonResult, ComparisonType, DifferenceEvaluator, Value};
use crate::error::{Error, Result};
use crate::node::{NodeRef, QName};
use crate::util::attributes_of;

use super::registry;

/// Default pattern for the opening delimiter of a placeholder.
pub const DEFAULT_OPENING_DELIMITER_REGEX: &str = r"\$\{";
/// Default pattern for the closing delimiter of a placeholder.
pub const DEFAULT_CLOSING_DELIMITER_REGEX: &str = r"\}";
/// Default pattern for the opening delimiter of an argument list.
pub const DEFAULT_ARGS_OPENING_DELIMITER_REGEX: &str = r"\(";
/// Default pattern for the closing delimiter of an argument list.
pub const DEFAULT_ARGS_CLOSING_DELIMITER_REGEX: &str = r"\)";
/// Default pattern for the separator between arguments.
pub const DEFAULT_ARGS_SEPARATOR_REGEX: &str = ",";

/// Required prefix of every placeholder keyword. Not configurable.
const PLACEHOLDER_PREFIX_REGEX: &str = r"xmlunit\.";

/// A placeholder token isolated from a control text.
struct PlaceholderToken {
    /// The full matched substring, delimiters included.
    matched: String,
    /// The keyword naming the handler.
    keyword: String,
    /// Raw argument strings, as produced by the separator split.
    args: Vec<String>,
}

/// Difference evaluator that re-evaluates comparisons whose control side is
/// a placeholder token.
pub struct PlaceholderEvaluator {
    placeholder_regex: Regex,
    args_regex: Regex,
    args_splitter: Regex,
}

impl Default for PlaceholderEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderEvaluator {
    /// Creates an evaluator with the default delimiters.
    pub fn new() -> Self {
        Self::with_all_delimiters(None, None, None, None, None)
            .expect("default delimiter patterns are valid")
    }

    /// Creates an evaluator with custom placeholder delimiters and default
    /// argument delimiters.
    ///
    /// Each fragment is a regular expression, not a literal; absent or blank
    /// fragments fall back to the defaults.
    pub fn with_delimiters(opening: Option<&str>, closing: Option<&str>) -> Result<Self> {
        Self::with_all_delimiters(opening, closing, None, None, None)
    }

    /// Creates an evaluator with custom placeholder and argument-list
    /// delimiters.
    ///
    /// Each fragment is a regular expression, not a literal - a caller may
    /// deliberately supply a pattern matching several delimiter forms.
    /// Absent or blank fragments fall back to the defaults.
    pub fn with_all_delimiters(
        opening: Option<&str>,
        closing: Option<&str>,
        args_opening: Option<&str>,
        args_closing: Option<&str>,
        args_separator: Option<&str>,
    ) -> Result<Self> {
        let opening = fragment_or(opening, DEFAULT_OPENING_DELIMITER_REGEX);
        let closing = fragment_or(closing, DEFAULT_CLOSING_DELIMITER_REGEX);
        let args_opening = fragment_or(args_opening, DEFAULT_ARGS_OPENING_DELIMITER_REGEX);
        let args_closing = fragment_or(args_closing, DEFAULT_ARGS_CLOSING_DELIMITER_REGEX);
        let args_separator = fragment_or(args_separator, DEFAULT_ARGS_SEPARATOR_REGEX);

        let placeholder_regex = Regex::new(&format!(
            r"(\s*{opening}\s*{PLACEHOLDER_PREFIX_REGEX}(.+)\s*{closing}\s*)"
        ))
        .map_err(Error::InvalidDelimiter)?;
        let args_regex =
            Regex::new(&format!(r"((.*)\s*{args_opening}(.+)\s*{args_closing}\s*)"))
                .map_err(Error::InvalidDelimiter)?;
        let args_splitter = Regex::new(&args_separator).map_err(Error::InvalidDelimiter)?;

        Ok(PlaceholderEvaluator {
            placeholder_regex,
            args_regex,
            args_splitter,
        })
    }

    /// Isolates a placeholder token from a control text, if one is present.
    ///
    /// Stage one finds the delimited keyword region; stage two, applied only
    /// to that region, splits off an argument list if there is one.
    fn parse_placeholder(&self, text: &str) -> Option<PlaceholderToken> {
        let caps = self.placeholder_regex.captures(text)?;
        let matched = caps[1].to_string();
        let content = caps[2].trim();

        let (keyword, args) = match self.args_regex.captures(content) {
            Some(arg_caps) => (
                arg_caps[2].trim().to_string(),
                self.args_splitter
                    .split(&arg_caps[3])
                    .map(str::to_string)
                    .collect(),
            ),
            None => (content.to_string(), Vec::new()),
        };

        Some(PlaceholderToken {
            matched,
            keyword,
            args,
        })
    }

    /// Re-evaluates a (control text, test text) pair.
    ///
    /// Returns the tentative outcome unchanged when no placeholder is found
    /// or its keyword has no registered handler. A registered placeholder
    /// that does not exclusively occupy the control text is a fatal
    /// configuration error.
    fn compare_text(
        &self,
        control_text: &str,
        test_text: Option<&str>,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult> {
        if let Some(token) = self.parse_placeholder(control_text) {
            if let Some(handler) = registry::lookup(&token.keyword) {
                if token.matched.trim() != control_text.trim() {
                    return Err(Error::MalformedPlaceholder {
                        keyword: token.keyword,
                        text: control_text.to_string(),
                    });
                }
                return Ok(handler.evaluate(test_text, &token.args));
            }
        }

        // no placeholder at all, or unknown keyword
        Ok(outcome)
    }

    /// Compares qualified-name values (e.g. xsi:type attributes).
    ///
    /// Only the local names are re-evaluated, and only when both names live
    /// in the same namespace; differing namespaces never match.
    fn compare_qnames(
        &self,
        control: &QName,
        test: &QName,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult> {
        if control.namespace_uri == test.namespace_uri {
            self.compare_text(&control.local_name, Some(&test.local_name), outcome)
        } else {
            Ok(outcome)
        }
    }

    fn evaluate_missing_text_node(
        &self,
        comparison: &Comparison,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult> {
        let value = if control_has_one_text_child_and_test_has_none(comparison) {
            comparison.control.target.as_ref().and_then(first_child_text)
        } else {
            comparison.control.target.as_ref().and_then(node_text)
        };
        match value {
            Some(v) => self.compare_text(&v, None, outcome),
            None => Ok(outcome),
        }
    }

    fn evaluate_missing_attribute(
        &self,
        comparison: &Comparison,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult> {
        if comparison.comparison_type == ComparisonType::ElementNumAttributes {
            return self.evaluate_attribute_list_length(comparison, outcome);
        }

        // control has a named attribute the test element lacks
        let control_value = match (&comparison.control.target, &comparison.control.value) {
            (Some(target), Some(Value::Name(name))) => attributes_of(target)
                .into_iter()
                .find(|(attr_name, _)| attr_name == name)
                .map(|(_, value)| value),
            _ => None,
        };
        match control_value {
            Some(v) => self.compare_text(&v, None, outcome),
            None => Ok(outcome),
        }
    }

    /// Handles a raw "attribute count differs" comparison.
    ///
    /// Every control attribute missing by name from the test element must be
    /// absorbed by a placeholder; the first one that is not keeps the whole
    /// comparison at the tentative outcome. Leftover test attributes the
    /// control side never mentioned also keep it.
    fn evaluate_attribute_list_length(
        &self,
        comparison: &Comparison,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult> {
        let (Some(control_target), Some(test_target)) =
            (&comparison.control.target, &comparison.test.target)
        else {
            return Ok(outcome);
        };
        let control_attrs = attributes_of(control_target);
        let test_attrs = attributes_of(test_target);

        let mut matched = 0;
        for (name, value) in &control_attrs {
            if test_attrs.iter().any(|(test_name, _)| test_name == name) {
                matched += 1;
            } else if self.compare_text(value, None, outcome)? != ComparisonResult::Equal {
                return Ok(outcome);
            }
        }
        if matched != test_attrs.len() {
            // there are unmatched test attributes
            return Ok(outcome);
        }
        Ok(ComparisonResult::Equal)
    }
}

impl DifferenceEvaluator for PlaceholderEvaluator {
    fn evaluate(
        &self,
        comparison: &Comparison,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult> {
        if outcome == ComparisonResult::Equal {
            return Ok(outcome);
        }

        // comparing textual content of elements
        if comparison.comparison_type == ComparisonType::TextValue {
            if let (Some(Value::Text(control)), Some(Value::Text(test))) =
                (&comparison.control.value, &comparison.test.value)
            {
                return self.compare_text(control, Some(test), outcome);
            }

        // test document has no text-like child node but control has
        } else if is_missing_text_node_difference(comparison) {
            return self.evaluate_missing_text_node(comparison, outcome);

        // may be comparing text to CDATA
        } else if is_text_cdata_mismatch(comparison) {
            let control = comparison.control.target.as_ref().and_then(node_text);
            let test = comparison.test.target.as_ref().and_then(node_text);
            if let (Some(control), Some(test)) = (control, test) {
                return self.compare_text(&control, Some(&test), outcome);
            }

        // comparing textual or qualified-name content of attributes
        } else if comparison.comparison_type == ComparisonType::AttrValue {
            match (&comparison.control.value, &comparison.test.value) {
                (Some(Value::Text(control)), Some(Value::Text(test))) => {
                    return self.compare_text(control, Some(test), outcome);
                }
                (Some(Value::Name(control)), Some(Value::Name(test))) => {
                    return self.compare_qnames(control, test, outcome);
                }
                _ => {}
            }

        // test document has no attribute but control document has
        } else if is_missing_attribute_difference(comparison) {
            return self.evaluate_missing_attribute(comparison, outcome);
        }

        // default, don't apply any placeholders at all
        Ok(outcome)
    }
}

fn is_missing_text_node_difference(comparison: &Comparison) -> bool {
    control_has_one_text_child_and_test_has_none(comparison)
        || cant_find_control_text_child_in_test(comparison)
}

fn control_has_one_text_child_and_test_has_none(comparison: &Comparison) -> bool {
    comparison.comparison_type == ComparisonType::ChildNodelistLength
        && comparison.control.value == Some(Value::Count(1))
        && comparison.test.value == Some(Value::Count(0))
        && comparison.control.target.as_ref().is_some_and(|target| {
            let borrowed = target.borrow();
            borrowed.child(0).is_some_and(|c| c.borrow().is_text_like())
        })
}

fn cant_find_control_text_child_in_test(comparison: &Comparison) -> bool {
    comparison.comparison_type == ComparisonType::ChildLookup
        && comparison
            .control
            .target
            .as_ref()
            .is_some_and(|target| target.borrow().is_text_like())
}

fn is_text_cdata_mismatch(comparison: &Comparison) -> bool {
    comparison.comparison_type == ComparisonType::NodeType
        && comparison
            .control
            .target
            .as_ref()
            .is_some_and(|t| t.borrow().is_text_like())
        && comparison
            .test
            .target
            .as_ref()
            .is_some_and(|t| t.borrow().is_text_like())
}

fn is_missing_attribute_difference(comparison: &Comparison) -> bool {
    comparison.comparison_type == ComparisonType::ElementNumAttributes
        || (comparison.comparison_type == ComparisonType::AttrNameLookup
            && comparison.control.target.is_some()
            && comparison.control.value.is_some())
}

/// The character value of a text-like node.
fn node_text(node: &NodeRef) -> Option<String> {
    node.borrow().content().text_value().map(str::to_string)
}

/// The character value of a node's first child, if it is text-like.
fn first_child_text(node: &NodeRef) -> Option<String> {
    let borrowed = node.borrow();
    let child = borrowed.child(0)?;
    let child_borrowed = child.borrow();
    child_borrowed.content().text_value().map(str::to_string)
}

fn fragment_or(fragment: Option<&str>, default: &str) -> String {
    match fragment {
        Some(f) if !f.trim().is_empty() => f.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Detail;
    use crate::diff::ComparisonResult::{Different, Equal, Similar};

    fn text_comparison(control: &str, test: &str) -> Comparison {
        Comparison::new(
            ComparisonType::TextValue,
            Detail::of_value(Value::Text(control.to_string())),
            Detail::of_value(Value::Text(test.to_string())),
        )
    }

    #[test]
    fn test_equal_outcome_is_a_noop() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("${xmlunit.isNull}", "anything");
        assert_eq!(evaluator.evaluate(&comparison, Equal).unwrap(), Equal);
    }

    #[test]
    fn test_plain_text_passes_through() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("expected", "actual");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Different);
        assert_eq!(evaluator.evaluate(&comparison, Similar).unwrap(), Similar);
    }

    #[test]
    fn test_unknown_keyword_passes_through() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("${xmlunit.noSuchKeyword}", "actual");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Different);
        assert_eq!(evaluator.evaluate(&comparison, Similar).unwrap(), Similar);
    }

    #[test]
    fn test_unknown_keyword_with_surrounding_text_is_not_an_error() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("pre ${xmlunit.noSuchKeyword} post", "actual");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Different);
    }

    #[test]
    fn test_known_keyword_with_surrounding_text_is_fatal() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("prefix ${xmlunit.isNumber} suffix", "123");
        let err = evaluator.evaluate(&comparison, Different).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedPlaceholder { ref keyword, .. } if keyword == "isNumber"
        ));
    }

    #[test]
    fn test_ignore_downgrades_to_equal() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("${xmlunit.ignore}", "whatever");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Equal);
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("  ${ xmlunit.ignore }  ", "whatever");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Equal);
    }

    #[test]
    fn test_handler_verdict_is_final() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = text_comparison("${xmlunit.isNumber}", "abc");
        assert_eq!(evaluator.evaluate(&comparison, Similar).unwrap(), Different);
        let comparison = text_comparison("${xmlunit.isNumber}", "42");
        assert_eq!(evaluator.evaluate(&comparison, Similar).unwrap(), Equal);
    }

    #[test]
    fn test_parse_placeholder_without_args() {
        let evaluator = PlaceholderEvaluator::new();
        let token = evaluator.parse_placeholder("${xmlunit.isNull}").unwrap();
        assert_eq!(token.keyword, "isNull");
        assert!(token.args.is_empty());
        assert_eq!(token.matched, "${xmlunit.isNull}");
    }

    #[test]
    fn test_parse_placeholder_with_args() {
        let evaluator = PlaceholderEvaluator::new();
        let token = evaluator
            .parse_placeholder("${xmlunit.matchesRegex(a,b,c)}")
            .unwrap();
        assert_eq!(token.keyword, "matchesRegex");
        assert_eq!(token.args, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_placeholder_args_keep_inner_whitespace() {
        let evaluator = PlaceholderEvaluator::new();
        let token = evaluator
            .parse_placeholder("${xmlunit.matchesRegex(a, b)}")
            .unwrap();
        assert_eq!(token.args, vec!["a", " b"]);
    }

    #[test]
    fn test_parse_placeholder_requires_prefix() {
        let evaluator = PlaceholderEvaluator::new();
        assert!(evaluator.parse_placeholder("${ignore}").is_none());
        assert!(evaluator.parse_placeholder("${other.ignore}").is_none());
    }

    #[test]
    fn test_custom_delimiters() {
        let evaluator =
            PlaceholderEvaluator::with_delimiters(Some(r"\[\["), Some(r"\]\]")).unwrap();

        let comparison = text_comparison("[[xmlunit.ignore]]", "whatever");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Equal);

        // the default form is plain literal text now
        let comparison = text_comparison("${xmlunit.ignore}", "whatever");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Different);
    }

    #[test]
    fn test_custom_args_delimiters() {
        let evaluator = PlaceholderEvaluator::with_all_delimiters(
            None,
            None,
            Some(r"\["),
            Some(r"\]"),
            Some(";"),
        )
        .unwrap();
        let token = evaluator
            .parse_placeholder(r"${xmlunit.matchesRegex[\d+;x]}")
            .unwrap();
        assert_eq!(token.keyword, "matchesRegex");
        assert_eq!(token.args, vec![r"\d+", "x"]);
    }

    #[test]
    fn test_blank_fragments_fall_back_to_defaults() {
        let evaluator = PlaceholderEvaluator::with_delimiters(Some("  "), Some("")).unwrap();
        let comparison = text_comparison("${xmlunit.ignore}", "whatever");
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Equal);
    }

    #[test]
    fn test_invalid_delimiter_pattern() {
        assert!(matches!(
            PlaceholderEvaluator::with_delimiters(Some("(unclosed"), None),
            Err(Error::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn test_qname_values_same_namespace() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = Comparison::new(
            ComparisonType::AttrValue,
            Detail::of_value(Value::Name(QName::new("urn:types", "${xmlunit.ignore}"))),
            Detail::of_value(Value::Name(QName::new("urn:types", "anyType"))),
        );
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Equal);
    }

    #[test]
    fn test_qname_values_different_namespace_never_match() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = Comparison::new(
            ComparisonType::AttrValue,
            Detail::of_value(Value::Name(QName::new("urn:control", "${xmlunit.ignore}"))),
            Detail::of_value(Value::Name(QName::new("urn:test", "anyType"))),
        );
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Different);
    }

    #[test]
    fn test_unrelated_comparison_type_passes_through() {
        let evaluator = PlaceholderEvaluator::new();
        let comparison = Comparison::new(
            ComparisonType::ElementTagName,
            Detail::of_value(Value::Text("${xmlunit.ignore}".to_string())),
            Detail::of_value(Value::Text("other".to_string())),
        );
        assert_eq!(evaluator.evaluate(&comparison, Different).unwrap(), Different);
    }
}
