//! Placeholder recognition and re-evaluation.
//!
//! Control documents may embed placeholder tokens such as
//! `${xmlunit.ignore}`, `${xmlunit.isNull}` or
//! `${xmlunit.matchesRegex(pattern)}` inside text nodes and attribute
//! values. Installed as a [`crate::diff::DifferenceEvaluator`], the
//! [`PlaceholderEvaluator`] recognizes such tokens and lets the registered
//! keyword handler decide the comparison outcome, so structural diffs can
//! tolerate expected variability in test fixtures.

mod evaluator;
mod handlers;
mod registry;

pub use evaluator::{
    PlaceholderEvaluator, DEFAULT_ARGS_CLOSING_DELIMITER_REGEX,
    DEFAULT_ARGS_OPENING_DELIMITER_REGEX, DEFAULT_ARGS_SEPARATOR_REGEX,
    DEFAULT_CLOSING_DELIMITER_REGEX, DEFAULT_OPENING_DELIMITER_REGEX,
};
pub use handlers::{
    IgnorePlaceholderHandler, IsDateTimePlaceholderHandler, IsNullPlaceholderHandler,
    IsNumberPlaceholderHandler, MatchesRegexPlaceholderHandler, PlaceholderHandler,
};
