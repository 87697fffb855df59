//! Placeholder-aware difference evaluation for XML comparison.
//!
//! This library extends structural XML diffing with a placeholder
//! mini-language: control documents may embed tokens like
//! `${xmlunit.ignore}`, `${xmlunit.isNull}` or
//! `${xmlunit.matchesRegex(pattern)}` inside text nodes and attribute
//! values, so a diff tolerates expected variability in test fixtures.
//!
//! # Overview
//!
//! A structural diff engine walks a control and a test document, produces
//! one [`Comparison`] per check together with a tentative
//! [`ComparisonResult`], and passes both through any installed
//! [`DifferenceEvaluator`]. The [`PlaceholderEvaluator`] is such an
//! evaluator: when the control side's text is a placeholder token whose
//! keyword has a registered [`PlaceholderHandler`], the handler's verdict
//! replaces the tentative outcome.
//!
//! ```
//! use xml_placeholders::{
//!     Comparison, ComparisonResult, ComparisonType, Detail, DifferenceEvaluator,
//!     PlaceholderEvaluator, Value,
//! };
//!
//! let evaluator = PlaceholderEvaluator::new();
//! let comparison = Comparison::new(
//!     ComparisonType::TextValue,
//!     Detail::of_value(Value::Text("${xmlunit.ignore}".to_string())),
//!     Detail::of_value(Value::Text("anything at all".to_string())),
//! );
//! let outcome = evaluator
//!     .evaluate(&comparison, ComparisonResult::Different)
//!     .unwrap();
//! assert_eq!(outcome, ComparisonResult::Equal);
//! ```

pub mod diff;
pub mod error;
pub mod node;
pub mod placeholder;
pub mod util;
pub mod xml;

// Re-export commonly used types
pub use diff::{
    Comparison, ComparisonResult, ComparisonType, Detail, DifferenceEvaluator, Value,
};
pub use error::{Error, Result};
pub use node::{new_node, Attribute, NodeInner, NodeRef, QName, XmlContent, XmlElement};
pub use placeholder::{PlaceholderEvaluator, PlaceholderHandler};
pub use xml::{parse_file, parse_str, print_to_string, XmlParser};
