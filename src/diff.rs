//! Comparison event model shared with the structural diff engine.
//!
//! The diff engine itself is an external collaborator: it walks two parsed
//! documents, produces one [`Comparison`] per structural check together with
//! a tentative [`ComparisonResult`], and hands both to any installed
//! [`DifferenceEvaluator`] which may revise the outcome.

use crate::error::Result;
use crate::node::{NodeRef, QName};

/// The kind of structural difference a comparison reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    /// Node kinds differ (e.g. text vs CDATA).
    NodeType,
    /// Namespace URIs of two nodes differ.
    NamespaceUri,
    /// Element tag names differ.
    ElementTagName,
    /// Number of attributes on an element differs.
    ElementNumAttributes,
    /// A control attribute has no counterpart by name in the test element.
    AttrNameLookup,
    /// Attribute values differ.
    AttrValue,
    /// Number of children differs.
    ChildNodelistLength,
    /// Order of children differs.
    ChildNodelistSequence,
    /// A control child has no counterpart in the test children.
    ChildLookup,
    /// Character content of two text-like nodes differs.
    TextValue,
}

/// Outcome of a single comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonResult {
    /// The compared items are equal.
    Equal,
    /// The compared items differ in a recoverable way.
    Similar,
    /// The compared items differ.
    Different,
}

/// The value a comparison detail carries; which variant applies depends on
/// the [`ComparisonType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value (text content, attribute value).
    Text(String),
    /// A qualified name (attribute lookups, xsi:type-style attribute values).
    Name(QName),
    /// A count (child list lengths, attribute counts).
    Count(usize),
}

impl Value {
    /// Returns the string value, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the qualified name, if this is a name value.
    pub fn as_name(&self) -> Option<&QName> {
        match self {
            Value::Name(q) => Some(q),
            _ => None,
        }
    }

    /// Returns the count, if this is a count value.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            Value::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// One side of a comparison: an optional node and an associated value.
#[derive(Debug, Clone, Default)]
pub struct Detail {
    /// The tree node this side of the comparison refers to, if any.
    pub target: Option<NodeRef>,
    /// The value being compared, if any.
    pub value: Option<Value>,
}

impl Detail {
    /// Creates a detail with both a target node and a value.
    pub fn new(target: NodeRef, value: Value) -> Self {
        Detail {
            target: Some(target),
            value: Some(value),
        }
    }

    /// Creates a detail with a value but no target node.
    pub fn of_value(value: Value) -> Self {
        Detail {
            target: None,
            value: Some(value),
        }
    }

    /// Creates a detail with a target node but no value.
    pub fn of_target(target: NodeRef) -> Self {
        Detail {
            target: Some(target),
            value: None,
        }
    }

    /// Creates an absent detail (no counterpart on this side).
    pub fn absent() -> Self {
        Detail::default()
    }
}

/// A single structural comparison between a control and a test document.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// What kind of structural check this comparison reports.
    pub comparison_type: ComparisonType,
    /// The control (expected) side.
    pub control: Detail,
    /// The test (actual) side.
    pub test: Detail,
}

impl Comparison {
    /// Creates a new comparison.
    pub fn new(comparison_type: ComparisonType, control: Detail, test: Detail) -> Self {
        Comparison {
            comparison_type,
            control,
            test,
        }
    }
}

/// A pluggable post-processing step in the diff engine's evaluation pipeline.
///
/// The engine computes a tentative outcome for each comparison and passes
/// both through every installed evaluator; the evaluator returns the final
/// outcome, or an error for unrecoverable misuse (which aborts the
/// comparison run rather than being folded into a diff outcome).
pub trait DifferenceEvaluator {
    /// Re-evaluates one comparison given its tentative outcome.
    fn evaluate(
        &self,
        comparison: &Comparison,
        outcome: ComparisonResult,
    ) -> Result<ComparisonResult>;
}
