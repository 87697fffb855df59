//! Error types for placeholder-aware XML comparison.

use thiserror::Error;

/// Result type alias for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing documents or evaluating placeholders.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// A recognized placeholder is mixed with other literal content.
    ///
    /// A placeholder must exclusively occupy the text node or attribute
    /// value it appears in. This is a fixture-authoring bug, not a
    /// comparison mismatch.
    #[error("placeholder `{keyword}` must exclusively occupy the text, found: `{text}`")]
    MalformedPlaceholder {
        /// The recognized placeholder keyword.
        keyword: String,
        /// The full text the placeholder was embedded in.
        text: String,
    },

    /// A caller-supplied delimiter fragment is not a valid regular expression.
    #[error("invalid delimiter pattern: {0}")]
    InvalidDelimiter(#[from] regex::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}
