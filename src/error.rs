//! Error types for xmlschema-infer
//!
//! Every failure is fatal for the inference call that raised it. The
//! [`InferenceError`] enum is the taxonomy callers match on; the outer
//! [`Error`] adds the plumbing failures (I/O, XML syntax, seed schemas).

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmlschema-infer operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema inference aborted
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Seed schema could not be read
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Namespace error (unknown prefix in an instance)
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML reading or writing error
    #[error("XML error: {0}")]
    Xml(String),
}

impl Error {
    /// The inference failure class, if this error is one
    pub fn inference(&self) -> Option<&InferenceError> {
        match self {
            Error::Inference(e) => Some(e),
            _ => None,
        }
    }
}

/// Fatal inference failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// A type name or candidate set falls outside the primitive lattice
    #[error("malformed type lattice: {0}")]
    MalformedLattice(String),

    /// The schema namespace, or an unrecognized `xsi:*` attribute, appeared in an instance
    #[error("namespace '{namespace}' is not allowed here: {detail}")]
    DisallowedNamespace {
        /// Offending namespace URI
        namespace: String,
        /// Name of the offending node
        detail: String,
    },

    /// Entity references, or a seed content model the merger cannot extend
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// The event source contained no element
    #[error("the document has no root element")]
    NoRoot,
}

/// A seed schema that could not be read.
///
/// `location` is the `row:col` of the offending node; `document` is the
/// position of the schema text among those passed to
/// [`read_schemas`](crate::parsing::read_schemas).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What is wrong
    pub message: String,
    /// `row:col` in the schema text
    pub location: Option<String>,
    /// Index of the schema text in a multi-document read
    pub document: Option<usize>,
}

impl ParseError {
    /// Error without position information
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            document: None,
        }
    }

    /// Attach a `row:col` position
    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..self
        }
    }

    /// Attach the schema text index, keeping one set earlier
    pub fn in_document(self, index: usize) -> Self {
        Self {
            document: self.document.or(Some(index)),
            ..self
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.document {
            write!(f, "schema #{}: ", index + 1)?;
        }
        f.write_str(&self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
