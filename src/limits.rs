//! Resource limits for sample documents
//!
//! Inference walks untrusted input, so the size of a sample, its nesting
//! depth, the attributes per start tag and the number of declarations a
//! schema set may grow to are all capped. Exceeding one aborts the
//! inference call with [`Error::LimitExceeded`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Caps applied while merging one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest sample accepted, in bytes
    pub max_document_size: usize,

    /// Deepest element nesting; the root is at depth 1
    pub max_depth: usize,

    /// Most attributes on a single start tag, namespace declarations included
    pub max_attributes: usize,

    /// Most element plus attribute declarations a schema set may hold
    pub max_declarations: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_size: 100 * 1024 * 1024, // 100 MB
            max_depth: 1000,
            max_attributes: 1000,
            max_declarations: 100_000,
        }
    }
}

impl Limits {
    /// Default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight limits for samples from unknown sources
    pub fn strict() -> Self {
        Self {
            max_document_size: 10 * 1024 * 1024, // 10 MB
            max_depth: 100,
            max_attributes: 100,
            max_declarations: 10_000,
        }
    }

    /// Loose limits for large trusted corpora
    pub fn permissive() -> Self {
        Self {
            max_document_size: 1024 * 1024 * 1024, // 1 GB
            max_depth: 10_000,
            max_attributes: 10_000,
            max_declarations: 10_000_000,
        }
    }

    /// Sample size in bytes
    pub fn check_document_size(&self, size: usize) -> Result<()> {
        check("document size in bytes", size, self.max_document_size)
    }

    /// Nesting depth of an element about to be opened
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        check("element depth", depth, self.max_depth)
    }

    /// Attribute count of one start tag
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        check("attributes on one element", count, self.max_attributes)
    }

    /// Declarations held by the schema set
    pub fn check_declarations(&self, count: usize) -> Result<()> {
        check("schema declarations", count, self.max_declarations)
    }
}

fn check(what: &str, value: usize, max: usize) -> Result<()> {
    if value > max {
        return Err(Error::LimitExceeded(format!(
            "{} {} exceeds maximum {}",
            what, value, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_ordered() {
        let strict = Limits::strict();
        let default = Limits::default();
        let permissive = Limits::permissive();
        assert!(strict.max_depth < default.max_depth);
        assert!(default.max_depth < permissive.max_depth);
        assert!(strict.max_declarations < permissive.max_declarations);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let limits = Limits::strict();
        assert!(limits.check_depth(100).is_ok());
        assert!(limits.check_depth(101).is_err());
        assert!(limits.check_attributes(100).is_ok());
        assert!(limits.check_declarations(10_001).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = Limits::default()
            .check_document_size(200 * 1024 * 1024)
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
        assert!(err.to_string().contains("document size"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"max_depth": 5}"#).unwrap();
        assert_eq!(limits.max_depth, 5);
        assert_eq!(limits.max_attributes, Limits::default().max_attributes);
    }
}
