//! Schema export utilities
//!
//! Writes every document of a [`SchemaSet`] into a directory, one file per
//! target namespace, with the `schemaLocation` of each import pointing at
//! the file written for that namespace. The `xml:` namespace is never
//! written; imports of it point at the W3C copy.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::namespaces::XML_NAMESPACE;
use crate::schema::{SchemaDocument, SchemaSet};
use crate::writer::SchemaWriter;

/// Configuration for schema export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Target directory for export
    pub target_dir: PathBuf,
    /// File name stem; documents are written as `<stem>0.xsd`, `<stem>1.xsd`, ...
    pub file_stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            file_stem: "schema".to_string(),
        }
    }
}

impl ExportConfig {
    /// Create a new export configuration
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            ..Default::default()
        }
    }

    /// Set the file name stem
    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    fn file_name(&self, index: usize) -> String {
        format!("{}{}.xsd", self.file_stem, index)
    }
}

/// One written document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSchema {
    /// Target namespace of the document
    pub namespace: Option<String>,
    /// Path of the written file
    pub path: PathBuf,
}

/// Result of a schema export operation
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Written documents in document order
    pub exported: Vec<ExportedSchema>,
}

impl ExportResult {
    /// Get the number of exported files
    pub fn file_count(&self) -> usize {
        self.exported.len()
    }

    /// Path written for `namespace`
    pub fn path_for(&self, namespace: Option<&str>) -> Option<&Path> {
        self.exported
            .iter()
            .find(|e| e.namespace.as_deref() == namespace)
            .map(|e| e.path.as_path())
    }
}

/// Export every document of `schemas` as configured
pub fn export_schemas(schemas: &SchemaSet, config: &ExportConfig) -> Result<ExportResult> {
    let target_dir = &config.target_dir;
    std::fs::create_dir_all(target_dir).map_err(|e| io_error(e, "create", target_dir))?;

    let documents: Vec<&SchemaDocument> = schemas
        .documents()
        .filter(|d| d.target_namespace() != Some(XML_NAMESPACE))
        .collect();

    let mut writer = SchemaWriter::new(schemas);
    for (index, document) in documents.iter().enumerate() {
        writer = writer.with_location(document.target_namespace(), config.file_name(index));
    }

    let mut result = ExportResult::default();
    for (index, document) in documents.into_iter().enumerate() {
        let text = writer.write(document)?;
        let target_path = target_dir.join(config.file_name(index));
        std::fs::write(&target_path, text).map_err(|e| io_error(e, "write", &target_path))?;
        tracing::debug!(path = %target_path.display(), "exported schema document");

        result.exported.push(ExportedSchema {
            namespace: document.target_namespace().map(str::to_string),
            path: target_path,
        });
    }
    Ok(result)
}

fn io_error(err: std::io::Error, action: &str, path: &Path) -> Error {
    Error::Io(std::io::Error::new(
        err.kind(),
        format!("failed to {} '{}': {}", action, path.display(), err),
    ))
}
