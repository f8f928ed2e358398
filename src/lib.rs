//! # xmlschema-infer
//!
//! Infers an XML Schema (XSD 1.0) from sample XML documents.
//!
//! Each document is read once, front to back, and merged into a growing
//! [`SchemaSet`]: one schema document per target namespace, with global
//! declarations, content models and simple types refined by every sample.
//!
//! ## Features
//!
//! - Streaming inference over `quick-xml` events
//! - Incremental refinement across any number of documents
//! - Seeding from existing schemas
//! - Type narrowing over the numeric, boolean and temporal builtins
//! - Multi-namespace output with imports between documents
//! - Protection against oversized and deeply nested input
//!
//! ## Example
//!
//! ```rust
//! use xmlschema_infer::{write_document, SchemaInference};
//!
//! let schemas = SchemaInference::new()
//!     .infer_str(r#"<order id="7"><item>3</item><item>4</item></order>"#)
//!     .unwrap();
//!
//! let xsd = write_document(&schemas, None).unwrap();
//! assert!(xsd.contains(r#"<xs:element name="order">"#));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod namespaces;

// Instance reading
pub mod reader;

// Schema model and inference
pub mod inference;
pub mod schema;

// Schema text in and out
pub mod exports;
pub mod parsing;
pub mod writer;

// Reporting
pub mod summary;

// Re-exports for convenience
pub use error::{Error, InferenceError, ParseError, Result};
pub use exports::{export_schemas, ExportConfig, ExportResult};
pub use inference::{InferenceOptions, Occurrence, SchemaInference, TypeInference};
pub use limits::Limits;
pub use namespaces::QName;
pub use parsing::{read_schema, read_schemas};
pub use schema::{ElementId, SchemaDocument, SchemaSet};
pub use summary::SchemaSummary;
pub use writer::{write_document, SchemaWriter};

/// Version of the xmlschema-infer library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = namespaces::XSD_NAMESPACE;

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = namespaces::XSI_NAMESPACE;
