//! Schema inference
//!
//! [`SchemaInference`] merges sample documents into a [`SchemaSet`]. Every
//! call refines the same set: occurrence bounds only loosen, and type
//! candidates only narrow toward `string`, so samples can be fed one at a
//! time in any number of calls.
//!
//! ```
//! use xmlschema_infer::inference::SchemaInference;
//! use xmlschema_infer::schema::{Occurs, SchemaSet};
//! use xmlschema_infer::namespaces::QName;
//!
//! let inference = SchemaInference::new();
//! let mut schemas = SchemaSet::new();
//! inference.infer_str_into("<r><a>1</a></r>", &mut schemas).unwrap();
//! inference.infer_str_into("<r><a>2</a><a>3</a></r>", &mut schemas).unwrap();
//!
//! let root = schemas.global_element(None, "r").unwrap();
//! let a = schemas.child_particle(root, &QName::local("a")).unwrap();
//! assert_eq!(a.occurs, Occurs::one_or_more());
//! ```

pub mod attributes;
pub mod classifier;
pub mod content;
mod driver;
pub mod lattice;
pub mod narrowing;
pub mod options;

pub use lattice::{Primitive, TypeCandidate};
pub use narrowing::TypeNarrower;
pub use options::{InferenceOptions, Occurrence, TypeInference};

use crate::error::Result;
use crate::limits::Limits;
use crate::reader::{EventSource, XmlEventReader};
use crate::schema::{ElementId, SchemaSet};

use driver::Driver;

/// Infers XML schemas from instance documents
#[derive(Debug, Clone, Default)]
pub struct SchemaInference {
    options: InferenceOptions,
}

impl SchemaInference {
    /// Inference with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Inference with the given options
    pub fn with_options(options: InferenceOptions) -> Self {
        Self { options }
    }

    /// Set the occurrence mode
    pub fn with_occurrence(mut self, occurrence: Occurrence) -> Self {
        self.options.occurrence = occurrence;
        self
    }

    /// Set the type inference mode
    pub fn with_type_inference(mut self, type_inference: TypeInference) -> Self {
        self.options.type_inference = type_inference;
        self
    }

    /// Set the resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Current options
    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    /// Infer a new schema set from one document
    pub fn infer_str(&self, xml: &str) -> Result<SchemaSet> {
        let mut schemas = SchemaSet::new();
        self.infer_str_into(xml, &mut schemas)?;
        Ok(schemas)
    }

    /// Refine `schemas` with one more document
    pub fn infer_str_into(&self, xml: &str, schemas: &mut SchemaSet) -> Result<ElementId> {
        self.options.limits.check_document_size(xml.len())?;
        self.infer(XmlEventReader::from_str(xml), schemas)
    }

    /// Refine `schemas` with the document `source` produces.
    ///
    /// Returns the root declaration. On error `schemas` is left exactly as
    /// it was.
    pub fn infer<S: EventSource>(&self, mut source: S, schemas: &mut SchemaSet) -> Result<ElementId> {
        let mut working = schemas.clone();
        let root = Driver::new(&self.options).run(&mut source, &mut working)?;
        *schemas = working;
        Ok(root)
    }
}
