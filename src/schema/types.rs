//! Inferred simple types
//!
//! Every leaf declaration (text-bearing element or attribute) owns an
//! [`InferredType`]: the candidate set left after all its observations.

use crate::inference::lattice::{Primitive, TypeCandidate};
use crate::inference::narrowing::TypeNarrower;

/// Accumulated type knowledge for one declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InferredType {
    candidates: Option<TypeCandidate>,
    observations: u32,
}

impl InferredType {
    /// Nothing observed yet
    pub fn new() -> Self {
        Self::default()
    }

    /// A declaration already typed as `primitive`, history unknown
    pub fn seeded(primitive: Primitive) -> Self {
        Self {
            candidates: Some(primitive.widening()),
            observations: 1,
        }
    }

    /// Fold one more value in
    pub fn observe(&mut self, value: &str, narrower: &TypeNarrower) {
        self.candidates = Some(narrower.observe(self.candidates, value));
        self.observations += 1;
    }

    /// Whether any value has been observed
    pub fn is_typed(&self) -> bool {
        self.candidates.is_some()
    }

    /// Current candidate set
    pub fn candidates(&self) -> Option<TypeCandidate> {
        self.candidates
    }

    /// Number of values folded in
    pub fn observations(&self) -> u32 {
        self.observations
    }

    /// The inferred type; `string` when nothing was observed
    pub fn resolve(&self) -> Primitive {
        self.candidates
            .map(TypeCandidate::resolve)
            .unwrap_or(Primitive::String)
    }
}
