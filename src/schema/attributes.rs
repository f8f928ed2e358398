//! Attribute declarations and uses

use crate::namespaces::QName;

use super::elements::Scope;
use super::types::InferredType;
use super::AttributeId;

/// One attribute declaration in the arena.
///
/// Unqualified attributes are declared locally on their element; qualified
/// ones are global in their namespace's document and shared by every
/// element that carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute name
    pub name: QName,
    /// Global or local
    pub scope: Scope,
    /// Type of the value
    pub value: InferredType,
}

impl AttributeDecl {
    /// New declaration with no observed value
    pub fn new(name: QName, scope: Scope) -> Self {
        Self {
            name,
            scope,
            value: InferredType::new(),
        }
    }

    /// Whether this is a top-level declaration
    pub fn is_global(&self) -> bool {
        self.scope == Scope::Global
    }
}

/// `use` of an attribute on one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeUse {
    /// Declaration handle
    pub attribute: AttributeId,
    /// `use="required"`
    pub required: bool,
}

impl AttributeUse {
    /// Create a use
    pub fn new(attribute: AttributeId, required: bool) -> Self {
        Self {
            attribute,
            required,
        }
    }

    /// `use` attribute text
    pub fn use_text(&self) -> &'static str {
        if self.required {
            "required"
        } else {
            "optional"
        }
    }
}
