//! Element declarations

use crate::inference::lattice::Primitive;
use crate::namespaces::QName;

use super::attributes::AttributeUse;
use super::particles::ContentModel;
use super::types::InferredType;
use super::AttributeId;

/// Where a declaration lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top-level declaration of its namespace's document
    Global,
    /// Declared inside a parent's content model
    Local {
        /// Instances carry the parent document's namespace
        qualified: bool,
    },
}

/// Monotone observations about an element's content.
///
/// Each flag only ever goes from false to true; the final content shape is
/// derived from their combination, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentFlags {
    /// Some instance held text and no child elements
    pub text: bool,
    /// Some instance held child elements
    pub children: bool,
    /// Some instance interleaved text with child elements
    pub mixed: bool,
    /// Some instance held nothing at all
    pub empty: bool,
}

/// Shape a declaration's type takes in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// No text, no children (`anyType` or attributes only)
    Empty,
    /// Text only: a simple type, or simple content when attributes exist
    Simple,
    /// Child elements only
    ElementOnly,
    /// Child elements and text
    Mixed,
}

impl ContentShape {
    /// Lowercase name used in summaries
    pub fn as_str(self) -> &'static str {
        match self {
            ContentShape::Empty => "empty",
            ContentShape::Simple => "simple",
            ContentShape::ElementOnly => "element-only",
            ContentShape::Mixed => "mixed",
        }
    }
}

/// One element declaration in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    /// Element name as it appears in instances
    pub name: QName,
    /// Global or local
    pub scope: Scope,
    /// `nillable="true"`
    pub nillable: bool,
    /// Child particles
    pub content: ContentModel,
    /// Attribute uses in first-seen order
    pub attributes: Vec<AttributeUse>,
    /// Type of the text content
    pub value: InferredType,
    /// Content observations
    pub flags: ContentFlags,
    /// Instances merged so far (seeded declarations start at 1)
    pub instances: u32,
}

impl ElementDecl {
    /// A declaration that has not seen any instance yet
    pub fn new(name: QName, scope: Scope) -> Self {
        Self {
            name,
            scope,
            nillable: false,
            content: ContentModel::new(),
            attributes: Vec::new(),
            value: InferredType::new(),
            flags: ContentFlags::default(),
            instances: 0,
        }
    }

    /// Whether this is a top-level declaration
    pub fn is_global(&self) -> bool {
        self.scope == Scope::Global
    }

    /// Local declaration written with `form="unqualified"`
    pub fn is_unqualified_local(&self) -> bool {
        self.scope == Scope::Local { qualified: false }
    }

    /// Whether any instance has had child elements
    pub fn has_children(&self) -> bool {
        self.flags.children || !self.content.is_empty()
    }

    /// Content shape derived from the observation flags
    pub fn shape(&self) -> ContentShape {
        if self.has_children() {
            if self.flags.mixed || self.flags.text {
                ContentShape::Mixed
            } else {
                ContentShape::ElementOnly
            }
        } else if self.flags.text {
            ContentShape::Simple
        } else {
            ContentShape::Empty
        }
    }

    /// Type of the text content, for simple shapes only.
    ///
    /// An element seen both empty and with text must accept the empty
    /// string, which only `string` does.
    pub fn simple_type(&self) -> Option<Primitive> {
        if self.shape() != ContentShape::Simple {
            return None;
        }
        if self.flags.empty {
            Some(Primitive::String)
        } else {
            Some(self.value.resolve())
        }
    }

    /// Attribute use for `attribute`, if declared
    pub fn attribute_use(&self, attribute: AttributeId) -> Option<&AttributeUse> {
        self.attributes.iter().find(|u| u.attribute == attribute)
    }
}
