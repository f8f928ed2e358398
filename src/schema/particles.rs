//! Particles and content models
//!
//! A complex type's body is a [`ContentModel`]: a sequence or choice of
//! [`Particle`]s, each with its own occurrence bounds.
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#cParticles

use std::fmt;

use crate::error::{ParseError, Result};
use crate::namespaces::QName;

use super::ElementId;

/// `minOccurs`/`maxOccurs` of a particle; `max == None` is unbounded.
///
/// Inference only ever loosens bounds: `min` drops to 0 and `max` grows to
/// unbounded, never the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// `minOccurs`
    pub min: u32,
    /// `maxOccurs`, `None` for unbounded
    pub max: Option<u32>,
}

impl Occurs {
    /// Bounds from explicit values
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Exactly once, the XSD default
    pub fn once() -> Self {
        Self::new(1, Some(1))
    }

    /// At most once
    pub fn optional() -> Self {
        Self::new(0, Some(1))
    }

    /// Any number of times
    pub fn zero_or_more() -> Self {
        Self::new(0, None)
    }

    /// At least once
    pub fn one_or_more() -> Self {
        Self::new(1, None)
    }

    /// `minOccurs` is 0
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// `maxOccurs` is unbounded
    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Some instance omitted the particle
    pub fn make_optional(&mut self) {
        self.min = 0;
    }

    /// Some instance repeated the particle
    pub fn make_unbounded(&mut self) {
        self.max = None;
    }

    /// `maxOccurs` attribute text
    pub fn max_text(&self) -> String {
        self.max
            .map_or_else(|| "unbounded".to_string(), |max| max.to_string())
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// Read `minOccurs`/`maxOccurs` attribute values; absent ones default to 1
pub fn parse_occurs(min_occurs: Option<&str>, max_occurs: Option<&str>) -> Result<Occurs> {
    let min = match min_occurs {
        Some(text) => occurs_value(text, "minOccurs")?,
        None => 1,
    };
    let max = match max_occurs.map(str::trim) {
        Some("unbounded") => None,
        Some(text) => Some(occurs_value(text, "maxOccurs")?),
        None => Some(1),
    };

    match max {
        Some(max) if max < min => Err(ParseError::new(format!(
            "minOccurs {} is greater than maxOccurs {}",
            min, max
        ))
        .into()),
        _ => Ok(Occurs::new(min, max)),
    }
}

fn occurs_value(text: &str, attribute: &str) -> Result<u32> {
    text.trim().parse::<u32>().map_err(|_| {
        ParseError::new(format!(
            "{} '{}' is not a non-negative integer",
            attribute, text
        ))
        .into()
    })
}

/// Model group compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// Ordered children
    #[default]
    Sequence,
    /// Any one child per repetition
    Choice,
}

impl ModelType {
    /// Parse from an XSD tag local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(ModelType::Sequence),
            "choice" => Some(ModelType::Choice),
            _ => None,
        }
    }

    /// XSD tag local name
    pub fn tag(self) -> &'static str {
        match self {
            ModelType::Sequence => "sequence",
            ModelType::Choice => "choice",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// What a particle stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// An element declaration; a global one is written as a `ref`
    Element(ElementId),
    /// `xs:any` from a seed schema
    Wildcard,
    /// `xs:group ref=` from a seed schema
    GroupRef(QName),
    /// A nested sequence or choice from a seed schema
    Group(Box<ContentModel>),
}

impl Term {
    /// Element handle, if this is an element particle
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Term::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Term::Element(_) => "element".to_string(),
            Term::Wildcard => "any wildcard".to_string(),
            Term::GroupRef(name) => format!("group reference '{}'", name),
            Term::Group(group) => format!("nested {}", group.model),
        }
    }
}

/// One entry of a content model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Particle {
    /// Referenced term
    pub term: Term,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl Particle {
    /// Element particle
    pub fn element(id: ElementId, occurs: Occurs) -> Self {
        Self {
            term: Term::Element(id),
            occurs,
        }
    }
}

/// Body of a complex type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentModel {
    /// Sequence or choice
    pub model: ModelType,
    /// Bounds of the group itself
    pub occurs: Occurs,
    /// Particles in document order
    pub particles: Vec<Particle>,
}

impl ContentModel {
    /// Empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there are no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the group is a choice
    pub fn is_choice(&self) -> bool {
        self.model == ModelType::Choice
    }

    /// Element handles of every element particle
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.particles.iter().filter_map(|p| p.term.element())
    }

    /// First particle that is not a plain element, if any
    pub fn unsupported_term(&self) -> Option<&Term> {
        self.particles
            .iter()
            .map(|p| &p.term)
            .find(|t| t.element().is_none())
    }
}
