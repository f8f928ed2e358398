//! Structural merger
//!
//! Folds the children of one element instance into the content model of
//! its declaration. Each open element has a [`Frame`]: which declaration
//! it is, which document its local declarations belong to, and the index
//! of the particle the last child matched. The merger never mutates a
//! frame; it returns the advanced one.
//!
//! Sequence rules, for a child matching particle `j` with cursor `c`:
//!
//! - `j == c`: the particle repeats, its `maxOccurs` becomes unbounded
//! - `j > c`: particles strictly between were skipped, their `minOccurs`
//!   becomes 0
//! - `j < c`: the order differs from an earlier instance, the sequence is
//!   promoted to a repeatable choice
//! - no match: a particle is inserted right after the cursor
//!
//! When the element closes, particles after the cursor were not seen in
//! this instance and become optional.

use crate::error::{InferenceError, Result};
use crate::namespaces::QName;
use crate::schema::{ElementId, ModelType, Occurs, Particle, SchemaSet};

use super::options::Occurrence;

/// Merge context of one open element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declaration the instance is merged into
    pub element: ElementId,
    /// Namespace of the document holding this element's local declarations
    pub home: Option<String>,
    /// Particle matched by the previous child, `None` before the first one
    pub cursor: Option<usize>,
}

impl Frame {
    /// Frame for a fresh instance of `element`
    pub fn new(element: ElementId, home: Option<String>) -> Self {
        Self {
            element,
            home,
            cursor: None,
        }
    }

    /// Same frame with a different cursor
    fn advanced(&self, cursor: usize) -> Self {
        Self {
            element: self.element,
            home: self.home.clone(),
            cursor: Some(cursor),
        }
    }
}

/// Result of merging one child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    /// Updated parent frame
    pub parent: Frame,
    /// Frame for the child instance
    pub child: Frame,
    /// The child declaration was created by this merge
    pub created: bool,
}

/// Fold child `name` into the content model of `frame.element`
pub fn merge_child(
    schemas: &mut SchemaSet,
    frame: &Frame,
    name: &QName,
    occurrence: Occurrence,
) -> Result<Merged> {
    check_terms(schemas, frame.element)?;

    let decl = schemas.element(frame.element);
    let len = decl.content.len();
    let cursor = frame.cursor.filter(|c| *c < len);
    let instances = decl.instances;
    let position = decl
        .content
        .particles
        .iter()
        .enumerate()
        .find_map(|(i, p)| {
            p.term
                .element()
                .filter(|id| &schemas.element(*id).name == name)
                .map(|id| (i, id))
        });

    if decl.content.is_choice() {
        return Ok(match position {
            Some((i, child)) => {
                let content = &mut schemas.element_mut(frame.element).content;
                if cursor == Some(i) {
                    content.particles[i].occurs.make_unbounded();
                } else if cursor.is_some() {
                    content.occurs.make_unbounded();
                }
                existing(schemas, frame, i, child)
            }
            None => {
                let occurs = match occurrence {
                    Occurrence::Relaxed => Occurs::zero_or_more(),
                    Occurrence::Restricted => Occurs::once(),
                };
                if cursor.is_some() {
                    schemas.element_mut(frame.element).content.occurs.make_unbounded();
                }
                insert(schemas, frame, name, len, occurs)
            }
        });
    }

    let start = cursor.unwrap_or(0);
    match position {
        Some((j, child)) if Some(j) == cursor => {
            schemas.element_mut(frame.element).content.particles[j]
                .occurs
                .make_unbounded();
            Ok(existing(schemas, frame, j, child))
        }
        Some((j, child)) if j >= start => {
            let skipped = cursor.map_or(0, |c| c + 1)..j;
            let content = &mut schemas.element_mut(frame.element).content;
            for particle in &mut content.particles[skipped] {
                particle.occurs.make_optional();
            }
            Ok(existing(schemas, frame, j, child))
        }
        Some((j, child)) => {
            promote_to_choice(schemas, frame.element);
            Ok(existing(schemas, frame, j, child))
        }
        None => {
            let occurs = match occurrence {
                Occurrence::Relaxed => Occurs::zero_or_more(),
                Occurrence::Restricted if instances == 0 => Occurs::once(),
                Occurrence::Restricted => Occurs::optional(),
            };
            let at = cursor.map_or(0, |c| c + 1);
            Ok(insert(schemas, frame, name, at, occurs))
        }
    }
}

/// Finish the content of one instance of `frame.element`
pub fn close_content(schemas: &mut SchemaSet, frame: &Frame) -> Result<()> {
    check_terms(schemas, frame.element)?;

    let content = &mut schemas.element_mut(frame.element).content;
    let len = content.len();
    let cursor = frame.cursor.filter(|c| *c < len);
    match content.model {
        ModelType::Sequence => {
            let unseen = cursor.map_or(0, |c| c + 1)..len;
            for particle in &mut content.particles[unseen] {
                particle.occurs.make_optional();
            }
        }
        ModelType::Choice => {
            if cursor.is_none() {
                content.occurs.make_optional();
            }
        }
    }
    Ok(())
}

fn check_terms(schemas: &SchemaSet, element: ElementId) -> Result<()> {
    let decl = schemas.element(element);
    match decl.content.unsupported_term() {
        Some(term) => Err(InferenceError::UnsupportedConstruct(format!(
            "{} in the content model of '{}'",
            term.describe(),
            decl.name
        ))
        .into()),
        None => Ok(()),
    }
}

fn promote_to_choice(schemas: &mut SchemaSet, element: ElementId) {
    let decl = schemas.element_mut(element);
    tracing::debug!(element = %decl.name, "promoting sequence to choice");
    decl.content.model = ModelType::Choice;
    decl.content.occurs.make_unbounded();
}

fn existing(schemas: &SchemaSet, frame: &Frame, index: usize, child: ElementId) -> Merged {
    let decl = schemas.element(child);
    let home = if decl.is_global() {
        decl.name.namespace.clone()
    } else {
        frame.home.clone()
    };
    Merged {
        parent: frame.advanced(index),
        child: Frame::new(child, home),
        created: false,
    }
}

fn insert(
    schemas: &mut SchemaSet,
    frame: &Frame,
    name: &QName,
    at: usize,
    occurs: Occurs,
) -> Merged {
    let home = frame.home.as_deref();
    let (child, child_home, created) = if name.is_in(home) {
        let id = schemas.add_local_element(name.clone(), true);
        (id, frame.home.clone(), true)
    } else if name.namespace.is_none() {
        let id = schemas.add_local_element(name.clone(), false);
        (id, frame.home.clone(), true)
    } else {
        let (id, created) = schemas.ensure_global_element(name);
        schemas.add_import(home, name.namespace());
        (id, name.namespace.clone(), created)
    };

    let parent = schemas.element_mut(frame.element);
    tracing::trace!(parent = %parent.name, child = %name, index = at, "new particle");
    parent
        .content
        .particles
        .insert(at, Particle::element(child, occurs));

    Merged {
        parent: frame.advanced(at),
        child: Frame::new(child, child_home),
        created,
    }
}
