//! Streaming driver
//!
//! One forward pass over the event source. Skips everything up to the
//! first start tag, then keeps one [`OpenElement`] per open tag: the merge
//! frame plus what was seen inside the instance so far. Content is only
//! judged when the element closes, so text before, between or after
//! children is treated alike.

use crate::error::{Error, InferenceError, Result};
use crate::namespaces::XSD_NAMESPACE;
use crate::reader::{EventSource, StartElement, XmlEvent};
use crate::schema::{ElementId, SchemaSet};

use super::attributes::merge_attributes;
use super::content::{close_content, merge_child, Frame};
use super::narrowing::TypeNarrower;
use super::options::InferenceOptions;

#[derive(Debug)]
struct OpenElement {
    frame: Frame,
    text: String,
    has_children: bool,
    nil: bool,
}

pub(crate) struct Driver<'o> {
    options: &'o InferenceOptions,
    narrower: TypeNarrower,
}

impl<'o> Driver<'o> {
    pub(crate) fn new(options: &'o InferenceOptions) -> Self {
        Self {
            options,
            narrower: TypeNarrower::new(options.type_inference),
        }
    }

    /// Merge one document into `schemas`; returns the root declaration
    pub(crate) fn run<S: EventSource>(
        &self,
        source: &mut S,
        schemas: &mut SchemaSet,
    ) -> Result<ElementId> {
        let root = seek_root(source)?;
        check_element(&root)?;
        tracing::debug!(root = %root.name, "inferring schema");

        let (id, _) = schemas.ensure_global_element(&root.name);
        let frame = Frame::new(id, root.name.namespace.clone());
        let mut stack = Vec::new();
        if let Some(open) = self.open(schemas, frame, &root, 1)? {
            stack.push(open);
        }

        while let Some(top) = stack.last_mut() {
            let event = source.next_event()?.ok_or_else(|| {
                Error::Xml(format!(
                    "unexpected end of document inside '{}'",
                    schemas.element(top.frame.element).name
                ))
            })?;

            match event {
                XmlEvent::Start(start) => {
                    check_element(&start)?;
                    top.has_children = true;
                    let merged = merge_child(
                        schemas,
                        &top.frame,
                        &start.name,
                        self.options.occurrence,
                    )?;
                    top.frame = merged.parent;
                    let depth = stack.len() + 1;
                    if let Some(child) = self.open(schemas, merged.child, &start, depth)? {
                        stack.push(child);
                    }
                }
                XmlEvent::Text(text) => top.text.push_str(&text),
                XmlEvent::End => {
                    if let Some(open) = stack.pop() {
                        self.close(schemas, open)?;
                    }
                }
            }
        }

        tracing::debug!(
            documents = schemas.document_count(),
            elements = schemas.element_count(),
            "inference finished"
        );
        Ok(id)
    }

    /// Start an instance; self-closing elements are closed right away
    fn open(
        &self,
        schemas: &mut SchemaSet,
        frame: Frame,
        start: &StartElement,
        depth: usize,
    ) -> Result<Option<OpenElement>> {
        self.options.limits.check_depth(depth)?;
        self.options.limits.check_attributes(start.attributes.len())?;

        let nil = merge_attributes(
            schemas,
            &frame,
            &start.attributes,
            self.options.occurrence,
            &self.narrower,
        )?;
        self.options
            .limits
            .check_declarations(schemas.element_count() + schemas.attribute_count())?;
        let open = OpenElement {
            frame,
            text: String::new(),
            has_children: false,
            nil,
        };
        if start.is_empty {
            self.close(schemas, open)?;
            Ok(None)
        } else {
            Ok(Some(open))
        }
    }

    fn close(&self, schemas: &mut SchemaSet, open: OpenElement) -> Result<()> {
        close_content(schemas, &open.frame)?;

        let text = open.text.trim();
        let decl = schemas.element_mut(open.frame.element);
        if open.has_children {
            decl.flags.children = true;
            if !text.is_empty() {
                decl.flags.mixed = true;
            }
        } else if !text.is_empty() {
            decl.flags.text = true;
            decl.value.observe(text, &self.narrower);
        } else if !open.nil {
            decl.flags.empty = true;
        }
        decl.instances += 1;
        Ok(())
    }
}

fn seek_root<S: EventSource>(source: &mut S) -> Result<StartElement> {
    loop {
        match source.next_event()? {
            Some(XmlEvent::Start(start)) => return Ok(start),
            Some(_) => continue,
            None => return Err(InferenceError::NoRoot.into()),
        }
    }
}

fn check_element(start: &StartElement) -> Result<()> {
    if start.name.is_in(Some(XSD_NAMESPACE)) {
        return Err(InferenceError::DisallowedNamespace {
            namespace: XSD_NAMESPACE.to_string(),
            detail: format!("element '{}'", start.name.local_name),
        }
        .into());
    }
    Ok(())
}
