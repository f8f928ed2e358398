//! Forward-only XML event source
//!
//! The inference driver consumes [`XmlEvent`]s through the [`EventSource`]
//! trait. [`XmlEventReader`] is the bundled implementation on top of
//! `quick_xml::NsReader`, which resolves namespaces as it goes.

use crate::error::{Error, InferenceError, Result};
use crate::namespaces::{QName, XMLNS_NAMESPACE};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

/// One attribute of a start tag, namespace already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Attribute name
    pub name: QName,
    /// Unescaped attribute value
    pub value: String,
}

impl XmlAttribute {
    /// Create a new attribute
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// An element start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Element name
    pub name: QName,
    /// Attributes in document order, including `xmlns` declarations
    pub attributes: Vec<XmlAttribute>,
    /// Self-closing tag (`<a/>`); no `End` event follows
    pub is_empty: bool,
}

/// Lexical events the inference driver understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element start (or a self-closing element)
    Start(StartElement),
    /// Element end
    End,
    /// Character data, CDATA sections included
    Text(String),
}

/// A forward-only source of [`XmlEvent`]s. `Ok(None)` marks the end of input.
pub trait EventSource {
    /// Advance to the next event
    fn next_event(&mut self) -> Result<Option<XmlEvent>>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        (**self).next_event()
    }
}

/// Replays a prepared list of events; handy for driving inference from
/// something other than XML text.
#[derive(Debug, Clone, Default)]
pub struct EventList {
    events: std::collections::VecDeque<XmlEvent>,
}

impl EventList {
    /// Wrap a list of events
    pub fn new(events: impl IntoIterator<Item = XmlEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for EventList {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        Ok(self.events.pop_front())
    }
}

/// [`EventSource`] reading XML text with quick-xml
pub struct XmlEventReader<'a> {
    reader: NsReader<&'a [u8]>,
}

impl<'a> XmlEventReader<'a> {
    /// Read events from an XML string
    pub fn from_str(xml: &'a str) -> Self {
        Self {
            reader: NsReader::from_str(xml),
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    fn start_element(
        &self,
        namespace: Option<String>,
        start: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<StartElement> {
        let local = utf8(start.local_name().as_ref(), "element name")?;
        let mut attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result.map_err(|e| {
                Error::Xml(format!(
                    "Failed to parse attribute at position {}: {}",
                    self.position(),
                    e
                ))
            })?;

            let value = attr
                .unescape_value()
                .map_err(|e| entity_error(e, "attribute value"))?
                .into_owned();

            let raw_key = attr.key.as_ref();
            let name = if raw_key == b"xmlns" {
                // Default namespace declaration
                QName::namespaced(XMLNS_NAMESPACE, "")
            } else if let Some(prefix) = raw_key.strip_prefix(b"xmlns:") {
                QName::namespaced(XMLNS_NAMESPACE, utf8(prefix, "namespace prefix")?)
            } else {
                let (resolved, local_name) = self.reader.resolve_attribute(attr.key);
                let namespace = owned_namespace(resolved)?;
                QName::new(namespace, utf8(local_name.as_ref(), "attribute name")?)
            };

            attributes.push(XmlAttribute { name, value });
        }

        Ok(StartElement {
            name: QName::new(namespace, local),
            attributes,
            is_empty,
        })
    }
}

impl EventSource for XmlEventReader<'_> {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        loop {
            let position = self.position();
            let (resolved, event) = self.reader.read_resolved_event().map_err(|e| {
                Error::Xml(format!("Error parsing XML at position {}: {}", position, e))
            })?;
            let namespace = owned_namespace(resolved)?;

            match event {
                Event::Start(e) => {
                    return Ok(Some(XmlEvent::Start(self.start_element(namespace, &e, false)?)))
                }
                Event::Empty(e) => {
                    return Ok(Some(XmlEvent::Start(self.start_element(namespace, &e, true)?)))
                }
                Event::End(_) => return Ok(Some(XmlEvent::End)),
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| entity_error(e, "text"))?;
                    return Ok(Some(XmlEvent::Text(text.into_owned())));
                }
                Event::CData(e) => {
                    let text = utf8(&e.into_inner(), "CDATA section")?;
                    return Ok(Some(XmlEvent::Text(text)));
                }
                Event::Eof => return Ok(None),
                // Comments, processing instructions, declarations, DTD
                _ => {}
            }
        }
    }
}

fn owned_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(utf8(ns.as_ref(), "namespace URI")?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::Namespace(format!(
            "Unknown prefix: {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn utf8(bytes: &[u8], what: &str) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Xml(format!("Invalid UTF-8 in {}: {}", what, e)))
}

fn entity_error(err: quick_xml::Error, context: &str) -> Error {
    InferenceError::UnsupportedConstruct(format!("entity reference in {}: {}", context, err)).into()
}
