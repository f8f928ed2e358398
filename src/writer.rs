//! XSD serialization
//!
//! Writes one [`SchemaDocument`] as indented XSD text. All types are
//! anonymous. Particles and attributes of a foreign namespace are written
//! as `ref`s to the global declaration in that namespace's document, using
//! the prefixes collected from the instances where possible.

use std::collections::HashMap;

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};
use crate::inference::lattice::Primitive;
use crate::namespaces::{QName, XML_NAMESPACE, XSD_NAMESPACE};
use crate::schema::{
    AttributeUse, ContentModel, ContentShape, ElementId, Occurs, SchemaDocument, SchemaSet, Term,
};

/// Prefix used for the schema namespace itself
const XSD_PREFIX: &str = "xs";

/// Published schema for the `xml:` attributes
pub const XML_SCHEMA_LOCATION: &str = "http://www.w3.org/2001/xml.xsd";

/// Namespace prefixes used across all documents of a set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefixes {
    by_namespace: IndexMap<String, String>,
}

impl Prefixes {
    /// Assign a prefix to every namespace the documents of `schemas` use.
    ///
    /// Prefixes declared in the instances win; namespaces without one (or
    /// whose prefix is taken) get `q1`, `q2`, and so on.
    pub fn for_schemas(schemas: &SchemaSet) -> Self {
        let mut prefixes = Self::default();
        let mut counter = 0;

        let namespaces = schemas
            .documents()
            .flat_map(|d| std::iter::once(d.target_namespace()).chain(d.imports()))
            .flatten();

        for namespace in namespaces {
            if prefixes.by_namespace.contains_key(namespace) {
                continue;
            }
            if namespace == XML_NAMESPACE {
                prefixes.insert(namespace, "xml");
                continue;
            }
            let bound = schemas
                .bindings()
                .prefix_for(namespace)
                .filter(|p| *p != XSD_PREFIX && !prefixes.is_taken(p));
            match bound {
                Some(prefix) => prefixes.insert(namespace, prefix),
                None => loop {
                    counter += 1;
                    let candidate = format!("q{}", counter);
                    let bound_elsewhere = schemas.bindings().get_namespace(&candidate).is_some();
                    if !prefixes.is_taken(&candidate) && !bound_elsewhere {
                        prefixes.insert(namespace, &candidate);
                        break;
                    }
                },
            }
        }
        prefixes
    }

    /// Prefix assigned to `namespace`
    pub fn prefix(&self, namespace: &str) -> Option<&str> {
        if namespace == XSD_NAMESPACE {
            return Some(XSD_PREFIX);
        }
        self.by_namespace.get(namespace).map(String::as_str)
    }

    /// `prefix:local`, or the bare local name outside any namespace
    pub fn qualify(&self, name: &QName) -> String {
        match name.namespace().and_then(|ns| self.prefix(ns)) {
            Some(prefix) => format!("{}:{}", prefix, name.local_name),
            None => name.local_name.clone(),
        }
    }

    fn insert(&mut self, namespace: &str, prefix: &str) {
        self.by_namespace
            .insert(namespace.to_string(), prefix.to_string());
    }

    fn is_taken(&self, prefix: &str) -> bool {
        prefix == XSD_PREFIX || self.by_namespace.values().any(|p| p == prefix)
    }
}

/// Serializes the documents of one schema set
#[derive(Debug, Clone)]
pub struct SchemaWriter<'s> {
    schemas: &'s SchemaSet,
    prefixes: Prefixes,
    locations: HashMap<Option<String>, String>,
}

impl<'s> SchemaWriter<'s> {
    /// Writer for the documents of `schemas`
    pub fn new(schemas: &'s SchemaSet) -> Self {
        Self {
            schemas,
            prefixes: Prefixes::for_schemas(schemas),
            locations: HashMap::new(),
        }
    }

    /// Emit `schemaLocation` on imports of `namespace`
    pub fn with_location(mut self, namespace: Option<&str>, location: impl Into<String>) -> Self {
        self.locations
            .insert(namespace.map(str::to_string), location.into());
        self
    }

    /// Prefixes in use
    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Serialize `document` to XSD text
    pub fn write(&self, document: &SchemaDocument) -> Result<String> {
        let mut emitter = Emitter {
            out: Writer::new_with_indent(Vec::new(), b' ', 2),
            schemas: self.schemas,
            prefixes: &self.prefixes,
        };
        emitter.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new("xs:schema");
        root.push_attribute(("xmlns:xs", XSD_NAMESPACE));
        if let Some(target) = document.target_namespace() {
            root.push_attribute(("targetNamespace", target));
            root.push_attribute(("elementFormDefault", "qualified"));
        }
        let declared = document
            .target_namespace()
            .into_iter()
            .chain(document.imports().flatten());
        for namespace in declared {
            if namespace == XML_NAMESPACE {
                continue;
            }
            if let Some(prefix) = self.prefixes.prefix(namespace) {
                root.push_attribute((format!("xmlns:{}", prefix).as_str(), namespace));
            }
        }
        emitter.event(Event::Start(root))?;

        for namespace in document.imports() {
            let mut import = BytesStart::new("xs:import");
            if let Some(namespace) = namespace {
                import.push_attribute(("namespace", namespace));
            }
            let location = match self.locations.get(&namespace.map(str::to_string)) {
                Some(location) => Some(location.as_str()),
                None if namespace == Some(XML_NAMESPACE) => Some(XML_SCHEMA_LOCATION),
                None => None,
            };
            if let Some(location) = location {
                import.push_attribute(("schemaLocation", location));
            }
            emitter.event(Event::Empty(import))?;
        }

        for (_, id) in document.elements() {
            emitter.element(id, None)?;
        }
        for (name, id) in document.attributes() {
            let mut attribute = BytesStart::new("xs:attribute");
            attribute.push_attribute(("name", name));
            let value = &self.schemas.attribute(id).value;
            if value.is_typed() {
                attribute.push_attribute(("type", type_name(value.resolve().name()).as_str()));
            }
            emitter.event(Event::Empty(attribute))?;
        }

        emitter.event(Event::End(BytesEnd::new("xs:schema")))?;
        String::from_utf8(emitter.out.into_inner())
            .map_err(|e| Error::Xml(format!("Invalid UTF-8 in schema output: {}", e)))
    }
}

/// Serialize the document of `namespace` with default settings
pub fn write_document(schemas: &SchemaSet, namespace: Option<&str>) -> Result<String> {
    let document = schemas.document(namespace).ok_or_else(|| {
        Error::Namespace(format!(
            "No schema document for namespace '{}'",
            namespace.unwrap_or_default()
        ))
    })?;
    SchemaWriter::new(schemas).write(document)
}

struct Emitter<'w> {
    out: Writer<Vec<u8>>,
    schemas: &'w SchemaSet,
    prefixes: &'w Prefixes,
}

impl Emitter<'_> {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.out
            .write_event(event)
            .map_err(|e| Error::Xml(format!("Failed to write schema: {}", e)))
    }

    /// Element declaration; `occurs` is set for local particles
    fn element(&mut self, id: ElementId, occurs: Option<Occurs>) -> Result<()> {
        let schemas = self.schemas;
        let decl = schemas.element(id);
        let mut start = BytesStart::new("xs:element");
        start.push_attribute(("name", decl.name.local_name.as_str()));
        if decl.is_unqualified_local() {
            start.push_attribute(("form", "unqualified"));
        }
        if let Some(occurs) = occurs {
            push_occurs(&mut start, occurs);
        }
        if decl.nillable {
            start.push_attribute(("nillable", "true"));
        }

        let shape = decl.shape();
        let has_attributes = !decl.attributes.is_empty();
        match (shape, has_attributes) {
            (ContentShape::Simple, false) => {
                let primitive = decl.simple_type().unwrap_or(Primitive::String);
                start.push_attribute(("type", type_name(primitive.name()).as_str()));
                return self.event(Event::Empty(start));
            }
            (ContentShape::Empty, false) if !decl.flags.empty => {
                return self.event(Event::Empty(start));
            }
            _ => {}
        }

        self.event(Event::Start(start))?;
        let mut complex = BytesStart::new("xs:complexType");
        if shape == ContentShape::Mixed {
            complex.push_attribute(("mixed", "true"));
        }

        match shape {
            ContentShape::Empty if !has_attributes => self.event(Event::Empty(complex))?,
            ContentShape::Empty => {
                self.event(Event::Start(complex))?;
                self.attributes(&decl.attributes)?;
                self.event(Event::End(BytesEnd::new("xs:complexType")))?;
            }
            ContentShape::Simple => {
                let primitive = decl.simple_type().unwrap_or(Primitive::String);
                self.event(Event::Start(complex))?;
                self.event(Event::Start(BytesStart::new("xs:simpleContent")))?;
                let mut extension = BytesStart::new("xs:extension");
                extension.push_attribute(("base", type_name(primitive.name()).as_str()));
                self.event(Event::Start(extension))?;
                self.attributes(&decl.attributes)?;
                self.event(Event::End(BytesEnd::new("xs:extension")))?;
                self.event(Event::End(BytesEnd::new("xs:simpleContent")))?;
                self.event(Event::End(BytesEnd::new("xs:complexType")))?;
            }
            ContentShape::ElementOnly | ContentShape::Mixed => {
                self.event(Event::Start(complex))?;
                if !decl.content.is_empty() {
                    self.model(&decl.content)?;
                }
                self.attributes(&decl.attributes)?;
                self.event(Event::End(BytesEnd::new("xs:complexType")))?;
            }
        }
        self.event(Event::End(BytesEnd::new("xs:element")))
    }

    fn model(&mut self, content: &ContentModel) -> Result<()> {
        let tag = format!("xs:{}", content.model.tag());
        let mut start = BytesStart::new(tag.as_str());
        push_occurs(&mut start, content.occurs);
        self.event(Event::Start(start))?;

        for particle in &content.particles {
            match &particle.term {
                Term::Element(id) => {
                    let schemas = self.schemas;
                    let child = schemas.element(*id);
                    if child.is_global() {
                        let mut reference = BytesStart::new("xs:element");
                        reference.push_attribute(("ref", self.prefixes.qualify(&child.name).as_str()));
                        push_occurs(&mut reference, particle.occurs);
                        self.event(Event::Empty(reference))?;
                    } else {
                        self.element(*id, Some(particle.occurs))?;
                    }
                }
                Term::Wildcard => {
                    let mut any = BytesStart::new("xs:any");
                    push_occurs(&mut any, particle.occurs);
                    self.event(Event::Empty(any))?;
                }
                Term::GroupRef(name) => {
                    let mut group = BytesStart::new("xs:group");
                    group.push_attribute(("ref", self.prefixes.qualify(name).as_str()));
                    push_occurs(&mut group, particle.occurs);
                    self.event(Event::Empty(group))?;
                }
                Term::Group(nested) => self.model(nested)?,
            }
        }
        self.event(Event::End(BytesEnd::new(tag.as_str())))
    }

    fn attributes(&mut self, uses: &[AttributeUse]) -> Result<()> {
        let schemas = self.schemas;
        for attribute_use in uses {
            let decl = schemas.attribute(attribute_use.attribute);
            let mut start = BytesStart::new("xs:attribute");
            if decl.is_global() {
                start.push_attribute(("ref", self.prefixes.qualify(&decl.name).as_str()));
            } else {
                start.push_attribute(("name", decl.name.local_name.as_str()));
                if decl.value.is_typed() {
                    start.push_attribute(("type", type_name(decl.value.resolve().name()).as_str()));
                }
            }
            if attribute_use.required {
                start.push_attribute(("use", attribute_use.use_text()));
            }
            self.event(Event::Empty(start))?;
        }
        Ok(())
    }
}

fn push_occurs(start: &mut BytesStart<'_>, occurs: Occurs) {
    if occurs.min != 1 {
        start.push_attribute(("minOccurs", occurs.min.to_string().as_str()));
    }
    if occurs.max != Some(1) {
        start.push_attribute(("maxOccurs", occurs.max_text().as_str()));
    }
}

fn type_name(local: &str) -> String {
    format!("{}:{}", XSD_PREFIX, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::SchemaInference;
    use crate::namespaces::NamespaceBindings;

    fn infer(xml: &str) -> SchemaSet {
        SchemaInference::new().infer_str(xml).unwrap()
    }

    #[test]
    fn test_write_simple_document() {
        let schemas = infer(r#"<r id="3"><a>1</a><a>2</a><b/></r>"#);
        let xsd = write_document(&schemas, None).unwrap();

        assert!(xsd.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xsd.contains(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">"#));
        assert!(xsd.contains(r#"<xs:element name="a" maxOccurs="unbounded" type="xs:unsignedByte"/>"#));
        assert!(xsd.contains(r#"<xs:attribute name="id" type="xs:unsignedByte" use="required"/>"#));
        assert!(!xsd.contains("elementFormDefault"));
    }

    #[test]
    fn test_empty_element_has_empty_complex_type() {
        let schemas = infer("<r><b/></r>");
        let xsd = write_document(&schemas, None).unwrap();
        assert!(xsd.contains("<xs:element name=\"b\">"));
        assert!(xsd.contains("<xs:complexType/>"));
    }

    #[test]
    fn test_write_mixed_and_simple_content() {
        let schemas = infer(r#"<r>text<a x="true">2024-01-01</a></r>"#);
        let xsd = write_document(&schemas, None).unwrap();
        assert!(xsd.contains(r#"<xs:complexType mixed="true">"#));
        assert!(xsd.contains(r#"<xs:extension base="xs:date">"#));
        assert!(xsd.contains(r#"<xs:attribute name="x" type="xs:boolean" use="required"/>"#));
    }

    #[test]
    fn test_foreign_namespace_written_as_ref() {
        let schemas = infer(r#"<m:r xmlns:m="urn:m" xmlns:p="urn:p"><p:item>x</p:item><c/></m:r>"#);
        let xsd = write_document(&schemas, Some("urn:m")).unwrap();
        assert!(xsd.contains(r#"targetNamespace="urn:m" elementFormDefault="qualified""#));
        assert!(xsd.contains(r#"xmlns:m="urn:m""#));
        assert!(xsd.contains(r#"<xs:import namespace="urn:p"/>"#));
        assert!(xsd.contains(r#"<xs:element ref="p:item"/>"#));
        assert!(xsd.contains(r#"<xs:element name="c" form="unqualified">"#));

        let other = write_document(&schemas, Some("urn:p")).unwrap();
        assert!(other.contains(r#"<xs:element name="item" type="xs:string"/>"#));
    }

    #[test]
    fn test_xml_attributes_import_w3c_schema() {
        let schemas = infer(r#"<r xml:lang="en" xml:space="preserve"/>"#);
        let xsd = write_document(&schemas, None).unwrap();
        assert!(xsd.contains(&format!(
            r#"<xs:import namespace="{}" schemaLocation="{}"/>"#,
            XML_NAMESPACE, XML_SCHEMA_LOCATION
        )));
        assert!(xsd.contains(r#"<xs:attribute ref="xml:lang" use="required"/>"#));
        assert!(xsd.contains(r#"<xs:attribute ref="xml:space" use="required"/>"#));
        assert!(!xsd.contains("xmlns:xml="));
    }

    #[test]
    fn test_fallback_prefixes() {
        let mut schemas = SchemaSet::new();
        schemas.add_import(Some("urn:a"), Some("urn:b"));
        let prefixes = Prefixes::for_schemas(&schemas);
        assert_eq!(prefixes.prefix("urn:a"), Some("q1"));
        assert_eq!(prefixes.prefix("urn:b"), Some("q2"));
        assert_eq!(prefixes.prefix(XSD_NAMESPACE), Some("xs"));
    }

    #[test]
    fn test_bound_prefix_clash_with_xs() {
        let mut schemas = SchemaSet::new();
        schemas.document_or_create(Some("urn:a"));
        let mut bindings = NamespaceBindings::new();
        bindings.bind("xs", "urn:a");
        *schemas.bindings_mut() = bindings;
        let prefixes = Prefixes::for_schemas(&schemas);
        assert_eq!(prefixes.prefix("urn:a"), Some("q1"));
    }

    #[test]
    fn test_missing_document() {
        let schemas = SchemaSet::new();
        assert!(matches!(
            write_document(&schemas, Some("urn:none")),
            Err(Error::Namespace(_))
        ));
    }
}
