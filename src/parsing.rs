//! Seed schema parsing
//!
//! Reads XSD documents written by an earlier run (or by hand, within the
//! same subset) back into a [`SchemaSet`], so new samples can refine it.
//! The subset is what the writer produces: global elements and attributes,
//! anonymous complex types with `sequence`/`choice` bodies, simple content
//! extensions, `ref`s across documents and built-in simple types.
//!
//! Loading is two-pass: all global declarations of all documents are
//! registered first, then their bodies are read, so `ref`s may point
//! anywhere in the set.

use roxmltree::{Document, Node};

use crate::error::{Error, InferenceError, ParseError, Result};
use crate::inference::lattice::Primitive;
use crate::namespaces::{QName, XML_NAMESPACE, XSD_NAMESPACE};
use crate::schema::particles::parse_occurs;
use crate::schema::{
    AttributeId, AttributeUse, ContentModel, ElementId, InferredType, ModelType, Particle,
    SchemaSet, Term,
};

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const ATTRIBUTE: &str = "attribute";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const EXTENSION: &str = "extension";
    pub const RESTRICTION: &str = "restriction";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANY: &str = "any";
    pub const GROUP: &str = "group";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const IMPORT: &str = "import";
    pub const ANNOTATION: &str = "annotation";
    pub const NOTATION: &str = "notation";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const BASE: &str = "base";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const FORM: &str = "form";
    pub const NILLABLE: &str = "nillable";
    pub const MIXED: &str = "mixed";
    pub const NAMESPACE: &str = "namespace";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
}

/// Built-in types outside the lattice whose values are all integers
const INTEGER_DERIVED: [&str; 4] = [
    "nonNegativeInteger",
    "positiveInteger",
    "nonPositiveInteger",
    "negativeInteger",
];

/// Remaining built-in simple types, seeded as `string`
const STRING_LIKE: [&str; 22] = [
    "anySimpleType",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
];

/// Read a single XSD document
pub fn read_schema(xsd: &str) -> Result<SchemaSet> {
    read_schemas(&[xsd])
}

/// Read a set of XSD documents that may reference each other.
///
/// Globals of every document are declared before any body is read, so
/// `ref`s may point forward and across documents.
pub fn read_schemas(texts: &[&str]) -> Result<SchemaSet> {
    let documents = texts
        .iter()
        .enumerate()
        .map(|(index, text)| Document::parse(text).map_err(|e| in_document(xml_error(e), index)))
        .collect::<Result<Vec<_>>>()?;

    let mut schemas = SchemaSet::new();
    let mut readers = Vec::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        let root = document.root_element();
        if !is_xsd(root, xsd_elements::SCHEMA) {
            return Err(in_document(
                parse_error(root, "root element is not xs:schema"),
                index,
            ));
        }
        let reader = SchemaReader::new(root);
        reader
            .declare_globals(&mut schemas)
            .map_err(|e| in_document(e, index))?;
        readers.push(reader);
    }

    for (index, reader) in readers.iter().enumerate() {
        reader
            .read_globals(&mut schemas)
            .map_err(|e| in_document(e, index))?;
    }
    Ok(schemas)
}

/// Reading state of one schema document
struct SchemaReader<'a, 'input> {
    root: Node<'a, 'input>,
    target: Option<String>,
    qualified: bool,
}

impl<'a, 'input> SchemaReader<'a, 'input> {
    fn new(root: Node<'a, 'input>) -> Self {
        Self {
            root,
            target: root
                .attribute(xsd_attrs::TARGET_NAMESPACE)
                .filter(|ns| !ns.is_empty())
                .map(str::to_string),
            qualified: root.attribute(xsd_attrs::ELEMENT_FORM_DEFAULT) == Some("qualified"),
        }
    }

    fn global_name(&self, node: Node) -> Result<QName> {
        let name = required_attribute(node, xsd_attrs::NAME)?;
        Ok(QName::new(self.target.clone(), name))
    }

    /// First pass: register every global declaration and import
    fn declare_globals(&self, schemas: &mut SchemaSet) -> Result<()> {
        schemas.document_or_create(self.target.as_deref());

        for child in xsd_children(self.root) {
            match child.tag_name().name() {
                xsd_elements::ELEMENT => {
                    let name = self.global_name(child)?;
                    let (id, created) = schemas.ensure_global_element(&name);
                    if !created {
                        return Err(parse_error(child, format!("duplicate element '{}'", name)));
                    }
                    schemas.element_mut(id).instances = 1;
                }
                xsd_elements::ATTRIBUTE => {
                    let name = self.global_name(child)?;
                    schemas.ensure_global_attribute(&name);
                }
                xsd_elements::IMPORT => {
                    let namespace = child
                        .attribute(xsd_attrs::NAMESPACE)
                        .filter(|ns| !ns.is_empty());
                    schemas.add_import(self.target.as_deref(), namespace);
                }
                // Group definitions are only reachable through references,
                // which are rejected where they occur
                xsd_elements::GROUP
                | xsd_elements::ATTRIBUTE_GROUP
                | xsd_elements::ANNOTATION
                | xsd_elements::NOTATION => {}
                other => return Err(unsupported(child, format!("top-level xs:{}", other))),
            }
        }
        Ok(())
    }

    /// Second pass: read the bodies of the global declarations
    fn read_globals(&self, schemas: &mut SchemaSet) -> Result<()> {
        for child in xsd_children(self.root) {
            match child.tag_name().name() {
                xsd_elements::ELEMENT => {
                    let name = self.global_name(child)?;
                    let id = schemas
                        .global_element(name.namespace(), &name.local_name)
                        .ok_or_else(|| parse_error(child, "global element vanished"))?;
                    self.read_element(schemas, child, id)?;
                }
                xsd_elements::ATTRIBUTE => {
                    let name = self.global_name(child)?;
                    let id = schemas
                        .global_attribute(name.namespace(), &name.local_name)
                        .ok_or_else(|| parse_error(child, "global attribute vanished"))?;
                    schemas.attribute_mut(id).value = self.read_value_type(child)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn read_element(&self, schemas: &mut SchemaSet, node: Node, id: ElementId) -> Result<()> {
        if node.attribute(xsd_attrs::NILLABLE) == Some("true") {
            schemas.element_mut(id).nillable = true;
        }

        if let Some(type_name) = node.attribute(xsd_attrs::TYPE) {
            if let Some(primitive) = self.builtin(node, type_name)? {
                let decl = schemas.element_mut(id);
                decl.value = InferredType::seeded(primitive);
                decl.flags.text = true;
            }
            return Ok(());
        }

        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::COMPLEX_TYPE => self.read_complex_type(schemas, child, id)?,
                xsd_elements::SIMPLE_TYPE => {
                    let primitive = self.read_simple_type(child)?;
                    let decl = schemas.element_mut(id);
                    decl.value = InferredType::seeded(primitive);
                    decl.flags.text = true;
                }
                xsd_elements::ANNOTATION => {}
                other => return Err(unsupported(child, format!("xs:{} in an element", other))),
            }
        }
        Ok(())
    }

    fn read_complex_type(&self, schemas: &mut SchemaSet, node: Node, id: ElementId) -> Result<()> {
        if node.has_attribute(xsd_attrs::NAME) {
            return Err(unsupported(node, "named complex type"));
        }
        let mixed = node.attribute(xsd_attrs::MIXED) == Some("true");
        let mut has_content = false;

        for child in xsd_children(node) {
            match child.tag_name().name() {
                xsd_elements::SEQUENCE | xsd_elements::CHOICE => {
                    let content = self.read_model(schemas, child)?;
                    schemas.element_mut(id).content = content;
                    has_content = true;
                }
                xsd_elements::GROUP => {
                    let name = self.resolve(child, required_attribute(child, xsd_attrs::REF)?)?;
                    let occurs = read_occurs(child)?;
                    schemas.element_mut(id).content.particles.push(Particle {
                        term: Term::GroupRef(name),
                        occurs,
                    });
                    has_content = true;
                }
                xsd_elements::SIMPLE_CONTENT => {
                    self.read_simple_content(schemas, child, id)?;
                    has_content = true;
                }
                xsd_elements::ATTRIBUTE => self.read_attribute_use(schemas, child, id)?,
                xsd_elements::ATTRIBUTE_GROUP => {
                    return Err(unsupported(child, "attribute group reference"))
                }
                xsd_elements::ANNOTATION => {}
                xsd_elements::ALL => return Err(unsupported(child, "xs:all content model")),
                other => {
                    return Err(unsupported(child, format!("xs:{} in a complex type", other)))
                }
            }
        }

        let decl = schemas.element_mut(id);
        if mixed {
            decl.flags.mixed = true;
        }
        if decl.has_children() {
            decl.flags.children = true;
        } else if !has_content && !mixed {
            decl.flags.empty = true;
        }
        Ok(())
    }

    fn read_simple_content(&self, schemas: &mut SchemaSet, node: Node, id: ElementId) -> Result<()> {
        let extension = xsd_children(node)
            .find(|c| c.tag_name().name() != xsd_elements::ANNOTATION)
            .ok_or_else(|| parse_error(node, "empty simpleContent"))?;
        if extension.tag_name().name() != xsd_elements::EXTENSION {
            return Err(unsupported(extension, "simple content restriction"));
        }

        let base = required_attribute(extension, xsd_attrs::BASE)?;
        let primitive = self
            .builtin(extension, base)?
            .unwrap_or(Primitive::String);
        {
            let decl = schemas.element_mut(id);
            decl.value = InferredType::seeded(primitive);
            decl.flags.text = true;
        }

        for child in xsd_children(extension) {
            match child.tag_name().name() {
                xsd_elements::ATTRIBUTE => self.read_attribute_use(schemas, child, id)?,
                xsd_elements::ANNOTATION => {}
                other => return Err(unsupported(child, format!("xs:{} in an extension", other))),
            }
        }
        Ok(())
    }

    fn read_model(&self, schemas: &mut SchemaSet, node: Node) -> Result<ContentModel> {
        let model = ModelType::from_tag(node.tag_name().name())
            .ok_or_else(|| parse_error(node, "expected sequence or choice"))?;
        let mut content = ContentModel {
            model,
            occurs: read_occurs(node)?,
            particles: Vec::new(),
        };

        for child in xsd_children(node) {
            let occurs = read_occurs(child)?;
            let term = match child.tag_name().name() {
                xsd_elements::ELEMENT => Term::Element(self.read_particle_element(schemas, child)?),
                xsd_elements::ANY => Term::Wildcard,
                xsd_elements::GROUP => {
                    Term::GroupRef(self.resolve(child, required_attribute(child, xsd_attrs::REF)?)?)
                }
                xsd_elements::SEQUENCE | xsd_elements::CHOICE => {
                    let mut nested = self.read_model(schemas, child)?;
                    nested.occurs = occurs;
                    Term::Group(Box::new(nested))
                }
                xsd_elements::ANNOTATION => continue,
                xsd_elements::ALL => return Err(unsupported(child, "xs:all content model")),
                other => return Err(unsupported(child, format!("xs:{} in a model group", other))),
            };
            content.particles.push(Particle { term, occurs });
        }
        Ok(content)
    }

    fn read_particle_element(&self, schemas: &mut SchemaSet, node: Node) -> Result<ElementId> {
        if let Some(reference) = node.attribute(xsd_attrs::REF) {
            let name = self.resolve(node, reference)?;
            let id = schemas
                .global_element(name.namespace(), &name.local_name)
                .ok_or_else(|| {
                    parse_error(node, format!("unresolved element reference '{}'", name))
                })?;
            schemas.add_import(self.target.as_deref(), name.namespace());
            return Ok(id);
        }

        let local_name = required_attribute(node, xsd_attrs::NAME)?;
        let qualified = match node.attribute(xsd_attrs::FORM) {
            Some("qualified") => true,
            Some("unqualified") => false,
            _ => self.qualified,
        };
        let id = if qualified || self.target.is_none() {
            schemas.add_local_element(QName::new(self.target.clone(), local_name), true)
        } else {
            schemas.add_local_element(QName::local(local_name), false)
        };
        schemas.element_mut(id).instances = 1;
        self.read_element(schemas, node, id)?;
        Ok(id)
    }

    fn read_attribute_use(&self, schemas: &mut SchemaSet, node: Node, element: ElementId) -> Result<()> {
        let required = match node.attribute(xsd_attrs::USE) {
            Some("required") => true,
            Some("prohibited") => return Ok(()),
            _ => false,
        };

        let id: AttributeId = if let Some(reference) = node.attribute(xsd_attrs::REF) {
            let name = self.resolve(node, reference)?;
            let id = match schemas.global_attribute(name.namespace(), &name.local_name) {
                Some(id) => id,
                // xml:lang, xml:space and friends are declared by the W3C xml.xsd
                None if name.is_in(Some(XML_NAMESPACE)) => schemas.ensure_global_attribute(&name),
                None => {
                    return Err(parse_error(
                        node,
                        format!("unresolved attribute reference '{}'", name),
                    ))
                }
            };
            schemas.add_import(self.target.as_deref(), name.namespace());
            id
        } else {
            let local_name = required_attribute(node, xsd_attrs::NAME)?;
            if node.attribute(xsd_attrs::FORM) == Some("qualified") && self.target.is_some() {
                return Err(unsupported(node, "qualified local attribute"));
            }
            let id = schemas.add_local_attribute(QName::local(local_name));
            schemas.attribute_mut(id).value = self.read_value_type(node)?;
            id
        };

        schemas
            .element_mut(element)
            .attributes
            .push(AttributeUse::new(id, required));
        Ok(())
    }

    /// Type of an attribute declaration
    fn read_value_type(&self, node: Node) -> Result<InferredType> {
        if let Some(type_name) = node.attribute(xsd_attrs::TYPE) {
            return Ok(self
                .builtin(node, type_name)?
                .map(InferredType::seeded)
                .unwrap_or_default());
        }
        match xsd_children(node).find(|c| c.tag_name().name() == xsd_elements::SIMPLE_TYPE) {
            Some(simple) => Ok(InferredType::seeded(self.read_simple_type(simple)?)),
            None => Ok(InferredType::new()),
        }
    }

    /// Anonymous simple type: the base of its restriction
    fn read_simple_type(&self, node: Node) -> Result<Primitive> {
        let restriction = xsd_children(node)
            .find(|c| c.tag_name().name() == xsd_elements::RESTRICTION)
            .ok_or_else(|| unsupported(node, "simple type other than a restriction"))?;
        let base = required_attribute(restriction, xsd_attrs::BASE)?;
        Ok(self.builtin(restriction, base)?.unwrap_or(Primitive::String))
    }

    /// Map a built-in type reference onto the lattice. `None` is `anyType`.
    fn builtin(&self, node: Node, type_name: &str) -> Result<Option<Primitive>> {
        let name = self.resolve(node, type_name)?;
        if !name.is_in(Some(XSD_NAMESPACE)) {
            return Err(unsupported(node, format!("reference to named type '{}'", name)));
        }
        let local = name.local_name.as_str();
        if local == "anyType" {
            return Ok(None);
        }
        if let Some(primitive) = Primitive::from_name(local) {
            return Ok(Some(primitive));
        }
        if INTEGER_DERIVED.contains(&local) {
            return Ok(Some(Primitive::Integer));
        }
        if STRING_LIKE.contains(&local) {
            return Ok(Some(Primitive::String));
        }
        Err(InferenceError::MalformedLattice(format!(
            "'xs:{}' is not a built-in type ({})",
            local,
            location(node)
        ))
        .into())
    }

    /// Resolve a prefixed name against the namespaces in scope at `node`
    fn resolve(&self, node: Node, value: &str) -> Result<QName> {
        let (prefix, local) = match value.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, value),
        };
        let bound = match prefix {
            Some("xml") => Some(XML_NAMESPACE),
            _ => node.lookup_namespace_uri(prefix),
        };
        let namespace = match bound {
            Some(ns) => Some(ns.to_string()),
            None if prefix.is_none() => None,
            None => {
                return Err(Error::Namespace(format!(
                    "Unknown prefix '{}' in '{}' at {}",
                    prefix.unwrap_or_default(),
                    value,
                    location(node)
                )))
            }
        };
        Ok(QName::new(namespace.filter(|ns| !ns.is_empty()), local))
    }
}

fn is_xsd(node: Node, local_name: &str) -> bool {
    node.tag_name().namespace() == Some(XSD_NAMESPACE) && node.tag_name().name() == local_name
}

fn xsd_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|c| c.is_element() && c.tag_name().namespace() == Some(XSD_NAMESPACE))
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        parse_error(
            node,
            format!("xs:{} missing '{}' attribute", node.tag_name().name(), name),
        )
    })
}

fn read_occurs(node: Node) -> Result<crate::schema::Occurs> {
    parse_occurs(
        node.attribute(xsd_attrs::MIN_OCCURS),
        node.attribute(xsd_attrs::MAX_OCCURS),
    )
    .map_err(|e| match e {
        Error::Parse(inner) => Error::Parse(inner.with_location(location(node))),
        other => other,
    })
}

fn location(node: Node) -> String {
    let pos = node.document().text_pos_at(node.range().start);
    format!("{}:{}", pos.row, pos.col)
}

fn parse_error(node: Node, message: impl Into<String>) -> Error {
    ParseError::new(message).with_location(location(node)).into()
}

fn unsupported(node: Node, what: impl Into<String>) -> Error {
    InferenceError::UnsupportedConstruct(format!("{} at {}", what.into(), location(node))).into()
}

fn in_document(err: Error, index: usize) -> Error {
    match err {
        Error::Parse(inner) => Error::Parse(inner.in_document(index)),
        other => other,
    }
}

fn xml_error(err: roxmltree::Error) -> Error {
    let pos = err.pos();
    ParseError::new(format!("malformed schema document: {}", err))
        .with_location(format!("{}:{}", pos.row, pos.col))
        .into()
}
