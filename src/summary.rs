//! Schema summaries
//!
//! A plain, serializable view of a [`SchemaSet`]: per document, the global
//! declarations with their inferred types, occurrence bounds and content
//! trees. Names use the `{namespace}localName` format.

use serde::{Deserialize, Serialize};

use crate::schema::{AttributeUse, ElementId, Occurs, SchemaDocument, SchemaSet, Term};

/// Summary of a whole schema set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SchemaSummary {
    /// One entry per target namespace
    pub documents: Vec<DocumentSummary>,

    /// Prefixes declared in the instances
    pub prefixes: Vec<PrefixBinding>,
}

/// A namespace prefix declared in an instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrefixBinding {
    /// Prefix as written in the instance
    pub prefix: String,
    /// Namespace URI it was bound to
    pub namespace: String,
}

/// Summary of one schema document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    /// Target namespace of the document
    pub target_namespace: Option<String>,

    /// Imported namespaces (`null` for the no-namespace document)
    pub imports: Vec<Option<String>>,

    /// Global element declarations
    pub elements: Vec<ElementInfo>,

    /// Global attribute declarations
    pub attributes: Vec<AttributeInfo>,
}

/// Element declaration, or reference to a global one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElementInfo {
    /// Element name (qualified format: {namespace}localName)
    pub name: String,

    /// Whether this entry only references a global declaration
    #[serde(default)]
    pub is_reference: bool,

    /// Minimum occurrences
    pub min_occurs: u32,

    /// Maximum occurrences (None means unbounded)
    pub max_occurs: Option<u32>,

    /// Content shape: empty, simple, element-only, mixed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Simple type of the text content
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<String>,

    /// Whether the element is nillable
    #[serde(default)]
    pub nillable: bool,

    /// Compositor of the content model (sequence or choice)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Child particles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementInfo>,

    /// Particles inference cannot merge into (wildcards, group references)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported: Vec<String>,

    /// Attribute uses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeInfo>,
}

/// Attribute declaration or use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeInfo {
    /// Attribute name (qualified format)
    pub name: String,

    /// Type name
    #[serde(rename = "type")]
    pub attr_type: Option<String>,

    /// Use mode: optional or required
    #[serde(rename = "use")]
    pub use_mode: String,

    /// Whether this use references a global declaration
    #[serde(default)]
    pub is_reference: bool,
}

impl SchemaSummary {
    /// Summarize every document of `schemas`
    pub fn from_schemas(schemas: &SchemaSet) -> Self {
        Self {
            documents: schemas
                .documents()
                .map(|d| DocumentSummary::from_document(schemas, d))
                .collect(),
            prefixes: schemas
                .bindings()
                .iter()
                .map(|(prefix, namespace)| PrefixBinding {
                    prefix: prefix.to_string(),
                    namespace: namespace.to_string(),
                })
                .collect(),
        }
    }

    /// Document summary for `namespace`
    pub fn document(&self, namespace: Option<&str>) -> Option<&DocumentSummary> {
        self.documents
            .iter()
            .find(|d| d.target_namespace.as_deref() == namespace)
    }
}

impl DocumentSummary {
    fn from_document(schemas: &SchemaSet, document: &SchemaDocument) -> Self {
        Self {
            target_namespace: document.target_namespace().map(str::to_string),
            imports: document.imports().map(|ns| ns.map(str::to_string)).collect(),
            elements: document
                .elements()
                .map(|(_, id)| element_info(schemas, id, Occurs::once()))
                .collect(),
            attributes: document
                .attributes()
                .map(|(_, id)| {
                    let decl = schemas.attribute(id);
                    AttributeInfo {
                        name: decl.name.to_string(),
                        attr_type: decl.value.is_typed().then(|| decl.value.resolve().to_string()),
                        use_mode: "optional".to_string(),
                        is_reference: false,
                    }
                })
                .collect(),
        }
    }

    /// Global element by local name
    pub fn element(&self, local_name: &str) -> Option<&ElementInfo> {
        let name = format_qualified_name(self.target_namespace.as_deref(), local_name);
        self.elements.iter().find(|e| e.name == name)
    }
}

impl ElementInfo {
    /// Child particle by local name
    pub fn child(&self, local_name: &str) -> Option<&ElementInfo> {
        self.children.iter().find(|e| {
            e.name == local_name || e.name.ends_with(&format!("}}{}", local_name))
        })
    }
}

fn element_info(schemas: &SchemaSet, id: ElementId, occurs: Occurs) -> ElementInfo {
    let decl = schemas.element(id);
    let shape = decl.shape();
    let mut children = Vec::new();
    let mut unsupported = Vec::new();

    for particle in &decl.content.particles {
        match particle.term {
            Term::Element(child) if schemas.element(child).is_global() => {
                children.push(reference_info(schemas, child, particle.occurs))
            }
            Term::Element(child) => children.push(element_info(schemas, child, particle.occurs)),
            ref other => unsupported.push(other.describe()),
        }
    }

    ElementInfo {
        name: decl.name.to_string(),
        is_reference: false,
        min_occurs: occurs.min,
        max_occurs: occurs.max,
        content: Some(shape.as_str().to_string()),
        simple_type: decl.simple_type().map(|p| p.to_string()),
        nillable: decl.nillable,
        model: (!decl.content.is_empty()).then(|| decl.content.model.to_string()),
        children,
        unsupported,
        attributes: decl
            .attributes
            .iter()
            .map(|u| attribute_info(schemas, u))
            .collect(),
    }
}

fn reference_info(schemas: &SchemaSet, id: ElementId, occurs: Occurs) -> ElementInfo {
    let decl = schemas.element(id);
    ElementInfo {
        name: decl.name.to_string(),
        is_reference: true,
        min_occurs: occurs.min,
        max_occurs: occurs.max,
        content: None,
        simple_type: None,
        nillable: false,
        model: None,
        children: Vec::new(),
        unsupported: Vec::new(),
        attributes: Vec::new(),
    }
}

fn attribute_info(schemas: &SchemaSet, attribute_use: &AttributeUse) -> AttributeInfo {
    let decl = schemas.attribute(attribute_use.attribute);
    AttributeInfo {
        name: decl.name.to_string(),
        attr_type: decl.value.is_typed().then(|| decl.value.resolve().to_string()),
        use_mode: attribute_use.use_text().to_string(),
        is_reference: decl.is_global(),
    }
}

/// Format a qualified name in the {namespace}localName format
pub fn format_qualified_name(namespace: Option<&str>, local_name: &str) -> String {
    match namespace {
        Some(ns) => format!("{{{}}}{}", ns, local_name),
        None => local_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::SchemaInference;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_qualified_name() {
        assert_eq!(
            format_qualified_name(Some("http://example.com"), "test"),
            "{http://example.com}test"
        );
        assert_eq!(format_qualified_name(None, "local"), "local");
    }

    #[test]
    fn test_summary_tree() {
        let schemas = SchemaInference::new()
            .infer_str(r#"<r id="x"><a>1</a><a>2</a></r>"#)
            .unwrap();
        let summary = SchemaSummary::from_schemas(&schemas);
        let root = summary.document(None).unwrap().element("r").unwrap();

        assert_eq!(root.content.as_deref(), Some("element-only"));
        assert_eq!(root.model.as_deref(), Some("sequence"));
        assert_eq!(
            root.attributes,
            vec![AttributeInfo {
                name: "id".to_string(),
                attr_type: Some("string".to_string()),
                use_mode: "required".to_string(),
                is_reference: false,
            }]
        );

        let a = root.child("a").unwrap();
        assert_eq!(a.simple_type.as_deref(), Some("unsignedByte"));
        assert_eq!((a.min_occurs, a.max_occurs), (1, None));
    }

    #[test]
    fn test_summary_references() {
        let schemas = SchemaInference::new()
            .infer_str(r#"<r xmlns:p="urn:p"><p:a/></r>"#)
            .unwrap();
        let summary = SchemaSummary::from_schemas(&schemas);
        let root = summary.document(None).unwrap().element("r").unwrap();
        let a = root.child("a").unwrap();
        assert!(a.is_reference);
        assert_eq!(a.name, "{urn:p}a");
        assert_eq!(
            summary.prefixes,
            vec![PrefixBinding {
                prefix: "p".to_string(),
                namespace: "urn:p".to_string(),
            }]
        );
        assert!(summary.document(Some("urn:p")).unwrap().element("a").is_some());
    }

    #[test]
    fn test_summary_serialization() {
        let schemas = SchemaInference::new().infer_str("<r>5</r>").unwrap();
        let summary = SchemaSummary::from_schemas(&schemas);
        let json = serde_json::to_string_pretty(&summary).unwrap();
        assert!(json.contains("\"type\": \"unsignedByte\""));

        let parsed: SchemaSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, parsed);
    }
}
