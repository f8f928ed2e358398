//! Schema object model
//!
//! The inferred schema is a graph: elements reference child elements through
//! their content models, attributes are shared between elements, and
//! documents import each other. It is stored as an arena in [`SchemaSet`]:
//! declarations live in flat vectors and are referenced by [`ElementId`] and
//! [`AttributeId`] handles, so promoting a content model in place never
//! invalidates a reference held elsewhere.
//!
//! One [`SchemaDocument`] exists per target namespace (the no-namespace
//! bucket included). A document only lists declarations of its own
//! namespace; foreign ones are reached through `ref` and `import`.

pub mod attributes;
pub mod elements;
pub mod particles;
pub mod types;

pub use attributes::{AttributeDecl, AttributeUse};
pub use elements::{ContentFlags, ContentShape, ElementDecl, Scope};
pub use particles::{ContentModel, ModelType, Occurs, Particle, Term};
pub use types::InferredType;

use indexmap::{IndexMap, IndexSet};

use crate::namespaces::{NamespaceBindings, QName};

/// Handle of an element declaration in a [`SchemaSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

/// Handle of an attribute declaration in a [`SchemaSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(pub(crate) usize);

/// All declarations of one target namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    target_namespace: Option<String>,
    elements: IndexMap<String, ElementId>,
    attributes: IndexMap<String, AttributeId>,
    imports: IndexSet<Option<String>>,
}

impl SchemaDocument {
    fn new(target_namespace: Option<String>) -> Self {
        Self {
            target_namespace,
            elements: IndexMap::new(),
            attributes: IndexMap::new(),
            imports: IndexSet::new(),
        }
    }

    /// Target namespace, `None` for the no-namespace document
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Global element declarations in first-seen order
    pub fn elements(&self) -> impl Iterator<Item = (&str, ElementId)> {
        self.elements.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Global attribute declarations in first-seen order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, AttributeId)> {
        self.attributes.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Global element by local name
    pub fn element(&self, local_name: &str) -> Option<ElementId> {
        self.elements.get(local_name).copied()
    }

    /// Global attribute by local name
    pub fn attribute(&self, local_name: &str) -> Option<AttributeId> {
        self.attributes.get(local_name).copied()
    }

    /// Imported namespaces in first-seen order
    pub fn imports(&self) -> impl Iterator<Item = Option<&str>> {
        self.imports.iter().map(|ns| ns.as_deref())
    }

    /// Whether `namespace` is imported
    pub fn imports_namespace(&self, namespace: Option<&str>) -> bool {
        self.imports.iter().any(|ns| ns.as_deref() == namespace)
    }
}

/// The whole inferred schema: documents, declarations and prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSet {
    documents: IndexMap<Option<String>, SchemaDocument>,
    elements: Vec<ElementDecl>,
    attributes: Vec<AttributeDecl>,
    bindings: NamespaceBindings,
}

impl SchemaSet {
    /// An empty schema set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no document exists yet
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in creation order
    pub fn documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.documents.values()
    }

    /// Number of documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Document for `namespace`
    pub fn document(&self, namespace: Option<&str>) -> Option<&SchemaDocument> {
        self.documents.get(&namespace.map(str::to_string))
    }

    /// Document for `namespace`, created on first encounter
    pub fn document_or_create(&mut self, namespace: Option<&str>) -> &mut SchemaDocument {
        let key = namespace.map(str::to_string);
        self.documents.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(namespace = ?key, "new schema document");
            SchemaDocument::new(key.clone())
        })
    }

    /// Element declaration behind `id`
    pub fn element(&self, id: ElementId) -> &ElementDecl {
        &self.elements[id.0]
    }

    /// Mutable element declaration behind `id`
    pub fn element_mut(&mut self, id: ElementId) -> &mut ElementDecl {
        &mut self.elements[id.0]
    }

    /// Attribute declaration behind `id`
    pub fn attribute(&self, id: AttributeId) -> &AttributeDecl {
        &self.attributes[id.0]
    }

    /// Mutable attribute declaration behind `id`
    pub fn attribute_mut(&mut self, id: AttributeId) -> &mut AttributeDecl {
        &mut self.attributes[id.0]
    }

    /// Number of element declarations, global and local
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of attribute declarations, global and local
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Global element `name` in its namespace's document
    pub fn global_element(&self, namespace: Option<&str>, local_name: &str) -> Option<ElementId> {
        self.document(namespace)?.element(local_name)
    }

    /// Global attribute `name` in its namespace's document
    pub fn global_attribute(
        &self,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<AttributeId> {
        self.document(namespace)?.attribute(local_name)
    }

    /// Find or declare global element `name`. The flag is true when the
    /// declaration was created by this call.
    pub fn ensure_global_element(&mut self, name: &QName) -> (ElementId, bool) {
        if let Some(id) = self.global_element(name.namespace(), &name.local_name) {
            return (id, false);
        }
        let id = self.push_element(ElementDecl::new(name.clone(), Scope::Global));
        self.document_or_create(name.namespace())
            .elements
            .insert(name.local_name.clone(), id);
        tracing::debug!(element = %name, "new global element");
        (id, true)
    }

    /// Declare a local element; the caller links it into a content model
    pub fn add_local_element(&mut self, name: QName, qualified: bool) -> ElementId {
        self.push_element(ElementDecl::new(name, Scope::Local { qualified }))
    }

    /// Find or declare global attribute `name`
    pub fn ensure_global_attribute(&mut self, name: &QName) -> AttributeId {
        if let Some(id) = self.global_attribute(name.namespace(), &name.local_name) {
            return id;
        }
        let id = self.push_attribute(AttributeDecl::new(name.clone(), Scope::Global));
        self.document_or_create(name.namespace())
            .attributes
            .insert(name.local_name.clone(), id);
        tracing::debug!(attribute = %name, "new global attribute");
        id
    }

    /// Declare an unqualified local attribute
    pub fn add_local_attribute(&mut self, name: QName) -> AttributeId {
        self.push_attribute(AttributeDecl::new(name, Scope::Local { qualified: false }))
    }

    /// Record that the document of `from` imports `to`. Both documents are
    /// created if missing; self-imports are ignored.
    pub fn add_import(&mut self, from: Option<&str>, to: Option<&str>) {
        if from == to {
            return;
        }
        self.document_or_create(from);
        self.document_or_create(to);
        let document = self.document_or_create(from);
        if document.imports.insert(to.map(str::to_string)) {
            tracing::debug!(from = ?from, to = ?to, "new import");
        }
    }

    /// Prefix bindings collected from instances
    pub fn bindings(&self) -> &NamespaceBindings {
        &self.bindings
    }

    /// Mutable prefix bindings
    pub fn bindings_mut(&mut self) -> &mut NamespaceBindings {
        &mut self.bindings
    }

    /// Child particle of `parent` named `name`, if its content model has one
    pub fn child(&self, parent: ElementId, name: &QName) -> Option<ElementId> {
        self.element(parent)
            .content
            .elements()
            .find(|id| &self.element(*id).name == name)
    }

    /// Element particle of `parent` for child `name`, with its bounds
    pub fn child_particle(&self, parent: ElementId, name: &QName) -> Option<&Particle> {
        self.element(parent)
            .content
            .particles
            .iter()
            .find(|p| matches!(p.term, Term::Element(id) if &self.element(id).name == name))
    }

    /// Declared attribute of `element` named `name`, with its use
    pub fn attribute_use(&self, element: ElementId, name: &QName) -> Option<AttributeUse> {
        self.element(element)
            .attributes
            .iter()
            .find(|u| &self.attribute(u.attribute).name == name)
            .copied()
    }

    fn push_element(&mut self, decl: ElementDecl) -> ElementId {
        self.elements.push(decl);
        ElementId(self.elements.len() - 1)
    }

    fn push_attribute(&mut self, decl: AttributeDecl) -> AttributeId {
        self.attributes.push(decl);
        AttributeId(self.attributes.len() - 1)
    }
}
