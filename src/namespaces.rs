//! Namespaces and qualified names
//!
//! Declarations are partitioned by namespace URI: every [`QName`] the
//! inference sees is already resolved, so prefixes only matter again when
//! a schema is written out. [`NamespaceBindings`] keeps the prefixes the
//! instances used for that purpose.

use indexmap::IndexMap;
use std::fmt;

/// The XML Schema namespace; never allowed in an instance
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// The schema-instance namespace (`xsi:nil`, `xsi:type`, ...)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of `xmlns` declarations, as the reader reports them
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Resolved element or attribute name.
///
/// Displays in the `{namespace}localName` form, or as the bare local name
/// when there is no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// `None` for names in no namespace
    pub namespace: Option<String>,
    /// Name without prefix
    pub local_name: String,
}

impl QName {
    /// Name from an optional namespace
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(Into::into),
            local_name: local_name.into(),
        }
    }

    /// Name in no namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new(None::<String>, local_name)
    }

    /// Name in `namespace`
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name)
    }

    /// Namespace as a borrowed option
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether the name lives in `namespace`
    pub fn is_in(&self, namespace: Option<&str>) -> bool {
        self.namespace() == namespace
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{{{}}}", namespace)?;
        }
        f.write_str(&self.local_name)
    }
}

/// Prefix bindings observed in instance documents.
///
/// A prefix keeps the namespace it was first bound to; later rebindings of
/// the same prefix are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceBindings {
    prefixes: IndexMap<String, String>,
}

impl NamespaceBindings {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `prefix` as bound to `namespace`. Returns false when ignored.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> bool {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if prefix.is_empty() || prefix == "xml" || prefix == "xmlns" || namespace.is_empty() {
            return false;
        }
        if self.prefixes.contains_key(&prefix) {
            return false;
        }
        self.prefixes.insert(prefix, namespace);
        true
    }

    /// Namespace `prefix` was first bound to
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// First prefix bound to `namespace`
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(p, _)| p.as_str())
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no binding has been recorded
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
