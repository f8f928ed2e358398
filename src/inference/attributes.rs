//! Attribute merger

use std::collections::HashSet;

use crate::error::{InferenceError, Result};
use crate::namespaces::{XMLNS_NAMESPACE, XSD_NAMESPACE, XSI_NAMESPACE};
use crate::reader::XmlAttribute;
use crate::schema::{AttributeId, AttributeUse, SchemaSet};

use super::content::Frame;
use super::narrowing::TypeNarrower;
use super::options::Occurrence;

/// `xsi:` attributes that carry no schema information of their own
const IGNORED_XSI: [&str; 3] = ["type", "schemaLocation", "noNamespaceSchemaLocation"];

/// Fold the attributes of one instance into `frame.element`.
///
/// Returns true when the instance is `xsi:nil`.
pub fn merge_attributes(
    schemas: &mut SchemaSet,
    frame: &Frame,
    attributes: &[XmlAttribute],
    occurrence: Occurrence,
    narrower: &TypeNarrower,
) -> Result<bool> {
    let element = frame.element;
    let first_instance = schemas.element(element).instances == 0;
    let mut seen: HashSet<AttributeId> = HashSet::new();
    let mut nil = false;

    for attribute in attributes {
        let name = &attribute.name;
        match name.namespace() {
            Some(XMLNS_NAMESPACE) => {
                schemas
                    .bindings_mut()
                    .bind(name.local_name.as_str(), attribute.value.as_str());
                continue;
            }
            Some(XSD_NAMESPACE) => {
                return Err(InferenceError::DisallowedNamespace {
                    namespace: XSD_NAMESPACE.to_string(),
                    detail: format!(
                        "attribute '{}' on element '{}'",
                        name.local_name,
                        schemas.element(element).name
                    ),
                }
                .into());
            }
            Some(XSI_NAMESPACE) => {
                if name.local_name == "nil" {
                    if matches!(attribute.value.trim(), "true" | "1") {
                        schemas.element_mut(element).nillable = true;
                        nil = true;
                    }
                } else if !IGNORED_XSI.contains(&name.local_name.as_str()) {
                    return Err(InferenceError::DisallowedNamespace {
                        namespace: XSI_NAMESPACE.to_string(),
                        detail: format!("unrecognized attribute 'xsi:{}'", name.local_name),
                    }
                    .into());
                }
                continue;
            }
            _ => {}
        }

        let id = match schemas.attribute_use(element, name) {
            Some(existing) => existing.attribute,
            None => {
                let id = match name.namespace() {
                    None => schemas.add_local_attribute(name.clone()),
                    Some(namespace) => {
                        let id = schemas.ensure_global_attribute(name);
                        schemas.add_import(frame.home.as_deref(), Some(namespace));
                        id
                    }
                };
                let required = first_instance && occurrence == Occurrence::Restricted;
                schemas
                    .element_mut(element)
                    .attributes
                    .push(AttributeUse::new(id, required));
                id
            }
        };

        schemas
            .attribute_mut(id)
            .value
            .observe(&attribute.value, narrower);
        seen.insert(id);
    }

    demote_absent(schemas, frame, &seen);
    Ok(nil)
}

/// Required attributes missing from this instance become optional
fn demote_absent(schemas: &mut SchemaSet, frame: &Frame, seen: &HashSet<AttributeId>) {
    let absent: Vec<AttributeId> = schemas
        .element(frame.element)
        .attributes
        .iter()
        .filter(|u| u.required && !seen.contains(&u.attribute))
        .map(|u| u.attribute)
        .collect();

    for id in absent {
        tracing::debug!(
            element = %schemas.element(frame.element).name,
            attribute = %schemas.attribute(id).name,
            "attribute demoted to optional"
        );
        let decl = schemas.element_mut(frame.element);
        if let Some(attribute_use) = decl.attributes.iter_mut().find(|u| u.attribute == id) {
            attribute_use.required = false;
        }
    }
}
