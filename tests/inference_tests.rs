//! Inference integration tests
//!
//! End-to-end scenarios over XML text: structure, occurrence bounds, types,
//! namespaces, failure classes, and refinement across documents.

use pretty_assertions::assert_eq;
use xmlschema_infer::inference::Primitive;
use xmlschema_infer::schema::{ContentShape, ElementId, ModelType, Occurs};
use xmlschema_infer::{
    read_schema, write_document, Error, InferenceError, Occurrence, QName, SchemaInference,
    SchemaSet, TypeInference,
};

fn infer_all(docs: &[&str]) -> SchemaSet {
    let inference = SchemaInference::new();
    let mut schemas = SchemaSet::new();
    for doc in docs {
        inference.infer_str_into(doc, &mut schemas).unwrap();
    }
    schemas
}

fn root(schemas: &SchemaSet) -> ElementId {
    schemas.global_element(None, "r").unwrap()
}

fn leaf_type(schemas: &SchemaSet, parent: ElementId, name: &str) -> Option<Primitive> {
    let child = schemas.child(parent, &QName::local(name)).unwrap();
    schemas.element(child).simple_type()
}

fn inference_error(err: Error) -> InferenceError {
    match err {
        Error::Inference(e) => e,
        other => panic!("expected inference error, got {:?}", other),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_leaf_child() {
    let schemas = infer_all(&["<r><a>1</a></r>"]);
    let r = root(&schemas);

    assert_eq!(schemas.element(r).shape(), ContentShape::ElementOnly);
    let a = schemas.child_particle(r, &QName::local("a")).unwrap();
    assert_eq!(a.occurs, Occurs::once());
    assert_eq!(leaf_type(&schemas, r, "a"), Some(Primitive::UnsignedByte));
}

#[test]
fn test_repeated_child_is_unbounded() {
    let schemas = infer_all(&["<r><a>1</a><a>2</a></r>"]);
    let a = schemas.child_particle(root(&schemas), &QName::local("a")).unwrap();
    assert_eq!(a.occurs, Occurs::one_or_more());
}

#[test]
fn test_reordered_children_promote_to_choice() {
    let schemas = infer_all(&["<r><a/><b/></r>", "<r><b/><a/></r>"]);
    let content = &schemas.element(root(&schemas)).content;

    assert_eq!(content.model, ModelType::Choice);
    assert!(content.occurs.is_unbounded());
    let names: Vec<_> = content
        .elements()
        .map(|id| schemas.element(id).name.local_name.clone())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_missing_attribute_becomes_optional() {
    let schemas = infer_all(&[r#"<r x="5"/>"#, "<r/>"]);
    let x = schemas.attribute_use(root(&schemas), &QName::local("x")).unwrap();

    assert!(!x.required);
    assert_eq!(schemas.attribute(x.attribute).value.resolve(), Primitive::UnsignedByte);
}

#[test]
fn test_date_and_datetime() {
    let schemas = infer_all(&["<r>2024-01-01</r>"]);
    assert_eq!(schemas.element(root(&schemas)).simple_type(), Some(Primitive::Date));

    let schemas = infer_all(&["<r>2024-01-01T10:00:00</r>"]);
    assert_eq!(schemas.element(root(&schemas)).simple_type(), Some(Primitive::DateTime));
}

#[test]
fn test_text_value_forces_string() {
    let schemas = infer_all(&["<r><a>1</a><a>2</a><a>abc</a><a>3</a></r>"]);
    assert_eq!(leaf_type(&schemas, root(&schemas), "a"), Some(Primitive::String));

    let schemas = infer_all(&["<r><a>1</a></r>", "<r><a>abc</a></r>", "<r><a>2</a></r>"]);
    assert_eq!(leaf_type(&schemas, root(&schemas), "a"), Some(Primitive::String));
}

// ============================================================================
// Occurrence and content shape
// ============================================================================

#[test]
fn test_attribute_present_in_all_instances_stays_required() {
    let schemas = infer_all(&[r#"<r x="1"/>"#, r#"<r x="2"/>"#]);
    let x = schemas.attribute_use(root(&schemas), &QName::local("x")).unwrap();
    assert!(x.required);
}

#[test]
fn test_child_missing_from_later_instance_is_optional() {
    let schemas = infer_all(&["<r><a/><b/></r>", "<r><a/></r>"]);
    let r = root(&schemas);
    let a = schemas.child_particle(r, &QName::local("a")).unwrap();
    let b = schemas.child_particle(r, &QName::local("b")).unwrap();
    assert_eq!(a.occurs, Occurs::once());
    assert_eq!(b.occurs, Occurs::optional());
}

#[test]
fn test_child_first_seen_later_is_optional() {
    let schemas = infer_all(&["<r><a/></r>", "<r><a/><b/></r>"]);
    let b = schemas.child_particle(root(&schemas), &QName::local("b")).unwrap();
    assert_eq!(b.occurs, Occurs::optional());
}

#[test]
fn test_nested_instances_refine_shared_declaration() {
    let schemas = infer_all(&["<r><item><n>1</n></item><item><n>2</n><tag>x</tag></item></r>"]);
    let r = root(&schemas);
    let item = schemas.child(r, &QName::local("item")).unwrap();

    let item_particle = schemas.child_particle(r, &QName::local("item")).unwrap();
    assert_eq!(item_particle.occurs, Occurs::one_or_more());
    let tag = schemas.child_particle(item, &QName::local("tag")).unwrap();
    assert_eq!(tag.occurs, Occurs::optional());
    assert_eq!(leaf_type(&schemas, item, "n"), Some(Primitive::UnsignedByte));
}

#[test]
fn test_mixed_content_flag_is_permanent() {
    let schemas = infer_all(&["<r><p>plain <b>bold</b></p></r>", "<r><p><b>x</b></p></r>"]);
    let p = schemas.child(root(&schemas), &QName::local("p")).unwrap();
    assert_eq!(schemas.element(p).shape(), ContentShape::Mixed);
    assert_eq!(schemas.element(p).simple_type(), None);
}

#[test]
fn test_text_then_children_is_mixed_in_either_order() {
    let first = infer_all(&["<r><p>5</p></r>", "<r><p><b/></p></r>"]);
    let second = infer_all(&["<r><p><b/></p></r>", "<r><p>5</p></r>"]);
    for schemas in [first, second] {
        let p = schemas.child(root(&schemas), &QName::local("p")).unwrap();
        assert_eq!(schemas.element(p).shape(), ContentShape::Mixed);
    }
}

#[test]
fn test_empty_and_text_resolves_to_string() {
    let schemas = infer_all(&["<r><a>7</a><a/></r>"]);
    assert_eq!(leaf_type(&schemas, root(&schemas), "a"), Some(Primitive::String));
}

#[test]
fn test_nillable_element() {
    let schemas = infer_all(&[
        r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><a>3</a><a xsi:nil="true"/></r>"#,
    ]);
    let a = schemas.child(root(&schemas), &QName::local("a")).unwrap();
    assert!(schemas.element(a).nillable);
    assert_eq!(schemas.element(a).simple_type(), Some(Primitive::UnsignedByte));
}

#[test]
fn test_relaxed_occurrence() {
    let inference = SchemaInference::new().with_occurrence(Occurrence::Relaxed);
    let schemas = inference.infer_str(r#"<r x="1"><a/></r>"#).unwrap();
    let r = root(&schemas);

    let a = schemas.child_particle(r, &QName::local("a")).unwrap();
    assert_eq!(a.occurs, Occurs::zero_or_more());
    assert!(!schemas.attribute_use(r, &QName::local("x")).unwrap().required);
}

#[test]
fn test_relaxed_type_inference() {
    let inference = SchemaInference::new().with_type_inference(TypeInference::Relaxed);
    let schemas = inference.infer_str(r#"<r x="1"><a>2</a></r>"#).unwrap();
    let r = root(&schemas);

    assert_eq!(leaf_type(&schemas, r, "a"), Some(Primitive::String));
    let x = schemas.attribute_use(r, &QName::local("x")).unwrap();
    assert_eq!(schemas.attribute(x.attribute).value.resolve(), Primitive::String);
}

// ============================================================================
// Namespaces
// ============================================================================

#[test]
fn test_one_document_per_namespace() {
    let schemas = infer_all(&[
        r#"<m:r xmlns:m="urn:m" xmlns:p="urn:p" p:code="1"><p:item>x</p:item><c/></m:r>"#,
    ]);

    assert_eq!(schemas.document_count(), 2);
    let r = schemas.global_element(Some("urn:m"), "r").unwrap();
    let item = schemas.global_element(Some("urn:p"), "item").unwrap();
    assert_eq!(schemas.child(r, &QName::namespaced("urn:p", "item")), Some(item));
    assert!(schemas.global_attribute(Some("urn:p"), "code").is_some());

    let c = schemas.child(r, &QName::local("c")).unwrap();
    assert!(schemas.element(c).is_unqualified_local());

    let main = schemas.document(Some("urn:m")).unwrap();
    assert!(main.imports_namespace(Some("urn:p")));
    assert_eq!(schemas.bindings().get_namespace("p"), Some("urn:p"));
}

#[test]
fn test_default_namespace_children_are_local() {
    let schemas = infer_all(&[r#"<r xmlns="urn:d"><a>1</a></r>"#]);
    let r = schemas.global_element(Some("urn:d"), "r").unwrap();
    let a = schemas.child(r, &QName::namespaced("urn:d", "a")).unwrap();

    assert!(!schemas.element(a).is_global());
    assert_eq!(schemas.document_count(), 1);
}

#[test]
fn test_xsi_type_and_schema_location_ignored() {
    let schemas = infer_all(&[
        r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:a a.xsd" xsi:type="T"/>"#,
    ]);
    assert!(schemas.element(root(&schemas)).attributes.is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_no_root() {
    let err = SchemaInference::new().infer_str("<!-- nothing -->").unwrap_err();
    assert_eq!(inference_error(err), InferenceError::NoRoot);
}

#[test]
fn test_schema_namespace_disallowed() {
    let err = SchemaInference::new()
        .infer_str(r#"<r xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element/></r>"#)
        .unwrap_err();
    assert!(matches!(
        inference_error(err),
        InferenceError::DisallowedNamespace { .. }
    ));
}

#[test]
fn test_unknown_xsi_attribute_disallowed() {
    let err = SchemaInference::new()
        .infer_str(r#"<r xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:bogus="1"/>"#)
        .unwrap_err();
    assert!(matches!(
        inference_error(err),
        InferenceError::DisallowedNamespace { .. }
    ));
}

#[test]
fn test_entity_reference_unsupported() {
    let err = SchemaInference::new().infer_str("<r>&custom;</r>").unwrap_err();
    assert!(matches!(
        inference_error(err),
        InferenceError::UnsupportedConstruct(_)
    ));
}

#[test]
fn test_wildcard_seed_rejected() {
    let seed = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="r"><xs:complexType><xs:sequence><xs:any/></xs:sequence></xs:complexType></xs:element>
</xs:schema>"#;
    let mut schemas = read_schema(seed).unwrap();
    let before = schemas.clone();

    let err = SchemaInference::new()
        .infer_str_into("<r><a/></r>", &mut schemas)
        .unwrap_err();
    assert!(matches!(
        inference_error(err),
        InferenceError::UnsupportedConstruct(_)
    ));
    assert_eq!(schemas, before);
}

#[test]
fn test_failure_leaves_schema_untouched() {
    let inference = SchemaInference::new();
    let mut schemas = inference.infer_str(r#"<r x="1"><a>1</a></r>"#).unwrap();
    let before = schemas.clone();

    assert!(inference.infer_str_into("<r><a>x</a><b>", &mut schemas).is_err());
    assert_eq!(schemas, before);
    assert!(inference.infer_str_into("", &mut schemas).is_err());
    assert_eq!(schemas, before);
}

// ============================================================================
// Refinement
// ============================================================================

#[test]
fn test_reinference_is_idempotent() {
    let doc = r#"<r id="3"><a>1</a><a>2</a><b flag="true">x</b><c/></r>"#;
    let inference = SchemaInference::new();
    let mut schemas = inference.infer_str(doc).unwrap();
    let first = write_document(&schemas, None).unwrap();

    inference.infer_str_into(doc, &mut schemas).unwrap();
    assert_eq!(write_document(&schemas, None).unwrap(), first);
}

#[test]
fn test_reinference_over_written_schema_is_idempotent() {
    let doc = r#"<r id="3"><a>1</a><a>2</a><b flag="true">x</b><c/></r>"#;
    let inference = SchemaInference::new();
    let first = write_document(&inference.infer_str(doc).unwrap(), None).unwrap();

    let mut seeded = read_schema(&first).unwrap();
    inference.infer_str_into(doc, &mut seeded).unwrap();
    assert_eq!(write_document(&seeded, None).unwrap(), first);
}

#[test]
fn test_refinement_only_loosens() {
    let schemas = infer_all(&[
        r#"<r v="1"><a>1</a><b/></r>"#,
        r#"<r><a>300</a><a>-2</a></r>"#,
    ]);
    let r = root(&schemas);

    assert_eq!(leaf_type(&schemas, r, "a"), Some(Primitive::Short));
    let a = schemas.child_particle(r, &QName::local("a")).unwrap();
    assert_eq!(a.occurs, Occurs::one_or_more());
    let b = schemas.child_particle(r, &QName::local("b")).unwrap();
    assert_eq!(b.occurs, Occurs::optional());
    assert!(!schemas.attribute_use(r, &QName::local("v")).unwrap().required);
}
