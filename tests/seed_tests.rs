//! Seed schema integration tests
//!
//! Schemas written by the writer must read back into an equivalent graph,
//! and inference must be able to pick up from a schema saved earlier.

use pretty_assertions::assert_eq;
use xmlschema_infer::inference::Primitive;
use xmlschema_infer::schema::{ContentShape, ModelType, Occurs};
use xmlschema_infer::namespaces::XML_NAMESPACE;
use xmlschema_infer::{
    export_schemas, read_schema, read_schemas, write_document, ExportConfig, InferenceError, QName,
    SchemaInference, SchemaSet, SchemaSummary,
};

const ORDER: &str = r#"<order id="17" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <customer>ACME</customer>
  <line sku="A-1"><qty>2</qty><price>9.50</price></line>
  <line sku="B-2"><qty>1</qty><price>12.25</price><note>gift</note></line>
  <shipped xsi:nil="true"/>
</order>"#;

#[test]
fn test_written_schema_reads_back() {
    let inferred = SchemaInference::new().infer_str(ORDER).unwrap();
    let xsd = write_document(&inferred, None).unwrap();
    let seeded = read_schema(&xsd).unwrap();

    assert_eq!(
        SchemaSummary::from_schemas(&seeded).documents,
        SchemaSummary::from_schemas(&inferred).documents
    );
}

#[test]
fn test_seed_details() {
    let inferred = SchemaInference::new().infer_str(ORDER).unwrap();
    let seeded = read_schema(&write_document(&inferred, None).unwrap()).unwrap();
    let order = seeded.global_element(None, "order").unwrap();

    let line = seeded.child_particle(order, &QName::local("line")).unwrap();
    assert_eq!(line.occurs, Occurs::one_or_more());
    let line = line.term.element().unwrap();

    let price = seeded.child(line, &QName::local("price")).unwrap();
    assert_eq!(seeded.element(price).simple_type(), Some(Primitive::Decimal));
    let note = seeded.child_particle(line, &QName::local("note")).unwrap();
    assert_eq!(note.occurs, Occurs::optional());

    let sku = seeded.attribute_use(line, &QName::local("sku")).unwrap();
    assert!(sku.required);

    let shipped = seeded.child(order, &QName::local("shipped")).unwrap();
    assert!(seeded.element(shipped).nillable);
    assert_eq!(seeded.element(shipped).shape(), ContentShape::Empty);
}

#[test]
fn test_seed_is_refined() {
    let first = SchemaInference::new().infer_str(ORDER).unwrap();
    let mut seeded = read_schema(&write_document(&first, None).unwrap()).unwrap();

    let next = r#"<order id="18"><line sku="C-3"><price>abc</price><qty>4</qty></line><customer>X</customer></order>"#;
    SchemaInference::new().infer_str_into(next, &mut seeded).unwrap();

    let order = seeded.global_element(None, "order").unwrap();
    assert_eq!(seeded.element(order).content.model, ModelType::Choice);

    let line = seeded.child(order, &QName::local("line")).unwrap();
    let price = seeded.child(line, &QName::local("price")).unwrap();
    assert_eq!(seeded.element(price).simple_type(), Some(Primitive::String));
}

#[test]
fn test_seed_attribute_demoted() {
    let seed = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="r">
    <xs:complexType>
      <xs:attribute name="x" type="xs:int" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let mut schemas = read_schema(seed).unwrap();
    SchemaInference::new().infer_str_into("<r/>", &mut schemas).unwrap();

    let r = schemas.global_element(None, "r").unwrap();
    assert!(!schemas.attribute_use(r, &QName::local("x")).unwrap().required);
}

#[test]
fn test_seed_new_child_is_optional() {
    let seed = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="r">
    <xs:complexType>
      <xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let mut schemas = read_schema(seed).unwrap();
    SchemaInference::new()
        .infer_str_into("<r><a>x</a><b>1</b></r>", &mut schemas)
        .unwrap();

    let r = schemas.global_element(None, "r").unwrap();
    let b = schemas.child_particle(r, &QName::local("b")).unwrap();
    assert_eq!(b.occurs, Occurs::optional());
}

#[test]
fn test_group_reference_seed_rejected() {
    let seed = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="r">
    <xs:complexType>
      <xs:sequence><xs:group ref="g"/></xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let mut schemas = read_schema(seed).unwrap();
    let err = SchemaInference::new()
        .infer_str_into("<r/>", &mut schemas)
        .unwrap_err();
    assert!(matches!(
        err.inference(),
        Some(InferenceError::UnsupportedConstruct(_))
    ));
}

#[test]
fn test_multi_namespace_export_reads_back() {
    let xml = r#"<m:r xmlns:m="urn:m" xmlns:p="urn:p"><p:item p:code="7">x</p:item><c>1</c></m:r>"#;
    let inferred = SchemaInference::new().infer_str(xml).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let result = export_schemas(&inferred, &ExportConfig::new(dir.path())).unwrap();
    assert_eq!(result.file_count(), 2);

    let texts: Vec<String> = result
        .exported
        .iter()
        .map(|e| std::fs::read_to_string(&e.path).unwrap())
        .collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let seeded = read_schemas(&refs).unwrap();

    let r = seeded.global_element(Some("urn:m"), "r").unwrap();
    let item = seeded.global_element(Some("urn:p"), "item").unwrap();
    assert_eq!(seeded.child(r, &QName::namespaced("urn:p", "item")), Some(item));
    let c = seeded.child(r, &QName::local("c")).unwrap();
    assert!(seeded.element(c).is_unqualified_local());
    assert!(seeded
        .attribute_use(item, &QName::namespaced("urn:p", "code"))
        .is_some());
}

/// Export `schemas` into a fresh directory and return the written texts in order
fn exported_texts(schemas: &SchemaSet) -> Vec<String> {
    let dir = tempfile::tempdir().unwrap();
    let result = export_schemas(schemas, &ExportConfig::new(dir.path())).unwrap();
    result
        .exported
        .iter()
        .map(|e| std::fs::read_to_string(&e.path).unwrap())
        .collect()
}

/// Infer `xml`, seed from the exported set, infer `xml` again and export
fn reinfer_from_export(xml: &str) -> (Vec<String>, Vec<String>) {
    let inference = SchemaInference::new();
    let first = exported_texts(&inference.infer_str(xml).unwrap());

    let refs: Vec<&str> = first.iter().map(String::as_str).collect();
    let mut seeded = read_schemas(&refs).unwrap();
    inference.infer_str_into(xml, &mut seeded).unwrap();
    (first, exported_texts(&seeded))
}

#[test]
fn test_xml_attribute_seed_is_idempotent() {
    let xml = r#"<r xml:lang="en"><a>1</a></r>"#;
    let inference = SchemaInference::new();
    let first = write_document(&inference.infer_str(xml).unwrap(), None).unwrap();

    let mut seeded = read_schema(&first).unwrap();
    let r = seeded.global_element(None, "r").unwrap();
    let lang = seeded
        .attribute_use(r, &QName::namespaced(XML_NAMESPACE, "lang"))
        .unwrap();
    assert!(lang.required);

    inference.infer_str_into(xml, &mut seeded).unwrap();
    assert_eq!(write_document(&seeded, None).unwrap(), first);
}

#[test]
fn test_xml_attribute_export_is_idempotent() {
    let (first, second) = reinfer_from_export(r#"<r xml:lang="en" xml:space="preserve"><a>1</a></r>"#);
    assert_eq!(first.len(), 1);
    assert!(first[0].contains(r#"schemaLocation="http://www.w3.org/2001/xml.xsd""#));
    assert_eq!(second, first);
}

#[test]
fn test_multi_namespace_seed_is_idempotent() {
    let (first, second) = reinfer_from_export(
        r#"<m:r xmlns:m="urn:m" xmlns:p="urn:p" p:code="1"><p:item>x</p:item><c>2</c></m:r>"#,
    );
    assert_eq!(first.len(), 2);
    assert!(first[0].contains(r#"<xs:element ref="p:item"/>"#));
    assert!(first[0].contains(r#"<xs:attribute ref="p:code" use="required"/>"#));
    assert!(first[1].contains(r#"<xs:attribute name="code" type="xs:unsignedByte"/>"#));
    assert_eq!(second, first);
}
