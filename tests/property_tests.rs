//! Property-based tests for schema inference
//!
//! These tests use proptest to check the ordering and fallback guarantees
//! across randomly generated names and values.

use proptest::prelude::*;
use xmlschema_infer::inference::{Primitive, TypeInference, TypeNarrower};
use xmlschema_infer::schema::ModelType;
use xmlschema_infer::{QName, SchemaInference, SchemaSet};

// Strategy: Generate two distinct XML element names
fn distinct_names() -> impl Strategy<Value = (String, String)> {
    (
        prop::string::string_regex("[a-z][a-z0-9]{0,6}").unwrap(),
        prop::string::string_regex("[a-z][a-z0-9]{0,6}").unwrap(),
    )
        .prop_filter("names must differ", |(a, b)| a != b)
}

// Strategy: Generate leaf values that hit every branch of the classifier
fn leaf_value() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-zA-Z ]{0,20}").unwrap(),
        prop::num::i64::ANY.prop_map(|n| n.to_string()),
        prop::num::u64::ANY.prop_map(|n| n.to_string()),
        prop::num::f64::NORMAL.prop_map(|f| format!("{:.3}", f)),
        prop::num::f64::NORMAL.prop_map(|f| format!("{:E}", f)),
        prop::bool::ANY.prop_map(|b| b.to_string()),
        prop::string::string_regex("[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9]{2}:[0-9]{2}:[0-9]{2})?").unwrap(),
        prop::string::string_regex("-?P[0-9]{1,3}Y([0-9]{1,2}M)?(T[0-9]{1,2}H)?").unwrap(),
        prop::string::string_regex("[0-9+\\-.:TZEP]{0,12}").unwrap(),
    ]
}

fn pair_document(first: &str, second: &str) -> String {
    format!("<r><{first}/><{second}/></r>")
}

fn member_names(schemas: &SchemaSet) -> Vec<String> {
    let root = schemas.global_element(None, "r").unwrap();
    let mut names: Vec<String> = schemas
        .element(root)
        .content
        .elements()
        .map(|id| schemas.element(id).name.local_name.clone())
        .collect();
    names.sort();
    names
}

proptest! {
    #[test]
    fn test_swapped_siblings_promote_to_choice((a, b) in distinct_names()) {
        let inference = SchemaInference::new();
        let mut expected = vec![a.clone(), b.clone()];
        expected.sort();

        for (first, second) in [(&a, &b), (&b, &a)] {
            let mut schemas = SchemaSet::new();
            inference.infer_str_into(&pair_document(first, second), &mut schemas).unwrap();
            inference.infer_str_into(&pair_document(second, first), &mut schemas).unwrap();

            let root = schemas.global_element(None, "r").unwrap();
            prop_assert_eq!(schemas.element(root).content.model, ModelType::Choice);
            prop_assert_eq!(member_names(&schemas), expected.clone());
        }
    }

    #[test]
    fn test_narrowing_never_fails(values in prop::collection::vec(leaf_value(), 0..8)) {
        let narrower = TypeNarrower::default();
        let _ = narrower.infer(values.iter().map(String::as_str));
    }

    #[test]
    fn test_narrowing_is_order_independent(a in leaf_value(), b in leaf_value()) {
        let narrower = TypeNarrower::default();
        prop_assert_eq!(
            narrower.infer([a.as_str(), b.as_str()]),
            narrower.infer([b.as_str(), a.as_str()])
        );
    }

    #[test]
    fn test_incremental_matches_history(values in prop::collection::vec(leaf_value(), 1..8)) {
        let narrower = TypeNarrower::default();
        let mut accumulated = None;
        for value in &values {
            accumulated = Some(narrower.observe(accumulated, value));
        }
        let incremental = accumulated.map(|c| narrower.resolve(c));
        prop_assert_eq!(incremental, Some(narrower.infer(values.iter().map(String::as_str))));
    }

    #[test]
    fn test_string_is_absorbing(values in prop::collection::vec(leaf_value(), 0..6)) {
        let narrower = TypeNarrower::default();
        let mut history = vec!["not a number"];
        history.extend(values.iter().map(String::as_str));
        prop_assert_eq!(narrower.infer(history), Primitive::String);
    }

    #[test]
    fn test_relaxed_mode_types_everything_as_string(value in leaf_value()) {
        let narrower = TypeNarrower::new(TypeInference::Relaxed);
        prop_assert_eq!(narrower.infer([value.as_str()]), Primitive::String);
    }

    #[test]
    fn test_leaf_documents_always_infer(value in leaf_value()) {
        let xml = format!("<r><v>{}</v></r>", value);
        let schemas = SchemaInference::new().infer_str(&xml).unwrap();
        let root = schemas.global_element(None, "r").unwrap();
        prop_assert!(schemas.child(root, &QName::local("v")).is_some());
    }
}
