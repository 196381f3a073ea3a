//! Document Loading Tests
//!
//! JSON fixtures loaded into schema trees and compared end to end.

use std::path::{Path, PathBuf};

use schema_compare::{
    compatible_type_comparator, document, is_compatible_type, is_same_type, same_type_comparator,
    CompareContext, CompareError, DiagnosticCode, LiteralValue, SchemaDef, SchemaKind,
};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(json: &str) -> document::LoadedDocument {
    document::from_str(json).unwrap()
}

#[test]
fn test_recursive_definitions_compare_equal() {
    let v1 = load(include_str!("fixtures/category_v1.json"));
    let v2 = load(include_str!("fixtures/category_v2.json"));
    assert_eq!(v1.root().kind(), SchemaKind::Lazy);
    assert!(is_same_type(v1.root(), v2.root()).unwrap());
    assert!(is_compatible_type(v1.root(), v2.root()).unwrap());
}

#[test]
fn test_definitions_are_exposed() {
    let v1 = load(include_str!("fixtures/category_v1.json"));
    assert_eq!(v1.definition_names(), vec!["Category"]);
    let category = v1.definition("Category").unwrap();
    assert_eq!(category.description(), Some("A node in the category tree"));
    let SchemaDef::Object { shape } = category.def() else {
        panic!("expected object, got {:?}", category.kind());
    };
    assert!(matches!(
        shape["slug"].def(),
        SchemaDef::Branded { brand: Some(brand), .. } if brand == "Slug"
    ));
}

#[test]
fn test_added_fields_are_compatible() {
    let v1 = load(include_str!("fixtures/user_v1.json"));
    let v2 = load(include_str!("fixtures/user_v2.json"));
    assert!(!is_same_type(v1.root(), v2.root()).unwrap());
    assert!(is_compatible_type(v2.root(), v1.root()).unwrap());
    assert!(!is_compatible_type(v1.root(), v2.root()).unwrap());
}

#[test]
fn test_union_of_objects_with_references() {
    let a = load(include_str!("fixtures/event.json"));
    let b = load(include_str!("fixtures/event.json"));
    let mut context = CompareContext::with_stack();
    assert!(same_type_comparator()
        .compare_with(a.root(), b.root(), &mut context)
        .unwrap());
    assert!(context.rule_names().contains(&"compare lazy"));
}

#[test]
fn test_wrappers_and_literals_load() {
    let a = load(include_str!("fixtures/wrappers.json"));
    let b = load(include_str!("fixtures/wrappers.json"));

    let SchemaDef::Object { shape } = a.root().def() else {
        panic!("expected object");
    };
    assert_eq!(shape["count"].kind(), SchemaKind::Default);
    assert_eq!(shape["parse"].kind(), SchemaKind::Pipe);
    assert_eq!(shape["key"].kind(), SchemaKind::TemplateLiteral);
    let SchemaDef::Literal { values } = shape["limit"].def() else {
        panic!("expected literal");
    };
    assert_eq!(values[0], LiteralValue::BigInt(9007199254740993));

    let mut context = CompareContext::new();
    assert!(compatible_type_comparator()
        .compare_with(a.root(), b.root(), &mut context)
        .unwrap());
    assert!(context
        .diagnostics()
        .iter()
        .all(|d| d.code == DiagnosticCode::UnstableComparison));
}

#[test]
fn test_unrecognized_kinds() {
    let a = load(include_str!("fixtures/effects.json"));
    let b = load(include_str!("fixtures/effects.json"));

    let mut context = CompareContext::new();
    assert!(!same_type_comparator()
        .compare_with(a.root(), b.root(), &mut context)
        .unwrap());
    assert_eq!(context.diagnostics()[0].code, DiagnosticCode::UnrecognizedKind);
    assert_eq!(context.diagnostics()[0].left, "effects");

    let err = is_compatible_type(a.root(), b.root()).unwrap_err();
    assert!(matches!(err, CompareError::UnrecognizedKind(kind) if kind == "effects"));
}

#[test]
fn test_unresolved_reference_is_rejected() {
    let err = document::from_str(include_str!("fixtures/invalid_ref.json")).unwrap_err();
    assert!(matches!(err, CompareError::InvalidDocument(msg) if msg.contains("Leaf")));
}

#[test]
fn test_malformed_json_is_rejected() {
    assert!(matches!(
        document::from_str("{ \"schema\": "),
        Err(CompareError::Json(_))
    ));
}

#[test]
fn test_load_from_path() {
    let doc = document::from_path(fixtures_path().join("user_v1.json")).unwrap();
    assert_eq!(doc.root().kind(), SchemaKind::Object);

    let missing = document::from_path(fixtures_path().join("missing.json"));
    assert!(matches!(missing, Err(CompareError::Io(_))));
}
