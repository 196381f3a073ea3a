//! Compatibility Tests
//!
//! "Higher accepts lower" on top of equality.

use schema_compare::{
    compatible_type_comparator, is_compatible_type, is_compatible_type_with, CompareContext,
    CompareError, CompareOptions, DiagnosticCode, Schema, SchemaKind,
};

fn person() -> Schema {
    Schema::object([("name", Schema::string()), ("age", Schema::number())])
}

fn named() -> Schema {
    Schema::object([("name", Schema::string())])
}

#[test]
fn test_equal_types_are_compatible() {
    assert!(is_compatible_type(&Schema::string(), &Schema::string()).unwrap());
    assert!(is_compatible_type(&person(), &person()).unwrap());
}

#[test]
fn test_no_cross_kind_compatibility() {
    assert!(!is_compatible_type(&Schema::string(), &Schema::number()).unwrap());
    assert!(!is_compatible_type(&Schema::array(Schema::string()), &named()).unwrap());
}

#[test]
fn test_object_superset() {
    assert!(is_compatible_type(&person(), &named()).unwrap());
    assert!(!is_compatible_type(&named(), &person()).unwrap());

    let renamed = Schema::object([("title", Schema::string())]);
    assert!(!is_compatible_type(&person(), &renamed).unwrap());
}

#[test]
fn test_object_fields_compared_by_compatibility() {
    let higher = Schema::object([("owner", person()), ("id", Schema::string())]);
    let lower = Schema::object([("owner", named())]);
    assert!(is_compatible_type(&higher, &lower).unwrap());
    assert!(!is_compatible_type(&lower, &higher).unwrap());
}

#[test]
fn test_array_covariance() {
    let higher = Schema::array(person());
    let lower = Schema::array(named());
    assert!(is_compatible_type(&higher, &lower).unwrap());
    assert!(!is_compatible_type(&lower, &higher).unwrap());
}

#[test]
fn test_tuple_length_and_rest() {
    let ss = Schema::tuple([Schema::string(), Schema::string()]);
    let s = Schema::tuple([Schema::string()]);
    let s_rest = Schema::tuple_with_rest([Schema::string()], Schema::number());
    assert!(is_compatible_type(&ss, &s).unwrap());
    assert!(!is_compatible_type(&s, &ss).unwrap());
    assert!(!is_compatible_type(&s, &s_rest).unwrap());

    let ss_rest = Schema::tuple_with_rest([Schema::string(), Schema::string()], Schema::number());
    assert!(is_compatible_type(&ss_rest, &s_rest).unwrap());
    assert!(is_compatible_type(&s_rest, &s).unwrap());
}

#[test]
fn test_union_direction() {
    let a = Schema::string();
    let b = Schema::number();
    let a_or_b = a.or(&b);
    assert!(is_compatible_type(&a, &a_or_b).unwrap());
    assert!(!is_compatible_type(&a_or_b, &a).unwrap());

    // both unions: every higher option is accepted by some lower option
    let a_or_b_or_c = Schema::union([a.clone(), b.clone(), Schema::boolean()]);
    assert!(is_compatible_type(&a_or_b, &a_or_b_or_c).unwrap());
    assert!(!is_compatible_type(&a_or_b_or_c, &a_or_b).unwrap());
}

#[test]
fn test_optional_and_nullable_lower_unwrapped() {
    let s = Schema::string();
    assert!(is_compatible_type(&s, &s.optional()).unwrap());
    assert!(is_compatible_type(&s, &s.nullable().optional()).unwrap());
    assert!(!is_compatible_type(&s.optional(), &s).unwrap());
    assert!(!is_compatible_type(&Schema::number(), &s.optional()).unwrap());
}

#[test]
fn test_options_reach_equality() {
    let s = Schema::string();
    let options = CompareOptions {
        ignore_optional: true,
        ..CompareOptions::preset()
    };
    assert!(is_compatible_type_with(&s.optional(), &s, &options).unwrap());
}

#[test]
fn test_interceptor_applies_to_compatibility() {
    // `unknown` accepts anything
    let options = CompareOptions::preset()
        .with_interceptor(|higher, _, _| (higher.kind() == SchemaKind::Unknown).then_some(true));
    let higher = Schema::object([("payload", Schema::unknown())]);
    let lower = Schema::object([("payload", person())]);
    assert!(is_compatible_type_with(&higher, &lower, &options).unwrap());
    assert!(!is_compatible_type(&higher, &lower).unwrap());
}

#[test]
fn test_undetermined_kinds_are_errors() {
    let higher = Schema::record(Schema::string(), Schema::number());
    let lower = Schema::record(Schema::string(), Schema::string());
    let err = is_compatible_type(&higher, &lower).unwrap_err();
    assert!(matches!(err, CompareError::UndeterminedCompatibility { .. }));

    let err = is_compatible_type(&Schema::transform(), &Schema::transform()).unwrap_err();
    assert!(matches!(err, CompareError::UndeterminedCompatibility { .. }));
}

#[test]
fn test_unrecognized_kinds_are_errors() {
    let err = is_compatible_type(&Schema::string(), &Schema::unrecognized("effects")).unwrap_err();
    assert!(matches!(err, CompareError::UnrecognizedKind(kind) if kind == "effects"));
}

#[test]
fn test_errors_propagate_from_nested_pairs() {
    let higher = Schema::object([("meta", Schema::record(Schema::string(), Schema::number()))]);
    let lower = Schema::object([("meta", Schema::record(Schema::string(), Schema::boolean()))]);
    assert!(is_compatible_type(&higher, &lower).is_err());
}

#[test]
fn test_equality_diagnostics_are_kept() {
    let mut context = CompareContext::with_stack();
    let higher = Schema::string().catch();
    let lower = Schema::string().catch();
    assert!(compatible_type_comparator()
        .compare_with(&higher, &lower, &mut context)
        .unwrap());
    assert!(context
        .diagnostics()
        .iter()
        .any(|d| d.code == DiagnosticCode::UnstableComparison));
    // the equality run keeps its own trail
    assert_eq!(context.rule_names(), vec!["is same type"]);
}
