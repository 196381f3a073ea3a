//! Equality Tests
//!
//! Behaviour of the preset and options-driven "same type" comparators.

use std::sync::{Arc, OnceLock};

use schema_compare::{
    is_same_type, is_same_type_with, same_type_comparator, CompareContext, CompareOptions,
    DiagnosticCode, LazyGetter, Schema, SchemaKind, TemplatePart,
};

fn user() -> Schema {
    Schema::object([
        ("name", Schema::string()),
        ("age", Schema::number().optional()),
        ("tags", Schema::array(Schema::string())),
    ])
}

/// `Category = { name: string, children: Category[] }`, tied through a slot
fn category() -> (Arc<OnceLock<Schema>>, Schema) {
    let slot: Arc<OnceLock<Schema>> = Arc::new(OnceLock::new());
    let weak = Arc::downgrade(&slot);
    let node = Schema::lazy_with(LazyGetter::new(move || weak.upgrade()?.get().cloned()));
    let body = Schema::object([
        ("name", Schema::string()),
        ("children", Schema::array(node.clone())),
    ]);
    let _ = slot.set(body);
    (slot, node)
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn test_reflexive() {
    let samples = [
        Schema::string(),
        user(),
        Schema::union([Schema::string(), Schema::number()]),
        Schema::tuple_with_rest([Schema::string()], Schema::number()),
        Schema::transform(),
    ];
    for sample in &samples {
        assert!(is_same_type(sample, sample).unwrap(), "{} should equal itself", sample);
    }
}

#[test]
fn test_structurally_equal_objects() {
    assert!(is_same_type(&user(), &user()).unwrap());

    let other = Schema::object([
        ("name", Schema::string()),
        ("age", Schema::number()),
        ("tags", Schema::array(Schema::string())),
    ]);
    assert!(!is_same_type(&user(), &other).unwrap());
}

#[test]
fn test_object_key_sets_must_match() {
    let a = Schema::object([("a", Schema::string())]);
    let b = Schema::object([("b", Schema::string())]);
    let ab = Schema::object([("a", Schema::string()), ("b", Schema::string())]);
    assert!(!is_same_type(&a, &b).unwrap());
    assert!(!is_same_type(&a, &ab).unwrap());
}

#[test]
fn test_kind_mismatch() {
    assert!(!is_same_type(&Schema::string(), &Schema::number()).unwrap());
    assert!(!is_same_type(&Schema::array(Schema::string()), &Schema::set(Schema::string())).unwrap());
}

#[test]
fn test_descriptions_are_ignored() {
    let a = Schema::string().describe("a name");
    assert!(is_same_type(&a, &Schema::string()).unwrap());
}

// =============================================================================
// Wrappers
// =============================================================================

#[test]
fn test_optional_and_nullable_are_strict() {
    let s = Schema::string();
    assert!(!is_same_type(&s.optional(), &s).unwrap());
    assert!(!is_same_type(&s.nullable(), &s.optional()).unwrap());
    assert!(is_same_type(&Schema::string().optional(), &Schema::string().optional()).unwrap());
}

#[test]
fn test_ignore_optional_and_nullable() {
    let options = CompareOptions {
        ignore_optional: true,
        ignore_nullable: true,
        ..CompareOptions::preset()
    };
    let s = Schema::string();
    assert!(is_same_type_with(&s.optional(), &s, &options).unwrap());
    assert!(is_same_type_with(&s.nullable(), &s.optional(), &options).unwrap());
    assert!(is_same_type_with(
        &Schema::object([("a", Schema::number().optional())]),
        &Schema::object([("a", Schema::number().nullable())]),
        &options,
    )
    .unwrap());
    // other wrappers stay significant
    assert!(!is_same_type_with(&s.readonly(), &s, &options).unwrap());
}

#[test]
fn test_brand_policy() {
    let s = Schema::string();
    assert!(!is_same_type(&s.brand("UserId"), &s.brand("OrderId")).unwrap());
    assert!(is_same_type(&s.brand("UserId"), &Schema::string().brand("UserId")).unwrap());

    let erased = CompareOptions {
        ignore_branded: true,
        ..CompareOptions::preset()
    };
    assert!(is_same_type_with(&s.brand("UserId"), &s.brand("OrderId"), &erased).unwrap());
    assert!(is_same_type_with(&s.brand("UserId"), &s, &erased).unwrap());
}

#[test]
fn test_default_values_are_not_compared() {
    let mut context = CompareContext::new();
    let a = Schema::string().with_default(serde_json::json!("a"));
    let b = Schema::string().with_default(serde_json::json!("b"));
    assert!(same_type_comparator().compare_with(&a, &b, &mut context).unwrap());
    assert!(context
        .diagnostics()
        .iter()
        .any(|d| d.code == DiagnosticCode::UnstableComparison));
}

#[test]
fn test_promise_and_nonoptional_unwrap() {
    assert!(is_same_type(&Schema::number().promise(), &Schema::number().promise()).unwrap());
    assert!(!is_same_type(&Schema::number().promise(), &Schema::string().promise()).unwrap());
    assert!(!is_same_type(&Schema::number().non_optional(), &Schema::number().promise()).unwrap());
}

// =============================================================================
// Composites
// =============================================================================

#[test]
fn test_tuples() {
    let ss = Schema::tuple([Schema::string(), Schema::string()]);
    let s = Schema::tuple([Schema::string()]);
    assert!(!is_same_type(&ss, &s).unwrap());

    let rest_n = Schema::tuple_with_rest([Schema::string()], Schema::number());
    let rest_b = Schema::tuple_with_rest([Schema::string()], Schema::boolean());
    assert!(!is_same_type(&rest_n, &s).unwrap());
    assert!(!is_same_type(&rest_n, &rest_b).unwrap());
    assert!(is_same_type(
        &rest_n,
        &Schema::tuple_with_rest([Schema::string()], Schema::number())
    )
    .unwrap());
}

#[test]
fn test_union_flattening_and_set_equality() {
    let (a, b, c) = (Schema::string(), Schema::number(), Schema::boolean());
    let left = Schema::union([Schema::union([a.clone(), b.clone()]), c.clone()]);
    let right = Schema::union([Schema::union([c.clone(), b.clone()]), a.clone()]);
    assert!(is_same_type(&left, &right).unwrap());

    assert!(!is_same_type(&a.or(&b), &Schema::union([a.clone()])).unwrap());
    assert!(!is_same_type(&a.or(&b), &a).unwrap());
    // duplicates need not pair up one-to-one
    assert!(is_same_type(&Schema::union([a.clone(), a.clone(), b.clone()]), &a.or(&b)).unwrap());
}

#[test]
fn test_intersection_operand_order() {
    let a = Schema::object([("a", Schema::string())]);
    let b = Schema::object([("b", Schema::number())]);
    let ab = a.and(&b);
    let ba = b.and(&a);

    assert!(is_same_type(&ab, &ba).unwrap());
    assert!(!is_same_type_with(&ab, &ba, &CompareOptions::default()).unwrap());
    assert!(is_same_type_with(&ab, &a.and(&b), &CompareOptions::default()).unwrap());
}

#[test]
fn test_literals_and_enums() {
    assert!(is_same_type(&Schema::literal("a"), &Schema::literal("a")).unwrap());
    assert!(!is_same_type(&Schema::literal("a"), &Schema::literal(1)).unwrap());
    assert!(is_same_type(&Schema::literal(f64::NAN), &Schema::literal(f64::NAN)).unwrap());
    assert!(is_same_type(
        &Schema::string_enum(["red", "green"]),
        &Schema::string_enum(["green", "red"])
    )
    .unwrap());
    assert!(!is_same_type(
        &Schema::string_enum(["red", "green"]),
        &Schema::string_enum(["red"])
    )
    .unwrap());
}

#[test]
fn test_keyed_collections() {
    let record = Schema::record(Schema::string(), Schema::number());
    assert!(is_same_type(&record, &Schema::record(Schema::string(), Schema::number())).unwrap());
    assert!(!is_same_type(&record, &Schema::record(Schema::string(), Schema::string())).unwrap());
    assert!(!is_same_type(&record, &Schema::map(Schema::string(), Schema::number())).unwrap());
    assert!(is_same_type(&Schema::set(Schema::date()), &Schema::set(Schema::date())).unwrap());
}

#[test]
fn test_functions_and_templates() {
    let f = Schema::function(Schema::tuple([Schema::string()]), Schema::number());
    let g = Schema::function(Schema::tuple([Schema::string()]), Schema::number());
    let h = Schema::function(Schema::tuple([Schema::number()]), Schema::number());
    assert!(is_same_type(&f, &g).unwrap());
    assert!(!is_same_type(&f, &h).unwrap());

    let id = Schema::template_literal([
        TemplatePart::from("user-"),
        TemplatePart::from(Schema::number()),
    ]);
    let same = Schema::template_literal([
        TemplatePart::from("user-"),
        TemplatePart::from(Schema::number()),
    ]);
    let other = Schema::template_literal([
        TemplatePart::from("order-"),
        TemplatePart::from(Schema::number()),
    ]);
    assert!(is_same_type(&id, &same).unwrap());
    assert!(!is_same_type(&id, &other).unwrap());
}

#[test]
fn test_pipes_compare_both_stages() {
    let a = Schema::pipe(Schema::string(), Schema::number());
    let b = Schema::pipe(Schema::string(), Schema::number());
    let c = Schema::pipe(Schema::string(), Schema::boolean());
    assert!(is_same_type(&a, &b).unwrap());
    assert!(!is_same_type(&a, &c).unwrap());
}

// =============================================================================
// Lazy and Undecidable Kinds
// =============================================================================

#[test]
fn test_recursive_lazy_terminates() {
    let (_left_slot, left) = category();
    let (_right_slot, right) = category();
    assert!(is_same_type(&left, &right).unwrap());
}

#[test]
fn test_recursive_constructor_terminates() {
    fn tree(leaf: Schema) -> Schema {
        Schema::recursive(|this| {
            Schema::object([("leaf", leaf), ("children", Schema::array(this))])
        })
    }
    assert!(is_same_type(&tree(Schema::string()), &tree(Schema::string())).unwrap());
    assert!(!is_same_type(&tree(Schema::string()), &tree(Schema::number())).unwrap());

    let (slot, _node) = category();
    let built = Schema::recursive(|this| {
        Schema::object([("name", Schema::string()), ("children", Schema::array(this))])
    });
    assert!(is_same_type(slot.get().unwrap(), &built).unwrap());
}

#[test]
fn test_shared_producer_fast_path() {
    let getter = LazyGetter::new(|| None);
    let a = Schema::lazy_with(getter.clone());
    let b = Schema::lazy_with(getter);
    assert!(is_same_type(&a, &b).unwrap());
}

#[test]
fn test_unresolved_lazy_is_not_equal() {
    let a = Schema::lazy_with(LazyGetter::new(|| None));
    let b = Schema::lazy_with(LazyGetter::new(|| None));
    let mut context = CompareContext::new();
    assert!(!same_type_comparator().compare_with(&a, &b, &mut context).unwrap());
    assert!(context
        .diagnostics()
        .iter()
        .any(|d| d.code == DiagnosticCode::UnresolvedLazy));
}

#[test]
fn test_transform_pair_reports_once() {
    let mut context = CompareContext::new();
    let result = same_type_comparator()
        .compare_with(&Schema::transform(), &Schema::transform(), &mut context)
        .unwrap();
    assert!(!result);
    assert_eq!(context.diagnostics().len(), 1);
    assert_eq!(context.diagnostics()[0].code, DiagnosticCode::UndecidableKind);
}

#[test]
fn test_custom_nodes_are_undecidable() {
    let a = Schema::custom(Some("isEven".to_string()));
    let b = Schema::custom(Some("isEven".to_string()));
    assert!(!is_same_type(&a, &b).unwrap());
}

#[test]
fn test_unrecognized_kinds_are_not_equal() {
    let mut context = CompareContext::new();
    let a = Schema::unrecognized("effects");
    let b = Schema::unrecognized("effects");
    assert!(!same_type_comparator().compare_with(&a, &b, &mut context).unwrap());
    assert_eq!(context.diagnostics()[0].code, DiagnosticCode::UnrecognizedKind);
    assert_eq!(a.kind(), SchemaKind::Unrecognized);

    // the identity shortcut runs before any kind check
    assert!(is_same_type(&a, &a).unwrap());
}

// =============================================================================
// Interceptor
// =============================================================================

#[test]
fn test_interceptor_applies_recursively() {
    let options = CompareOptions::preset().with_interceptor(|a, b, _| {
        let pair = (a.kind(), b.kind());
        (pair == (SchemaKind::Date, SchemaKind::String)).then_some(true)
    });
    let a = Schema::object([("at", Schema::date())]);
    let b = Schema::object([("at", Schema::string())]);
    assert!(!is_same_type(&a, &b).unwrap());
    assert!(is_same_type_with(&a, &b, &options).unwrap());
}

#[test]
fn test_interceptor_can_reject() {
    let options = CompareOptions::preset().with_interceptor(|a, _, _| {
        (a.description() == Some("never")).then_some(false)
    });
    let s = Schema::string().describe("never");
    assert!(!is_same_type_with(&s, &s, &options).unwrap());
}
