//! Equality rules ("same type")
//!
//! Ordered so cheap, decisive checks run first: identity, kind recognition,
//! configured wrapper laxities, kind mismatch, brand tags, wrapper unwrapping,
//! then one structural rule per kind. The last rule is a catch-all that
//! reports the pair as undecidable and answers `false`.
//!
//! Value-level constraints (lengths, ranges, formats, refinements) are not
//! part of a node's type and are never compared.

use crate::classify::{flatten_union, inner_type, is_comparable_kind};
use crate::engine::{CompareRule, Cursor, DiagnosticCode, RuleSet};
use crate::error::Result;
use crate::options::CompareOptions;
use crate::schema::{LazyGetter, LiteralValue, Schema, SchemaDef, TemplatePart};

use super::{all_of, any_of, intercept_rule};

pub const COMPARE_REFERENCE: &str = "compare reference";
pub const UNSTABLE_WARN: &str = "unstable warn";
pub const STRICT_KINDS: &str = "strict kinds check";
pub const UNWRAP_IGNORED: &str = "unwrap ignored wrappers";
pub const COMPARE_KIND: &str = "compare kind";
pub const COMPARE_BRAND: &str = "compare brand";
pub const UNWRAP_INNER_TYPE: &str = "unwrap inner type";
pub const COMPARE_SIMPLE: &str = "compare simple type";
pub const COMPARE_OBJECT: &str = "compare object";
pub const COMPARE_ARRAY: &str = "compare array";
pub const COMPARE_TUPLE: &str = "compare tuple";
pub const COMPARE_LITERAL: &str = "compare literal";
pub const COMPARE_INTERSECTION: &str = "compare intersection";
pub const COMPARE_UNION: &str = "compare union";
pub const COMPARE_RECORD: &str = "compare record";
pub const COMPARE_MAP: &str = "compare map";
pub const COMPARE_SET: &str = "compare set";
pub const COMPARE_ENUM: &str = "compare enum";
pub const COMPARE_FUNCTION: &str = "compare function";
pub const COMPARE_TEMPLATE_LITERAL: &str = "compare template literal";
pub const COMPARE_PIPE: &str = "compare pipe";
pub const COMPARE_LAZY: &str = "compare lazy";
pub const FINAL_FALLBACK: &str = "final fallback";

/// Equality rule set for the given options
pub fn same_type_rules(options: &CompareOptions) -> RuleSet {
    let mut rules = Vec::with_capacity(24);
    rules.extend(intercept_rule(options));
    rules.push(CompareRule::new(COMPARE_REFERENCE, compare_reference));
    rules.push(CompareRule::new(UNSTABLE_WARN, unstable_warn));
    rules.push(CompareRule::new(STRICT_KINDS, strict_kinds));
    if options.ignores_wrappers() {
        rules.push(unwrap_ignored_rule(options));
    }
    rules.push(CompareRule::new(COMPARE_KIND, compare_kind));
    rules.push(CompareRule::new(COMPARE_BRAND, compare_brand));
    rules.push(CompareRule::new(UNWRAP_INNER_TYPE, unwrap_inner_type));
    rules.push(CompareRule::new(COMPARE_SIMPLE, compare_simple));
    rules.push(CompareRule::new(COMPARE_OBJECT, compare_object));
    rules.push(CompareRule::new(COMPARE_ARRAY, compare_array));
    rules.push(CompareRule::new(COMPARE_TUPLE, compare_tuple));
    rules.push(CompareRule::new(COMPARE_LITERAL, compare_literal));
    if options.ignore_intersection_operand_order {
        rules.push(CompareRule::new(COMPARE_INTERSECTION, compare_intersection_commutative));
    } else {
        rules.push(CompareRule::new(COMPARE_INTERSECTION, compare_intersection_ordered));
    }
    rules.push(CompareRule::new(COMPARE_UNION, compare_union));
    rules.push(CompareRule::new(COMPARE_RECORD, compare_record));
    rules.push(CompareRule::new(COMPARE_MAP, compare_map));
    rules.push(CompareRule::new(COMPARE_SET, compare_set));
    rules.push(CompareRule::new(COMPARE_ENUM, compare_enum));
    rules.push(CompareRule::new(COMPARE_FUNCTION, compare_function));
    rules.push(CompareRule::new(COMPARE_TEMPLATE_LITERAL, compare_template_literal));
    rules.push(CompareRule::new(COMPARE_PIPE, compare_pipe));
    rules.push(CompareRule::new(COMPARE_LAZY, compare_lazy));
    rules.push(CompareRule::new(FINAL_FALLBACK, final_fallback));
    RuleSet::new(rules)
}

// =============================================================================
// Gatekeeping
// =============================================================================

pub fn compare_reference(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    if Schema::ptr_eq(a, b) {
        return Ok(true);
    }
    cursor.next()
}

/// Flags approximate comparisons; never decides
pub fn unstable_warn(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    if a.kind().is_unstable() || b.kind().is_unstable() {
        cursor.warn(DiagnosticCode::UnstableComparison, a, b);
    }
    cursor.next()
}

pub fn strict_kinds(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    if !is_comparable_kind(a) || !is_comparable_kind(b) {
        cursor.warn(DiagnosticCode::UnrecognizedKind, a, b);
        return Ok(false);
    }
    cursor.next()
}

/// Peel every wrapper layer the options say to ignore
fn strip_ignored(schema: &Schema, options: &CompareOptions) -> Schema {
    let mut current = schema.clone();
    loop {
        let inner = match current.def() {
            SchemaDef::Optional { inner } if options.ignore_optional => inner.clone(),
            SchemaDef::Nullable { inner } if options.ignore_nullable => inner.clone(),
            SchemaDef::Branded { inner, .. } if options.ignore_branded => inner.clone(),
            _ => return current,
        };
        current = inner;
    }
}

fn unwrap_ignored_rule(options: &CompareOptions) -> CompareRule {
    let options = CompareOptions {
        interceptor: None,
        ..options.clone()
    };
    CompareRule::new(UNWRAP_IGNORED, move |a, b, cursor| {
        let stripped_a = strip_ignored(a, &options);
        let stripped_b = strip_ignored(b, &options);
        if Schema::ptr_eq(&stripped_a, a) && Schema::ptr_eq(&stripped_b, b) {
            return cursor.next();
        }
        cursor.recheck(&stripped_a, &stripped_b)
    })
}

pub fn compare_kind(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    if a.kind() != b.kind() {
        return Ok(false);
    }
    cursor.next()
}

// =============================================================================
// Wrappers
// =============================================================================

/// Branded nodes need equal tags; erased brands never reach this rule
///
/// A brand without a tag cannot be told apart from any other brand.
pub fn compare_brand(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (
            SchemaDef::Branded { inner: x, brand: Some(brand_a) },
            SchemaDef::Branded { inner: y, brand: Some(brand_b) },
        ) => {
            if brand_a != brand_b {
                return Ok(false);
            }
            cursor.recheck(x, y)
        }
        (SchemaDef::Branded { .. }, SchemaDef::Branded { .. }) => Ok(false),
        _ => cursor.next(),
    }
}

/// Same wrapper kind on both sides: compare what they wrap
///
/// Default and prefault values are ignored.
pub fn unwrap_inner_type(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (inner_type(a), inner_type(b)) {
        (Some(x), Some(y)) => {
            if a.kind() != b.kind() {
                return Ok(false);
            }
            cursor.recheck(x, y)
        }
        (Some(_), None) | (None, Some(_)) => Ok(false),
        (None, None) => cursor.next(),
    }
}

// =============================================================================
// Structural
// =============================================================================

pub fn compare_simple(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (kind_a, kind_b) = (a.kind(), b.kind());
    if kind_a.is_simple() || kind_b.is_simple() {
        return Ok(kind_a == kind_b);
    }
    cursor.next()
}

pub fn compare_object(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (SchemaDef::Object { shape: shape_a }, SchemaDef::Object { shape: shape_b }) =
        (a.def(), b.def())
    else {
        return cursor.next();
    };
    if shape_a.len() != shape_b.len() {
        return Ok(false);
    }
    for (key, field_a) in shape_a {
        let Some(field_b) = shape_b.get(key) else {
            return Ok(false);
        };
        if !cursor.recheck(field_a, field_b)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn compare_array(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (SchemaDef::Array { element: x }, SchemaDef::Array { element: y }) => cursor.recheck(x, y),
        _ => cursor.next(),
    }
}

pub fn compare_tuple(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (
        SchemaDef::Tuple { items: items_a, rest: rest_a },
        SchemaDef::Tuple { items: items_b, rest: rest_b },
    ) = (a.def(), b.def())
    else {
        return cursor.next();
    };
    if items_a.len() != items_b.len() {
        return Ok(false);
    }
    for (x, y) in items_a.iter().zip(items_b) {
        if !cursor.recheck(x, y)? {
            return Ok(false);
        }
    }
    match (rest_a, rest_b) {
        (Some(x), Some(y)) => cursor.recheck(x, y),
        (None, None) => Ok(true),
        _ => Ok(false),
    }
}

/// Set equality over literal values
pub fn compare_literal(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (SchemaDef::Literal { values: values_a }, SchemaDef::Literal { values: values_b }) =
        (a.def(), b.def())
    else {
        return cursor.next();
    };
    if values_a.len() != values_b.len() {
        return Ok(false);
    }
    Ok(covers(values_a, values_b) && covers(values_b, values_a))
}

fn covers(from: &[LiteralValue], into: &[LiteralValue]) -> bool {
    from.iter().all(|v| into.iter().any(|w| v.same_value(w)))
}

pub fn compare_intersection_ordered(
    a: &Schema,
    b: &Schema,
    cursor: &mut Cursor<'_>,
) -> Result<bool> {
    match (a.def(), b.def()) {
        (
            SchemaDef::Intersection { left: la, right: ra },
            SchemaDef::Intersection { left: lb, right: rb },
        ) => Ok(cursor.recheck(la, lb)? && cursor.recheck(ra, rb)?),
        _ => cursor.next(),
    }
}

/// `(L & R)` equals `(L' & R')` directly or crosswise
pub fn compare_intersection_commutative(
    a: &Schema,
    b: &Schema,
    cursor: &mut Cursor<'_>,
) -> Result<bool> {
    match (a.def(), b.def()) {
        (
            SchemaDef::Intersection { left: la, right: ra },
            SchemaDef::Intersection { left: lb, right: rb },
        ) => {
            if cursor.recheck(la, lb)? && cursor.recheck(ra, rb)? {
                return Ok(true);
            }
            Ok(cursor.recheck(la, rb)? && cursor.recheck(ra, lb)?)
        }
        _ => cursor.next(),
    }
}

/// Flattened options must cover each other; duplicates need not pair up
pub fn compare_union(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    if !matches!(
        (a.def(), b.def()),
        (SchemaDef::Union { .. }, SchemaDef::Union { .. })
    ) {
        return cursor.next();
    }
    let options_a = flatten_union(a);
    let options_b = flatten_union(b);
    let a_in_b = all_of(&options_a, |x| any_of(&options_b, |y| cursor.recheck(x, y)))?;
    if !a_in_b {
        return Ok(false);
    }
    all_of(&options_b, |y| any_of(&options_a, |x| cursor.recheck(x, y)))
}

pub fn compare_record(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (
            SchemaDef::Record { key: ka, value: va },
            SchemaDef::Record { key: kb, value: vb },
        ) => Ok(cursor.recheck(ka, kb)? && cursor.recheck(va, vb)?),
        _ => cursor.next(),
    }
}

pub fn compare_map(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (SchemaDef::Map { key: ka, value: va }, SchemaDef::Map { key: kb, value: vb }) => {
            Ok(cursor.recheck(ka, kb)? && cursor.recheck(va, vb)?)
        }
        _ => cursor.next(),
    }
}

pub fn compare_set(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (SchemaDef::Set { value: x }, SchemaDef::Set { value: y }) => cursor.recheck(x, y),
        _ => cursor.next(),
    }
}

/// Same labels, each bound to the same value
pub fn compare_enum(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (SchemaDef::Enum { entries: entries_a }, SchemaDef::Enum { entries: entries_b }) =
        (a.def(), b.def())
    else {
        return cursor.next();
    };
    if entries_a.len() != entries_b.len() {
        return Ok(false);
    }
    Ok(entries_a.iter().all(|(label, value)| {
        entries_b
            .get(label)
            .is_some_and(|other| value.same_value(other))
    }))
}

pub fn compare_function(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (
            SchemaDef::Function { input: ia, output: oa },
            SchemaDef::Function { input: ib, output: ob },
        ) => Ok(cursor.recheck(ia, ib)? && cursor.recheck(oa, ob)?),
        _ => cursor.next(),
    }
}

pub fn compare_template_literal(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (
        SchemaDef::TemplateLiteral { parts: parts_a },
        SchemaDef::TemplateLiteral { parts: parts_b },
    ) = (a.def(), b.def())
    else {
        return cursor.next();
    };
    if parts_a.len() != parts_b.len() {
        return Ok(false);
    }
    for (x, y) in parts_a.iter().zip(parts_b) {
        let same = match (x, y) {
            (TemplatePart::Schema(x), TemplatePart::Schema(y)) => cursor.recheck(x, y)?,
            (TemplatePart::Literal(x), TemplatePart::Literal(y)) => x.same_value(y),
            _ => false,
        };
        if !same {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn compare_pipe(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (a.def(), b.def()) {
        (
            SchemaDef::Pipe { input: ia, output: oa },
            SchemaDef::Pipe { input: ib, output: ob },
        ) => Ok(cursor.recheck(ia, ib)? && cursor.recheck(oa, ob)?),
        _ => cursor.next(),
    }
}

/// Shared producer, or a pair already under comparison, is equal
///
/// Otherwise both producers are forced once and their results rechecked.
pub fn compare_lazy(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (SchemaDef::Lazy { getter: getter_a }, SchemaDef::Lazy { getter: getter_b }) =
        (a.def(), b.def())
    else {
        return cursor.next();
    };
    if LazyGetter::ptr_eq(getter_a, getter_b) {
        return Ok(true);
    }
    if !cursor.context().begin_visit(a, b) {
        tracing::debug!(left = %a, right = %b, "lazy pair already in progress; assuming equal");
        return Ok(true);
    }
    let result = match (getter_a.resolve(), getter_b.resolve()) {
        (Some(x), Some(y)) => cursor.recheck(&x, &y),
        _ => {
            cursor.warn(DiagnosticCode::UnresolvedLazy, a, b);
            Ok(false)
        }
    };
    cursor.context().end_visit(a, b);
    result
}

/// Transform and custom nodes cannot be decided structurally
pub fn final_fallback(a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    cursor.warn(DiagnosticCode::UndecidableKind, a, b);
    Ok(false)
}
