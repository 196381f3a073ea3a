//! Compatibility rules ("higher accepts lower")
//!
//! The higher side is the looser type, the lower side the stricter one. Equal
//! types are compatible; beyond that only optional/nullable absorption on the
//! lower side, directional union handling, and covariant object, array and
//! tuple rules apply. Any other pair of equal kinds has no answer here and is
//! reported as an error rather than guessed.

use crate::classify::{flatten_union, is_comparable_kind};
use crate::engine::{CompareContext, CompareRule, Comparator, Cursor, RuleSet};
use crate::error::{CompareError, Result};
use crate::options::CompareOptions;
use crate::schema::{Schema, SchemaDef};

use super::{all_of, any_of, intercept_rule, same_type::same_type_rules};

pub const IS_SAME_TYPE: &str = "is same type";
pub const CHECK_KINDS: &str = "check kinds";
pub const CHECK_OPTIONAL_LOWER: &str = "check optional/nullable on lower";
pub const CHECK_UNION: &str = "check union";
pub const COMPARE_KIND: &str = "compare type by kind";
pub const CHECK_OBJECT: &str = "check object (structural subset)";
pub const CHECK_ARRAY: &str = "check array";
pub const CHECK_TUPLE: &str = "check tuple (length and rest)";
pub const UNDETERMINED: &str = "undetermined compatibility";

/// Compatibility rule set for the given options
///
/// Equality is decided by the same-type rules built from the same options.
pub fn compatible_type_rules(options: &CompareOptions) -> RuleSet {
    let same_type = Comparator::new(same_type_rules(options));

    let mut rules = Vec::with_capacity(10);
    rules.extend(intercept_rule(options));
    rules.push(CompareRule::new(IS_SAME_TYPE, move |higher, lower, cursor| {
        let mut scratch = CompareContext::new();
        let same = same_type.compare_with(higher, lower, &mut scratch)?;
        cursor.context().absorb_diagnostics(scratch);
        if same {
            return Ok(true);
        }
        cursor.next()
    }));
    rules.push(CompareRule::new(CHECK_KINDS, check_kinds));
    rules.push(CompareRule::new(CHECK_OPTIONAL_LOWER, check_optional_lower));
    rules.push(CompareRule::new(CHECK_UNION, check_union));
    rules.push(CompareRule::new(COMPARE_KIND, compare_kind));
    rules.push(CompareRule::new(CHECK_OBJECT, check_object));
    rules.push(CompareRule::new(CHECK_ARRAY, check_array));
    rules.push(CompareRule::new(CHECK_TUPLE, check_tuple));
    rules.push(CompareRule::new(UNDETERMINED, undetermined));
    RuleSet::new(rules)
}

pub fn check_kinds(higher: &Schema, lower: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    for schema in [higher, lower] {
        if !is_comparable_kind(schema) {
            return Err(CompareError::UnrecognizedKind(schema.kind_name().to_string()));
        }
    }
    cursor.next()
}

/// An optional/nullable lower side is checked through its inner type
pub fn check_optional_lower(
    higher: &Schema,
    lower: &Schema,
    cursor: &mut Cursor<'_>,
) -> Result<bool> {
    match lower.def() {
        SchemaDef::Optional { inner } | SchemaDef::Nullable { inner } => {
            cursor.recheck(higher, inner)
        }
        _ => cursor.next(),
    }
}

pub fn check_union(higher: &Schema, lower: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let higher_is_union = matches!(higher.def(), SchemaDef::Union { .. });
    let lower_is_union = matches!(lower.def(), SchemaDef::Union { .. });
    match (higher_is_union, lower_is_union) {
        // every higher option is accepted by some lower option
        (true, true) => {
            let higher_options = flatten_union(higher);
            let lower_options = flatten_union(lower);
            all_of(&higher_options, |h| {
                any_of(&lower_options, |l| cursor.recheck(h, l))
            })
        }
        (true, false) => {
            let higher_options = flatten_union(higher);
            all_of(&higher_options, |h| cursor.recheck(h, lower))
        }
        (false, true) => {
            let lower_options = flatten_union(lower);
            any_of(&lower_options, |l| cursor.recheck(higher, l))
        }
        (false, false) => cursor.next(),
    }
}

pub fn compare_kind(higher: &Schema, lower: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    if higher.kind() != lower.kind() {
        return Ok(false);
    }
    cursor.next()
}

/// Higher may carry extra fields; shared fields must be compatible
pub fn check_object(higher: &Schema, lower: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (SchemaDef::Object { shape: super_shape }, SchemaDef::Object { shape: sub_shape }) =
        (higher.def(), lower.def())
    else {
        return cursor.next();
    };
    if super_shape.len() < sub_shape.len() {
        return Ok(false);
    }
    for (key, sub_field) in sub_shape {
        let Some(super_field) = super_shape.get(key) else {
            return Ok(false);
        };
        if !cursor.recheck(super_field, sub_field)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn check_array(higher: &Schema, lower: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    match (higher.def(), lower.def()) {
        (SchemaDef::Array { element: h }, SchemaDef::Array { element: l }) => cursor.recheck(h, l),
        _ => cursor.next(),
    }
}

/// Higher needs at least the lower's fixed items, plus a rest if lower has one
pub fn check_tuple(higher: &Schema, lower: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
    let (
        SchemaDef::Tuple { items: higher_items, rest: higher_rest },
        SchemaDef::Tuple { items: lower_items, rest: lower_rest },
    ) = (higher.def(), lower.def())
    else {
        return cursor.next();
    };
    if higher_items.len() < lower_items.len() {
        return Ok(false);
    }
    for (h, l) in higher_items.iter().zip(lower_items) {
        if !cursor.recheck(h, l)? {
            return Ok(false);
        }
    }
    match (higher_rest, lower_rest) {
        (Some(h), Some(l)) => cursor.recheck(h, l),
        (None, Some(_)) => Ok(false),
        (_, None) => Ok(true),
    }
}

pub fn undetermined(higher: &Schema, lower: &Schema, _cursor: &mut Cursor<'_>) -> Result<bool> {
    tracing::error!(higher = %higher, lower = %lower, "cannot determine compatibility");
    Err(CompareError::UndeterminedCompatibility {
        higher: higher.to_string(),
        lower: lower.to_string(),
    })
}
