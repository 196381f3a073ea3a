//! Preset Rule Sets
//!
//! - [`same_type`]: "same type" equality, structural up to the configured laxities
//! - [`compatible`]: "accepts" compatibility, which defers to equality first
//!
//! Both are built from [`CompareOptions`]; rule names are exported as
//! constants so custom chains can target them with [`RuleSet`] edits.
//!
//! [`RuleSet`]: crate::engine::RuleSet

pub mod compatible;
pub mod same_type;

pub use compatible::compatible_type_rules;
pub use same_type::same_type_rules;

use crate::engine::CompareRule;
use crate::error::Result;
use crate::options::CompareOptions;
use crate::schema::Schema;

pub const INTERCEPT: &str = "intercept";

/// Rule consulting the caller's interceptor, if one is configured
pub(crate) fn intercept_rule(options: &CompareOptions) -> Option<CompareRule> {
    let interceptor = options.interceptor.clone()?;
    let options = options.clone();
    Some(CompareRule::new(INTERCEPT, move |a, b, cursor| {
        match interceptor.intercept(a, b, &options) {
            Some(verdict) => Ok(verdict),
            None => cursor.next(),
        }
    }))
}

/// Short-circuiting `any` over fallible predicates
pub(crate) fn any_of(
    items: &[Schema],
    mut predicate: impl FnMut(&Schema) -> Result<bool>,
) -> Result<bool> {
    for item in items {
        if predicate(item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Short-circuiting `all` over fallible predicates
pub(crate) fn all_of(
    items: &[Schema],
    mut predicate: impl FnMut(&Schema) -> Result<bool>,
) -> Result<bool> {
    for item in items {
        if !predicate(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}
