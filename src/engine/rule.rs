//! Comparison rules and rule sets
//!
//! A rule is a named policy over a pair of nodes. It either returns a verdict,
//! hands the pair to the next rule through [`Cursor::next`], or compares
//! sub-pairs through [`Cursor::recheck`]. A [`RuleSet`] is an immutable,
//! ordered list of rules; order is load-bearing, so every edit produces a new
//! set.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::Cursor;
use crate::error::{CompareError, Result};
use crate::schema::Schema;

type CompareFn = dyn Fn(&Schema, &Schema, &mut Cursor<'_>) -> Result<bool> + Send + Sync;

/// A single named comparison policy
#[derive(Clone)]
pub struct CompareRule {
    name: Cow<'static, str>,
    compare: Arc<CompareFn>,
}

impl CompareRule {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, compare: F) -> Self
    where
        F: Fn(&Schema, &Schema, &mut Cursor<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            compare: Arc::new(compare),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compare(&self, a: &Schema, b: &Schema, cursor: &mut Cursor<'_>) -> Result<bool> {
        (self.compare)(a, b, cursor)
    }
}

impl fmt::Debug for CompareRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareRule").field("name", &self.name).finish()
    }
}

/// Build a rule from a name and a compare function
///
/// ```
/// use schema_compare::{define_rule, same_type_comparator, Comparator};
///
/// let compare_description = define_rule("compare description", |a, b, cursor| {
///     if a.description() != b.description() {
///         return Ok(false);
///     }
///     cursor.next()
/// });
/// let strict = Comparator::new(same_type_comparator().rules().prepend(compare_description));
/// # let _ = strict;
/// ```
pub fn define_rule<F>(name: impl Into<Cow<'static, str>>, compare: F) -> CompareRule
where
    F: Fn(&Schema, &Schema, &mut Cursor<'_>) -> Result<bool> + Send + Sync + 'static,
{
    CompareRule::new(name, compare)
}

// =============================================================================
// Rule Set
// =============================================================================

/// Ordered, immutable list of rules
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Arc<Vec<CompareRule>>,
}

impl RuleSet {
    pub fn new(rules: impl IntoIterator<Item = CompareRule>) -> Self {
        Self {
            rules: Arc::new(rules.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompareRule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompareRule> {
        self.rules.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(CompareRule::name).collect()
    }

    /// Index of the first rule with this name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name() == name)
    }

    fn position_or_err(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| CompareError::UnknownRule(name.to_string()))
    }

    fn edited(&self, edit: impl FnOnce(&mut Vec<CompareRule>)) -> Self {
        let mut rules = self.rules.as_ref().clone();
        edit(&mut rules);
        Self {
            rules: Arc::new(rules),
        }
    }

    /// New set with `rule` running first
    pub fn prepend(&self, rule: CompareRule) -> Self {
        self.edited(|rules| rules.insert(0, rule))
    }

    /// New set with `rule` running last
    pub fn append(&self, rule: CompareRule) -> Self {
        self.edited(|rules| rules.push(rule))
    }

    /// New set with `rule` inserted before the rule named `name`
    pub fn insert_before(&self, name: &str, rule: CompareRule) -> Result<Self> {
        let index = self.position_or_err(name)?;
        Ok(self.edited(|rules| rules.insert(index, rule)))
    }

    /// New set with the rule named `name` swapped for `rule`
    pub fn replace(&self, name: &str, rule: CompareRule) -> Result<Self> {
        let index = self.position_or_err(name)?;
        Ok(self.edited(|rules| rules[index] = rule))
    }

    /// New set without the rule named `name`
    pub fn remove(&self, name: &str) -> Result<Self> {
        let index = self.position_or_err(name)?;
        Ok(self.edited(|rules| {
            rules.remove(index);
        }))
    }

    /// Identity of the set: two handles share the same rule list
    pub fn ptr_eq(a: &RuleSet, b: &RuleSet) -> bool {
        Arc::ptr_eq(&a.rules, &b.rules)
    }
}

impl FromIterator<CompareRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = CompareRule>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
