//! Comparison options
//!
//! The configuration bundle rule sets are built from. Defaults are the strict
//! policy: optional, nullable and brand wrappers are significant and
//! intersection operands are matched in order.

use std::fmt;
use std::sync::Arc;

use crate::schema::Schema;

type InterceptFn = dyn Fn(&Schema, &Schema, &CompareOptions) -> Option<bool> + Send + Sync;

/// Caller hook consulted before any rule
///
/// Returning `Some(verdict)` makes that verdict final for the pair; `None`
/// hands the pair to the rules. It runs for every recursive sub-comparison too.
#[derive(Clone)]
pub struct Interceptor(Arc<InterceptFn>);

impl Interceptor {
    pub fn new(
        hook: impl Fn(&Schema, &Schema, &CompareOptions) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(hook))
    }

    pub fn intercept(&self, a: &Schema, b: &Schema, options: &CompareOptions) -> Option<bool> {
        (self.0)(a, b, options)
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Interceptor(..)")
    }
}

/// How brand tags on branded nodes are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandPolicy {
    /// Brands are runtime tags: equal tags are required
    Tagged,
    /// Brands are invisible: branded nodes compare as their inner type
    Erased,
}

/// Options for building equality and compatibility rule sets
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Strip optional wrappers from both sides before comparing
    pub ignore_optional: bool,
    /// Strip nullable wrappers from both sides before comparing
    pub ignore_nullable: bool,
    /// Strip brand wrappers from both sides before comparing
    pub ignore_branded: bool,
    /// Accept intersections whose operands match crosswise
    pub ignore_intersection_operand_order: bool,
    pub interceptor: Option<Interceptor>,
}

impl CompareOptions {
    /// Options used by the preset comparators
    ///
    /// Same as the default except intersections are commutative.
    pub fn preset() -> Self {
        Self {
            ignore_intersection_operand_order: true,
            ..Self::default()
        }
    }

    pub fn brand_policy(&self) -> BrandPolicy {
        if self.ignore_branded {
            BrandPolicy::Erased
        } else {
            BrandPolicy::Tagged
        }
    }

    /// Whether any wrapper laxity is switched on
    pub fn ignores_wrappers(&self) -> bool {
        self.ignore_optional || self.ignore_nullable || self.ignore_branded
    }

    pub fn with_interceptor(
        mut self,
        hook: impl Fn(&Schema, &Schema, &CompareOptions) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        self.interceptor = Some(Interceptor::new(hook));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_strict() {
        let options = CompareOptions::default();
        assert!(!options.ignore_optional);
        assert!(!options.ignore_nullable);
        assert!(!options.ignore_branded);
        assert!(!options.ignore_intersection_operand_order);
        assert!(options.interceptor.is_none());
        assert_eq!(options.brand_policy(), BrandPolicy::Tagged);
    }

    #[test]
    fn test_preset_is_commutative() {
        let preset = CompareOptions::preset();
        assert!(preset.ignore_intersection_operand_order);
        assert!(!preset.ignores_wrappers());
    }

    #[test]
    fn test_interceptor() {
        let options = CompareOptions::default().with_interceptor(|a, _, _| {
            matches!(a.def(), crate::schema::SchemaDef::Never).then_some(true)
        });
        let hook = options.interceptor.clone().unwrap();
        assert_eq!(hook.intercept(&Schema::never(), &Schema::string(), &options), Some(true));
        assert_eq!(hook.intercept(&Schema::string(), &Schema::string(), &options), None);
    }
}
