//! Rule Chain
//!
//! Runs an ordered [`RuleSet`] over a pair of nodes. Each rule gets a
//! [`Cursor`] through which it can advance to the next rule (at most once) or
//! recursively compare a sub-pair under the same rules and context.
//!
//! A chain that runs past its last rule, or a rule that advances twice, is a
//! defect in the rule set and surfaces as an error rather than a verdict.

pub mod context;
pub mod rule;

pub use context::{AuditEntry, AuditRecord, CompareContext, Diagnostic, DiagnosticCode};
pub use rule::{define_rule, CompareRule, RuleSet};

use crate::error::{CompareError, Result};
use crate::schema::Schema;

// =============================================================================
// Comparator
// =============================================================================

/// A compiled comparison function over a rule set
#[derive(Debug, Clone)]
pub struct Comparator {
    rules: RuleSet,
}

impl Comparator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Compare with a throwaway context
    pub fn compare(&self, a: &Schema, b: &Schema) -> Result<bool> {
        let mut context = CompareContext::new();
        self.compare_with(a, b, &mut context)
    }

    /// Compare, recording into the caller's context
    pub fn compare_with(&self, a: &Schema, b: &Schema, context: &mut CompareContext) -> Result<bool> {
        self.run(0, a, b, context)
    }

    fn run(&self, index: usize, a: &Schema, b: &Schema, context: &mut CompareContext) -> Result<bool> {
        let Some(rule) = self.rules.get(index) else {
            tracing::error!(left = %a, right = %b, "rule chain exhausted without a verdict");
            return Err(CompareError::ChainExhausted {
                left: a.to_string(),
                right: b.to_string(),
            });
        };

        tracing::trace!(rule = rule.name(), index, left = a.kind_name(), right = b.kind_name(), "applying rule");

        let mut cursor = Cursor {
            comparator: self,
            rule_name: rule.name(),
            index,
            left: a,
            right: b,
            context: &mut *context,
            advanced: false,
        };
        let verdict = rule.compare(a, b, &mut cursor)?;

        context.record(rule.name(), a, b, verdict);
        Ok(verdict)
    }
}

impl From<RuleSet> for Comparator {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// A rule's handle on the running chain
pub struct Cursor<'a> {
    comparator: &'a Comparator,
    rule_name: &'a str,
    index: usize,
    left: &'a Schema,
    right: &'a Schema,
    context: &'a mut CompareContext,
    advanced: bool,
}

impl<'a> Cursor<'a> {
    /// Hand the current pair to the next rule
    ///
    /// Calling this twice from one rule invocation is an error.
    pub fn next(&mut self) -> Result<bool> {
        if self.advanced {
            tracing::error!(rule = self.rule_name, "next() called multiple times");
            return Err(CompareError::RuleChainIntegrity {
                rule: self.rule_name.to_string(),
            });
        }
        self.advanced = true;
        self.comparator
            .run(self.index + 1, self.left, self.right, self.context)
    }

    /// Compare a sub-pair from the first rule, sharing this context
    pub fn recheck(&mut self, a: &Schema, b: &Schema) -> Result<bool> {
        self.comparator.compare_with(a, b, self.context)
    }

    pub fn context(&mut self) -> &mut CompareContext {
        &mut *self.context
    }

    pub fn rule_name(&self) -> &str {
        self.rule_name
    }

    /// Report a diagnostic for a pair
    pub fn warn(&mut self, code: DiagnosticCode, a: &Schema, b: &Schema) {
        self.context.report(Diagnostic::new(code, a, b));
    }
}
