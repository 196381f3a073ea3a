//! Comparison context
//!
//! Mutable state scoped to one top-level comparison and shared by every
//! recursive sub-comparison it triggers: the optional audit trail, the
//! diagnostics side channel, and the set of lazy pairs currently being
//! compared (used to cut cycles).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::classify::SchemaKind;
use crate::schema::Schema;

// =============================================================================
// Audit Trail
// =============================================================================

/// One rule invocation: which rule, on which pair, with which verdict
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub rule: String,
    pub target: (Schema, Schema),
    pub result: bool,
}

impl AuditEntry {
    /// Kind-level summary suitable for serialization
    pub fn record(&self) -> AuditRecord {
        AuditRecord {
            rule: self.rule.clone(),
            left: self.target.0.kind(),
            right: self.target.1.kind(),
            result: self.result,
        }
    }
}

/// Serializable form of an [`AuditEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub rule: String,
    pub left: SchemaKind,
    pub right: SchemaKind,
    pub result: bool,
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Diagnostic code for categorizing comparison warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A kind whose comparison is only approximate was involved
    UnstableComparison,
    /// No rule can decide the pair structurally
    UndecidableKind,
    /// A kind outside the supported set was involved
    UnrecognizedKind,
    /// A lazy producer yielded no node
    UnresolvedLazy,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnstableComparison => "W001",
            Self::UndecidableKind => "W002",
            Self::UnrecognizedKind => "W003",
            Self::UnresolvedLazy => "W004",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A warning raised while comparing; never affects the verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    /// Kind tag of the left node
    pub left: String,
    /// Kind tag of the right node
    pub right: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, a: &Schema, b: &Schema) -> Self {
        let left = a.kind_name().to_string();
        let right = b.kind_name().to_string();
        let message = match code {
            DiagnosticCode::UnstableComparison => format!(
                "Unstable comparison detected: left.type=\"{}\" right.type=\"{}\"; \
                 these kinds are not standardized and the result may be approximate",
                left, right
            ),
            DiagnosticCode::UndecidableKind => format!(
                "Cannot structurally compare {} with {}; reporting not equal",
                a, b
            ),
            DiagnosticCode::UnrecognizedKind => format!(
                "Unrecognized schema kind: left.type=\"{}\" right.type=\"{}\"",
                left, right
            ),
            DiagnosticCode::UnresolvedLazy => {
                format!("Lazy producer yielded no schema comparing {} with {}", a, b)
            }
        };
        Self {
            code,
            left,
            right,
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// =============================================================================
// Context
// =============================================================================

/// Accumulator threaded through one comparison and all of its rechecks
///
/// The audit trail is off by default; build with [`CompareContext::with_stack`]
/// to record one. Entries are appended when a rule returns, so a rule that
/// rechecks children appears after the children's entries.
#[derive(Debug, Default)]
pub struct CompareContext {
    stack: Option<Vec<AuditEntry>>,
    diagnostics: Vec<Diagnostic>,
    in_progress: HashSet<(usize, usize)>,
}

impl CompareContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that records an audit trail
    pub fn with_stack() -> Self {
        Self {
            stack: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.stack.is_some()
    }

    pub fn stack(&self) -> Option<&[AuditEntry]> {
        self.stack.as_deref()
    }

    pub fn take_stack(&mut self) -> Option<Vec<AuditEntry>> {
        self.stack.take()
    }

    /// Rule names of the audit trail, in append order
    pub fn rule_names(&self) -> Vec<&str> {
        self.stack
            .iter()
            .flatten()
            .map(|entry| entry.rule.as_str())
            .collect()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.stack
            .iter()
            .flatten()
            .map(AuditEntry::record)
            .collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Emit a diagnostic to the log and keep it on the context
    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            code = %diagnostic.code,
            left = %diagnostic.left,
            right = %diagnostic.right,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    /// Take over diagnostics already reported on a nested context
    pub(crate) fn absorb_diagnostics(&mut self, other: CompareContext) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub(crate) fn record(&mut self, rule: &str, a: &Schema, b: &Schema, result: bool) {
        if let Some(stack) = self.stack.as_mut() {
            stack.push(AuditEntry {
                rule: rule.to_string(),
                target: (a.clone(), b.clone()),
                result,
            });
        }
    }

    /// Mark a pair as being compared; `false` if it already is
    pub fn begin_visit(&mut self, a: &Schema, b: &Schema) -> bool {
        self.in_progress.insert((a.id(), b.id()))
    }

    pub fn end_visit(&mut self, a: &Schema, b: &Schema) {
        self.in_progress.remove(&(a.id(), b.id()));
    }

    pub fn is_visiting(&self, a: &Schema, b: &Schema) -> bool {
        self.in_progress.contains(&(a.id(), b.id()))
    }
}
