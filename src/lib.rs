//! Schema Compare
//!
//! Decides whether two validator schema trees describe the same type, or
//! whether one accepts everything the other accepts. Both relations are
//! ordered chains of named rules run by a small engine; callers can extend or
//! replace the chains.
//!
//! ## Features
//!
//! - **Same type**: structural equality, up to configurable laxities
//! - **Compatible type**: one-directional "accepts" on top of equality
//! - **Extensible**: rules are plain values, rule sets are editable lists
//! - **Auditable**: optional per-rule audit trail and structured diagnostics
//!
//! ## Architecture
//!
//! ```text
//! schema     ── Schema / SchemaDef node handles
//! classify   ── kind predicates, inner-type unwrapping, union flattening
//! engine/    ── Comparator, Cursor, CompareRule, RuleSet, CompareContext
//! rules/
//! ├── same_type.rs   ── equality chain
//! └── compatible.rs  ── compatibility chain
//! options    ── CompareOptions the chains are built from
//! config     ── file/env configuration for the CLI
//! document   ── JSON documents to Schema trees
//! ```
//!
//! ## Example
//!
//! ```
//! use schema_compare::{is_compatible_type, is_same_type, Schema};
//!
//! let a = Schema::object([("name", Schema::string())]);
//! let b = Schema::object([("name", Schema::string())]);
//! assert!(is_same_type(&a, &b).unwrap());
//!
//! let wide = Schema::object([("name", Schema::string()), ("age", Schema::number())]);
//! assert!(is_compatible_type(&wide, &a).unwrap());
//! ```

use std::sync::OnceLock;

pub mod classify;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod options;
pub mod rules;
pub mod schema;

pub use classify::SchemaKind;
pub use config::CompareConfig;
pub use document::LoadedDocument;
pub use engine::{
    define_rule, AuditEntry, AuditRecord, Comparator, CompareContext, CompareRule, Cursor,
    Diagnostic, DiagnosticCode, RuleSet,
};
pub use error::{CompareError, Result};
pub use options::{BrandPolicy, CompareOptions, Interceptor};
pub use rules::{compatible_type_rules, same_type_rules};
pub use schema::{LazyGetter, LiteralValue, Schema, SchemaDef, TemplatePart};

/// The preset equality comparator
pub fn same_type_comparator() -> &'static Comparator {
    static COMPARATOR: OnceLock<Comparator> = OnceLock::new();
    COMPARATOR.get_or_init(|| Comparator::new(same_type_rules(&CompareOptions::preset())))
}

/// The preset compatibility comparator
pub fn compatible_type_comparator() -> &'static Comparator {
    static COMPARATOR: OnceLock<Comparator> = OnceLock::new();
    COMPARATOR.get_or_init(|| Comparator::new(compatible_type_rules(&CompareOptions::preset())))
}

/// Whether `a` and `b` describe the same type
pub fn is_same_type(a: &Schema, b: &Schema) -> Result<bool> {
    same_type_comparator().compare(a, b)
}

/// [`is_same_type`] under custom options
pub fn is_same_type_with(a: &Schema, b: &Schema, options: &CompareOptions) -> Result<bool> {
    Comparator::new(same_type_rules(options)).compare(a, b)
}

/// Whether `higher` accepts everything `lower` accepts
///
/// Returns [`CompareError::UndeterminedCompatibility`] for pairs the rules
/// cannot decide rather than guessing.
pub fn is_compatible_type(higher: &Schema, lower: &Schema) -> Result<bool> {
    compatible_type_comparator().compare(higher, lower)
}

/// [`is_compatible_type`] under custom options
pub fn is_compatible_type_with(
    higher: &Schema,
    lower: &Schema,
    options: &CompareOptions,
) -> Result<bool> {
    Comparator::new(compatible_type_rules(options)).compare(higher, lower)
}
