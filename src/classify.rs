//! Node Classification
//!
//! Maps schema nodes to their discriminant kind and answers the questions the
//! rules ask before doing any structural work: is this a kind the engine
//! understands, is it a leaf, is it a transparent wrapper.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{Schema, SchemaDef};

// =============================================================================
// Schema Kind
// =============================================================================

/// Discriminant tag of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    #[serde(rename = "bigint")]
    BigInt,
    Symbol,
    Date,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    #[serde(rename = "nan")]
    NaN,
    File,
    Object,
    Array,
    Tuple,
    Union,
    Intersection,
    Record,
    Map,
    Set,
    Enum,
    Literal,
    Function,
    TemplateLiteral,
    Optional,
    Nullable,
    #[serde(rename = "nonoptional")]
    NonOptional,
    Readonly,
    Promise,
    Default,
    Prefault,
    Catch,
    Success,
    Branded,
    Pipe,
    Lazy,
    Transform,
    Custom,
    Unrecognized,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::BigInt => "bigint",
            Self::Symbol => "symbol",
            Self::Date => "date",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Void => "void",
            Self::NaN => "nan",
            Self::File => "file",
            Self::Object => "object",
            Self::Array => "array",
            Self::Tuple => "tuple",
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Record => "record",
            Self::Map => "map",
            Self::Set => "set",
            Self::Enum => "enum",
            Self::Literal => "literal",
            Self::Function => "function",
            Self::TemplateLiteral => "template_literal",
            Self::Optional => "optional",
            Self::Nullable => "nullable",
            Self::NonOptional => "nonoptional",
            Self::Readonly => "readonly",
            Self::Promise => "promise",
            Self::Default => "default",
            Self::Prefault => "prefault",
            Self::Catch => "catch",
            Self::Success => "success",
            Self::Branded => "branded",
            Self::Pipe => "pipe",
            Self::Lazy => "lazy",
            Self::Transform => "transform",
            Self::Custom => "custom",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Leaf kinds: equal kind means equal type (value constraints are not compared)
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Number
                | Self::Boolean
                | Self::BigInt
                | Self::Symbol
                | Self::Date
                | Self::Null
                | Self::Undefined
                | Self::Any
                | Self::Unknown
                | Self::Never
                | Self::Void
                | Self::NaN
                | Self::File
        )
    }

    /// Kinds whose comparison is only approximate
    pub fn is_unstable(&self) -> bool {
        matches!(
            self,
            Self::Default | Self::Prefault | Self::Success | Self::Catch | Self::Pipe | Self::Lazy
        )
    }

    /// Kinds no rule can decide structurally
    pub fn is_undecidable(&self) -> bool {
        matches!(self, Self::Transform | Self::Custom)
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Discriminant kind of a node
pub fn classify(schema: &Schema) -> SchemaKind {
    match schema.def() {
        SchemaDef::String => SchemaKind::String,
        SchemaDef::Number => SchemaKind::Number,
        SchemaDef::Boolean => SchemaKind::Boolean,
        SchemaDef::BigInt => SchemaKind::BigInt,
        SchemaDef::Symbol => SchemaKind::Symbol,
        SchemaDef::Date => SchemaKind::Date,
        SchemaDef::Null => SchemaKind::Null,
        SchemaDef::Undefined => SchemaKind::Undefined,
        SchemaDef::Any => SchemaKind::Any,
        SchemaDef::Unknown => SchemaKind::Unknown,
        SchemaDef::Never => SchemaKind::Never,
        SchemaDef::Void => SchemaKind::Void,
        SchemaDef::NaN => SchemaKind::NaN,
        SchemaDef::File => SchemaKind::File,
        SchemaDef::Object { .. } => SchemaKind::Object,
        SchemaDef::Array { .. } => SchemaKind::Array,
        SchemaDef::Tuple { .. } => SchemaKind::Tuple,
        SchemaDef::Union { .. } => SchemaKind::Union,
        SchemaDef::Intersection { .. } => SchemaKind::Intersection,
        SchemaDef::Record { .. } => SchemaKind::Record,
        SchemaDef::Map { .. } => SchemaKind::Map,
        SchemaDef::Set { .. } => SchemaKind::Set,
        SchemaDef::Enum { .. } => SchemaKind::Enum,
        SchemaDef::Literal { .. } => SchemaKind::Literal,
        SchemaDef::Function { .. } => SchemaKind::Function,
        SchemaDef::TemplateLiteral { .. } => SchemaKind::TemplateLiteral,
        SchemaDef::Optional { .. } => SchemaKind::Optional,
        SchemaDef::Nullable { .. } => SchemaKind::Nullable,
        SchemaDef::NonOptional { .. } => SchemaKind::NonOptional,
        SchemaDef::Readonly { .. } => SchemaKind::Readonly,
        SchemaDef::Promise { .. } => SchemaKind::Promise,
        SchemaDef::Default { .. } => SchemaKind::Default,
        SchemaDef::Prefault { .. } => SchemaKind::Prefault,
        SchemaDef::Catch { .. } => SchemaKind::Catch,
        SchemaDef::Success { .. } => SchemaKind::Success,
        SchemaDef::Branded { .. } => SchemaKind::Branded,
        SchemaDef::Pipe { .. } => SchemaKind::Pipe,
        SchemaDef::Lazy { .. } => SchemaKind::Lazy,
        SchemaDef::Transform => SchemaKind::Transform,
        SchemaDef::Custom { .. } => SchemaKind::Custom,
        SchemaDef::Unrecognized { .. } => SchemaKind::Unrecognized,
    }
}

/// Whether the node's kind belongs to the closed set the engine understands
///
/// Reference identity is checked before kinds, so an unrecognized node still
/// equals itself. Two distinct unrecognized nodes are never equal.
pub fn is_comparable_kind(schema: &Schema) -> bool {
    classify(schema) != SchemaKind::Unrecognized
}

pub fn is_simple_kind(schema: &Schema) -> bool {
    classify(schema).is_simple()
}

/// Child of a transparent single-child wrapper
///
/// Branded nodes are not included; brand tags need their own policy.
pub fn inner_type(schema: &Schema) -> Option<&Schema> {
    match schema.def() {
        SchemaDef::Optional { inner }
        | SchemaDef::Nullable { inner }
        | SchemaDef::NonOptional { inner }
        | SchemaDef::Readonly { inner }
        | SchemaDef::Promise { inner }
        | SchemaDef::Default { inner, .. }
        | SchemaDef::Prefault { inner, .. }
        | SchemaDef::Catch { inner }
        | SchemaDef::Success { inner } => Some(inner),
        _ => None,
    }
}

/// Options of a union with nested unions spliced in, depth-first
///
/// Non-union nodes yield themselves.
pub fn flatten_union(schema: &Schema) -> Vec<Schema> {
    match schema.def() {
        SchemaDef::Union { options } => options.iter().flat_map(flatten_union).collect(),
        _ => vec![schema.clone()],
    }
}
