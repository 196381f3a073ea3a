//! Schema nodes
//!
//! The uniform node shape the comparison engine consumes. A [`Schema`] is a
//! cheap, shared handle to an immutable [`SchemaNode`]; cloning a handle keeps
//! the node's identity, which the engine uses as a fast path (never as a
//! substitute for structural comparison).
//!
//! Nodes form a tree. Lazy nodes hold a producer that yields another node on
//! demand, which is how self-referential schemas are expressed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::classify::{classify, SchemaKind};

// =============================================================================
// Schema Handle
// =============================================================================

/// Shared handle to a schema node
#[derive(Clone)]
pub struct Schema(Arc<SchemaNode>);

/// A schema node: its definition plus metadata the engine ignores
#[derive(Debug)]
pub struct SchemaNode {
    /// Kind-specific definition
    pub def: SchemaDef,
    /// Free-form description (not part of the type)
    pub description: Option<String>,
}

/// Kind-specific definition of a schema node
#[derive(Debug, Clone)]
pub enum SchemaDef {
    // === Primitives ===
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Date,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    NaN,
    File,

    // === Structural ===
    Object { shape: BTreeMap<String, Schema> },
    Array { element: Schema },
    Tuple { items: Vec<Schema>, rest: Option<Schema> },
    Union { options: Vec<Schema> },
    Intersection { left: Schema, right: Schema },
    Record { key: Schema, value: Schema },
    Map { key: Schema, value: Schema },
    Set { value: Schema },
    Enum { entries: BTreeMap<String, LiteralValue> },
    Literal { values: Vec<LiteralValue> },
    Function { input: Schema, output: Schema },
    TemplateLiteral { parts: Vec<TemplatePart> },

    // === Wrappers ===
    Optional { inner: Schema },
    Nullable { inner: Schema },
    NonOptional { inner: Schema },
    Readonly { inner: Schema },
    Promise { inner: Schema },
    /// The default value itself is not part of the type
    Default { inner: Schema, value: serde_json::Value },
    Prefault { inner: Schema, value: serde_json::Value },
    Catch { inner: Schema },
    Success { inner: Schema },
    /// Runtime brand tag; `None` when the representation kept the wrapper but not the tag
    Branded { inner: Schema, brand: Option<String> },

    // === Computed ===
    Pipe { input: Schema, output: Schema },
    Lazy { getter: LazyGetter },
    Transform,
    Custom { name: Option<String> },

    /// A kind outside the closed set this engine understands
    Unrecognized { kind: String },
}

impl Schema {
    /// Wrap a definition in a fresh node
    pub fn new(def: SchemaDef) -> Self {
        Self(Arc::new(SchemaNode {
            def,
            description: None,
        }))
    }

    pub fn def(&self) -> &SchemaDef {
        &self.0.def
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    /// Copy of this node carrying a description (a new node identity)
    pub fn describe(&self, description: impl Into<String>) -> Self {
        Self(Arc::new(SchemaNode {
            def: self.0.def.clone(),
            description: Some(description.into()),
        }))
    }

    /// Whether both handles point at the same node
    pub fn ptr_eq(a: &Schema, b: &Schema) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Identity of the node, stable for the node's lifetime
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn kind(&self) -> SchemaKind {
        classify(self)
    }

    /// Discriminant tag as written, including the tag of unrecognized nodes
    pub fn kind_name(&self) -> &str {
        match &self.0.def {
            SchemaDef::Unrecognized { kind } => kind,
            _ => self.kind().as_str(),
        }
    }

    // --- Primitives ---

    pub fn string() -> Self {
        Self::new(SchemaDef::String)
    }

    pub fn number() -> Self {
        Self::new(SchemaDef::Number)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaDef::Boolean)
    }

    pub fn bigint() -> Self {
        Self::new(SchemaDef::BigInt)
    }

    pub fn symbol() -> Self {
        Self::new(SchemaDef::Symbol)
    }

    pub fn date() -> Self {
        Self::new(SchemaDef::Date)
    }

    pub fn null() -> Self {
        Self::new(SchemaDef::Null)
    }

    pub fn undefined() -> Self {
        Self::new(SchemaDef::Undefined)
    }

    pub fn any() -> Self {
        Self::new(SchemaDef::Any)
    }

    pub fn unknown() -> Self {
        Self::new(SchemaDef::Unknown)
    }

    pub fn never() -> Self {
        Self::new(SchemaDef::Never)
    }

    pub fn void() -> Self {
        Self::new(SchemaDef::Void)
    }

    pub fn nan() -> Self {
        Self::new(SchemaDef::NaN)
    }

    pub fn file() -> Self {
        Self::new(SchemaDef::File)
    }

    // --- Structural ---

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let shape = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(SchemaDef::Object { shape })
    }

    pub fn array(element: Schema) -> Self {
        Self::new(SchemaDef::Array { element })
    }

    pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Self {
        Self::new(SchemaDef::Tuple {
            items: items.into_iter().collect(),
            rest: None,
        })
    }

    /// Tuple with a trailing variadic element
    pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Self {
        Self::new(SchemaDef::Tuple {
            items: items.into_iter().collect(),
            rest: Some(rest),
        })
    }

    pub fn union(options: impl IntoIterator<Item = Schema>) -> Self {
        Self::new(SchemaDef::Union {
            options: options.into_iter().collect(),
        })
    }

    pub fn intersection(left: Schema, right: Schema) -> Self {
        Self::new(SchemaDef::Intersection { left, right })
    }

    pub fn record(key: Schema, value: Schema) -> Self {
        Self::new(SchemaDef::Record { key, value })
    }

    pub fn map(key: Schema, value: Schema) -> Self {
        Self::new(SchemaDef::Map { key, value })
    }

    pub fn set(value: Schema) -> Self {
        Self::new(SchemaDef::Set { value })
    }

    /// Enum from label/value pairs
    pub fn enumeration<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<LiteralValue>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(SchemaDef::Enum { entries })
    }

    /// Enum whose labels are their own values
    pub fn string_enum<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::enumeration(labels.into_iter().map(|s| {
            let s = s.into();
            (s.clone(), LiteralValue::String(s))
        }))
    }

    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self::new(SchemaDef::Literal {
            values: vec![value.into()],
        })
    }

    pub fn literals<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<LiteralValue>,
    {
        Self::new(SchemaDef::Literal {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Function signature; `input` is normally a tuple of parameters
    pub fn function(input: Schema, output: Schema) -> Self {
        Self::new(SchemaDef::Function { input, output })
    }

    pub fn template_literal(parts: impl IntoIterator<Item = TemplatePart>) -> Self {
        Self::new(SchemaDef::TemplateLiteral {
            parts: parts.into_iter().collect(),
        })
    }

    pub fn pipe(input: Schema, output: Schema) -> Self {
        Self::new(SchemaDef::Pipe { input, output })
    }

    /// Lazy node whose producer always yields a schema
    ///
    /// The producer must hand back a shared node. A producer that builds a
    /// fresh tree on every call (`Schema::lazy(category)` inside `fn category()`)
    /// never repeats a node pair, so comparing it recurses without end. Use
    /// [`Schema::recursive`] for self-referential schemas.
    pub fn lazy(producer: impl Fn() -> Schema + Send + Sync + 'static) -> Self {
        Self::lazy_with(LazyGetter::new(move || Some(producer())))
    }

    /// Self-referential schema
    ///
    /// `body` receives a lazy node standing for the schema being built and
    /// returns its definition. The lazy node refers back to the result weakly:
    /// it stops resolving once the returned handle and its clones are dropped.
    ///
    /// ```
    /// use schema_compare::{is_same_type, Schema};
    ///
    /// let category = || {
    ///     Schema::recursive(|this| {
    ///         Schema::object([("name", Schema::string()), ("children", Schema::array(this))])
    ///     })
    /// };
    /// assert!(is_same_type(&category(), &category()).unwrap());
    /// ```
    pub fn recursive(body: impl FnOnce(Schema) -> Schema) -> Self {
        Self(Arc::new_cyclic(|root: &Weak<SchemaNode>| {
            let root = root.clone();
            let this = Self::lazy_with(LazyGetter::new(move || root.upgrade().map(Schema)));
            let schema = body(this);
            Arc::try_unwrap(schema.0).unwrap_or_else(|shared| SchemaNode {
                def: shared.def.clone(),
                description: shared.description.clone(),
            })
        }))
    }

    /// Lazy node sharing an existing producer
    pub fn lazy_with(getter: LazyGetter) -> Self {
        Self::new(SchemaDef::Lazy { getter })
    }

    pub fn transform() -> Self {
        Self::new(SchemaDef::Transform)
    }

    pub fn custom(name: Option<String>) -> Self {
        Self::new(SchemaDef::Custom { name })
    }

    pub fn unrecognized(kind: impl Into<String>) -> Self {
        Self::new(SchemaDef::Unrecognized { kind: kind.into() })
    }

    // --- Wrappers ---

    pub fn optional(&self) -> Self {
        Self::new(SchemaDef::Optional { inner: self.clone() })
    }

    pub fn nullable(&self) -> Self {
        Self::new(SchemaDef::Nullable { inner: self.clone() })
    }

    pub fn non_optional(&self) -> Self {
        Self::new(SchemaDef::NonOptional { inner: self.clone() })
    }

    pub fn readonly(&self) -> Self {
        Self::new(SchemaDef::Readonly { inner: self.clone() })
    }

    pub fn promise(&self) -> Self {
        Self::new(SchemaDef::Promise { inner: self.clone() })
    }

    pub fn with_default(&self, value: serde_json::Value) -> Self {
        Self::new(SchemaDef::Default {
            inner: self.clone(),
            value,
        })
    }

    pub fn prefault(&self, value: serde_json::Value) -> Self {
        Self::new(SchemaDef::Prefault {
            inner: self.clone(),
            value,
        })
    }

    pub fn catch(&self) -> Self {
        Self::new(SchemaDef::Catch { inner: self.clone() })
    }

    pub fn success(&self) -> Self {
        Self::new(SchemaDef::Success { inner: self.clone() })
    }

    pub fn brand(&self, tag: impl Into<String>) -> Self {
        Self::new(SchemaDef::Branded {
            inner: self.clone(),
            brand: Some(tag.into()),
        })
    }

    /// `self | other`
    pub fn or(&self, other: &Schema) -> Self {
        Self::union([self.clone(), other.clone()])
    }

    /// `self & other`
    pub fn and(&self, other: &Schema) -> Self {
        Self::intersection(self.clone(), other.clone())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Literal Values
// =============================================================================

/// A primitive value held by literal, enum and template nodes
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    BigInt(i128),
    Boolean(bool),
    Null,
    Undefined,
}

impl LiteralValue {
    /// Equality where NaN matches NaN and the two zeros match each other
    pub fn same_value(&self, other: &LiteralValue) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for LiteralValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{:?}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::BigInt(n) => write!(f, "{}n", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

// =============================================================================
// Template Parts
// =============================================================================

/// One segment of a template literal: raw text/value or an embedded schema
#[derive(Debug, Clone)]
pub enum TemplatePart {
    Literal(LiteralValue),
    Schema(Schema),
}

impl From<&str> for TemplatePart {
    fn from(s: &str) -> Self {
        Self::Literal(s.into())
    }
}

impl From<Schema> for TemplatePart {
    fn from(s: Schema) -> Self {
        Self::Schema(s)
    }
}

// =============================================================================
// Lazy Producer
// =============================================================================

type LazyFn = dyn Fn() -> Option<Schema> + Send + Sync;

/// Producer behind a lazy node
///
/// Clones share the producer, so two lazy nodes built from clones of one
/// getter compare equal without being forced. `None` means the producer could
/// not yield a node (for example, its definition table was dropped).
#[derive(Clone)]
pub struct LazyGetter(Arc<LazyFn>);

impl LazyGetter {
    pub fn new(producer: impl Fn() -> Option<Schema> + Send + Sync + 'static) -> Self {
        Self(Arc::new(producer))
    }

    pub fn resolve(&self) -> Option<Schema> {
        (self.0)()
    }

    /// Whether both getters share one producer
    pub fn ptr_eq(a: &LazyGetter, b: &LazyGetter) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&a.0) as *const (),
            Arc::as_ptr(&b.0) as *const (),
        )
    }
}

impl fmt::Debug for LazyGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyGetter({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Display
// =============================================================================

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Schema], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def() {
            SchemaDef::Object { shape } => {
                if shape.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in shape.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str(" }")
            }
            SchemaDef::Array { element } => write!(f, "Array<{}>", element),
            SchemaDef::Tuple { items, rest } => {
                f.write_str("[")?;
                write_joined(f, items, ", ")?;
                if let Some(rest) = rest {
                    if !items.is_empty() {
                        f.write_str(", ")?;
                    }
                    write!(f, "...Array<{}>", rest)?;
                }
                f.write_str("]")
            }
            SchemaDef::Union { options } => {
                f.write_str("(")?;
                write_joined(f, options, " | ")?;
                f.write_str(")")
            }
            SchemaDef::Intersection { left, right } => write!(f, "({} & {})", left, right),
            SchemaDef::Record { key, value } => write!(f, "Record<{}, {}>", key, value),
            SchemaDef::Map { key, value } => write!(f, "Map<{}, {}>", key, value),
            SchemaDef::Set { value } => write!(f, "Set<{}>", value),
            SchemaDef::Enum { entries } => {
                f.write_str("enum(")?;
                for (i, label) in entries.keys().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(label)?;
                }
                f.write_str(")")
            }
            SchemaDef::Literal { values } => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            SchemaDef::Function { input, output } => write!(f, "({}) => {}", input, output),
            SchemaDef::TemplateLiteral { parts } => {
                f.write_str("`")?;
                for part in parts {
                    match part {
                        TemplatePart::Literal(LiteralValue::String(s)) => f.write_str(s)?,
                        TemplatePart::Literal(value) => write!(f, "{}", value)?,
                        TemplatePart::Schema(schema) => write!(f, "${{{}}}", schema)?,
                    }
                }
                f.write_str("`")
            }
            SchemaDef::Optional { inner }
            | SchemaDef::Nullable { inner }
            | SchemaDef::NonOptional { inner }
            | SchemaDef::Readonly { inner }
            | SchemaDef::Default { inner, .. }
            | SchemaDef::Prefault { inner, .. }
            | SchemaDef::Catch { inner }
            | SchemaDef::Success { inner } => write!(f, "{}<{}>", self.kind_name(), inner),
            SchemaDef::Promise { inner } => write!(f, "Promise<{}>", inner),
            SchemaDef::Branded { inner, brand } => match brand {
                Some(tag) => write!(f, "branded<{}, {:?}>", inner, tag),
                None => write!(f, "branded<{}>", inner),
            },
            SchemaDef::Pipe { input, output } => write!(f, "pipe<{}, {}>", input, output),
            SchemaDef::Custom { name: Some(name) } => write!(f, "custom<{}>", name),
            SchemaDef::Unrecognized { kind } => write!(f, "<{}>", kind),
            // Lazy nodes are printed without forcing the producer
            _ => f.write_str(self.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_keeps_identity() {
        let a = Schema::string();
        let b = a.clone();
        assert!(Schema::ptr_eq(&a, &b));
        assert_eq!(a.id(), b.id());
        assert!(!Schema::ptr_eq(&a, &Schema::string()));
    }

    #[test]
    fn test_describe_creates_new_node() {
        let a = Schema::string();
        let described = a.describe("name");
        assert_eq!(described.description(), Some("name"));
        assert!(a.description().is_none());
        assert!(!Schema::ptr_eq(&a, &described));
    }

    #[test]
    fn test_same_value_nan() {
        assert!(LiteralValue::Number(f64::NAN).same_value(&LiteralValue::Number(f64::NAN)));
        assert!(LiteralValue::Number(0.0).same_value(&LiteralValue::Number(-0.0)));
        assert!(!LiteralValue::from("1").same_value(&LiteralValue::from(1)));
    }

    #[test]
    fn test_lazy_getter_identity() {
        let getter = LazyGetter::new(|| Some(Schema::string()));
        let other = LazyGetter::new(|| Some(Schema::string()));
        assert!(LazyGetter::ptr_eq(&getter, &getter.clone()));
        assert!(!LazyGetter::ptr_eq(&getter, &other));
    }

    #[test]
    fn test_recursive_points_back_to_root() {
        let list = Schema::recursive(|this| {
            Schema::object([("value", Schema::number()), ("next", this.optional())])
        });
        let SchemaDef::Object { shape } = list.def() else {
            panic!("expected object, got {:?}", list.kind());
        };
        let SchemaDef::Optional { inner } = shape["next"].def() else {
            panic!("expected optional");
        };
        let SchemaDef::Lazy { getter } = inner.def() else {
            panic!("expected lazy");
        };
        assert!(Schema::ptr_eq(&getter.resolve().unwrap(), &list));

        let getter = getter.clone();
        drop(list);
        assert!(getter.resolve().is_none());
    }

    #[test]
    fn test_display() {
        let schema = Schema::object([
            ("name", Schema::string()),
            ("tags", Schema::array(Schema::string()).optional()),
        ]);
        assert_eq!(
            schema.to_string(),
            "{ name: string; tags: optional<Array<string>> }"
        );
        let tuple = Schema::tuple_with_rest([Schema::string()], Schema::number());
        assert_eq!(tuple.to_string(), "[string, ...Array<number>]");
        let lazy = Schema::lazy(Schema::string);
        assert_eq!(lazy.to_string(), "lazy");
        let template = Schema::template_literal([
            TemplatePart::from("id-"),
            TemplatePart::from(Schema::number()),
        ]);
        assert_eq!(template.to_string(), "`id-${number}`");
    }
}
