//! Schema Documents
//!
//! Loads JSON documents into [`Schema`] trees:
//!
//! ```json
//! {
//!   "definitions": {
//!     "Category": {
//!       "kind": "object",
//!       "shape": {
//!         "name": { "kind": "string" },
//!         "children": { "kind": "array", "element": { "$ref": "Category" } }
//!       }
//!     }
//!   },
//!   "schema": { "$ref": "Category" }
//! }
//! ```
//!
//! Every node is an object tagged with `kind`. A `{"$ref": "Name"}` node is a
//! lazy node over the named definition; every reference to one name is the
//! same node, so definitions may refer to themselves. Unknown kinds load as
//! unrecognized nodes. References resolve through the definition table owned
//! by [`LoadedDocument`]; once it is dropped they no longer resolve.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock, Weak};

use crate::classify::SchemaKind;
use crate::error::{CompareError, Result};
use crate::schema::{LazyGetter, LiteralValue, Schema, SchemaDef, TemplatePart};

type DefinitionTable = OnceLock<BTreeMap<String, Schema>>;

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Deserialize)]
struct DocumentFile {
    #[serde(default)]
    definitions: BTreeMap<String, NodeDoc>,
    schema: NodeDoc,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    #[serde(flatten)]
    body: NodeBody,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeBody {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Known(KnownNode),
    Other {
        kind: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum KnownNode {
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
    Object {
        #[serde(default)]
        shape: BTreeMap<String, NodeDoc>,
    },
    Array {
        element: Box<NodeDoc>,
    },
    Tuple {
        items: Vec<NodeDoc>,
        #[serde(default)]
        rest: Option<Box<NodeDoc>>,
    },
    Union {
        options: Vec<NodeDoc>,
    },
    Intersection {
        left: Box<NodeDoc>,
        right: Box<NodeDoc>,
    },
    Record {
        key: Box<NodeDoc>,
        value: Box<NodeDoc>,
    },
    Map {
        key: Box<NodeDoc>,
        value: Box<NodeDoc>,
    },
    Set {
        value: Box<NodeDoc>,
    },
    Enum {
        entries: BTreeMap<String, serde_json::Value>,
    },
    Literal {
        values: Vec<serde_json::Value>,
    },
    Function {
        input: Box<NodeDoc>,
        output: Box<NodeDoc>,
    },
    TemplateLiteral {
        parts: Vec<serde_json::Value>,
    },
    Optional {
        inner: Box<NodeDoc>,
    },
    Nullable {
        inner: Box<NodeDoc>,
    },
    #[serde(rename = "nonoptional")]
    NonOptional {
        inner: Box<NodeDoc>,
    },
    Readonly {
        inner: Box<NodeDoc>,
    },
    Promise {
        inner: Box<NodeDoc>,
    },
    Default {
        inner: Box<NodeDoc>,
        #[serde(default)]
        value: serde_json::Value,
    },
    Prefault {
        inner: Box<NodeDoc>,
        #[serde(default)]
        value: serde_json::Value,
    },
    Catch {
        inner: Box<NodeDoc>,
    },
    Success {
        inner: Box<NodeDoc>,
    },
    Branded {
        inner: Box<NodeDoc>,
        #[serde(default)]
        brand: Option<String>,
    },
    Pipe {
        #[serde(rename = "in")]
        input: Box<NodeDoc>,
        #[serde(rename = "out")]
        output: Box<NodeDoc>,
    },
    Transform,
    Custom {
        #[serde(default)]
        name: Option<String>,
    },
}

// =============================================================================
// Loaded Document
// =============================================================================

/// A document's root schema plus the definition table its references use
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    root: Schema,
    definitions: Arc<DefinitionTable>,
}

impl LoadedDocument {
    pub fn root(&self) -> &Schema {
        &self.root
    }

    pub fn definition(&self, name: &str) -> Option<&Schema> {
        self.definitions.get().and_then(|table| table.get(name))
    }

    pub fn definition_names(&self) -> Vec<&str> {
        self.definitions
            .get()
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Load a document from a JSON string
pub fn from_str(json: &str) -> Result<LoadedDocument> {
    let file: DocumentFile = serde_json::from_str(json)?;
    build(file)
}

/// Load a document from an already-parsed JSON value
pub fn from_value(value: serde_json::Value) -> Result<LoadedDocument> {
    let file: DocumentFile = serde_json::from_value(value)?;
    build(file)
}

/// Load a document from a file
pub fn from_path(path: impl AsRef<Path>) -> Result<LoadedDocument> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading schema document");
    from_str(&content)
}

fn build(file: DocumentFile) -> Result<LoadedDocument> {
    let definitions: Arc<DefinitionTable> = Arc::new(OnceLock::new());
    let mut builder = Builder {
        names: file.definitions.keys().cloned().collect(),
        refs: HashMap::new(),
        table: Arc::downgrade(&definitions),
    };

    let mut table = BTreeMap::new();
    for (name, node) in file.definitions {
        let schema = builder.node(node)?;
        table.insert(name, schema);
    }
    let root = builder.node(file.schema)?;

    tracing::debug!(
        definitions = table.len(),
        references = builder.refs.len(),
        "built schema document"
    );
    // freshly created, so never already set
    let _ = definitions.set(table);

    Ok(LoadedDocument { root, definitions })
}

// =============================================================================
// Builder
// =============================================================================

struct Builder {
    names: Vec<String>,
    refs: HashMap<String, Schema>,
    table: Weak<DefinitionTable>,
}

impl Builder {
    fn node(&mut self, doc: NodeDoc) -> Result<Schema> {
        let schema = match doc.body {
            NodeBody::Ref { reference } => self.reference(reference)?,
            NodeBody::Known(known) => Schema::new(self.known(known)?),
            NodeBody::Other { kind } => unknown_kind(kind)?,
        };
        Ok(match doc.description {
            Some(description) => schema.describe(description),
            None => schema,
        })
    }

    fn boxed(&mut self, doc: Box<NodeDoc>) -> Result<Schema> {
        self.node(*doc)
    }

    fn nodes(&mut self, docs: Vec<NodeDoc>) -> Result<Vec<Schema>> {
        docs.into_iter().map(|doc| self.node(doc)).collect()
    }

    fn reference(&mut self, name: String) -> Result<Schema> {
        if let Some(existing) = self.refs.get(&name) {
            return Ok(existing.clone());
        }
        if !self.names.contains(&name) {
            return Err(CompareError::InvalidDocument(format!(
                "unresolved reference `{}`",
                name
            )));
        }
        let table = self.table.clone();
        let key = name.clone();
        let getter = LazyGetter::new(move || table.upgrade()?.get()?.get(&key).cloned());
        let schema = Schema::lazy_with(getter);
        self.refs.insert(name, schema.clone());
        Ok(schema)
    }

    fn known(&mut self, known: KnownNode) -> Result<SchemaDef> {
        Ok(match known {
            KnownNode::String => SchemaDef::String,
            KnownNode::Number => SchemaDef::Number,
            KnownNode::Boolean => SchemaDef::Boolean,
            KnownNode::BigInt => SchemaDef::BigInt,
            KnownNode::Symbol => SchemaDef::Symbol,
            KnownNode::Date => SchemaDef::Date,
            KnownNode::Null => SchemaDef::Null,
            KnownNode::Undefined => SchemaDef::Undefined,
            KnownNode::Any => SchemaDef::Any,
            KnownNode::Unknown => SchemaDef::Unknown,
            KnownNode::Never => SchemaDef::Never,
            KnownNode::Void => SchemaDef::Void,
            KnownNode::NaN => SchemaDef::NaN,
            KnownNode::File => SchemaDef::File,
            KnownNode::Object { shape } => {
                let mut fields = BTreeMap::new();
                for (key, field) in shape {
                    fields.insert(key, self.node(field)?);
                }
                SchemaDef::Object { shape: fields }
            }
            KnownNode::Array { element } => SchemaDef::Array {
                element: self.boxed(element)?,
            },
            KnownNode::Tuple { items, rest } => SchemaDef::Tuple {
                items: self.nodes(items)?,
                rest: rest.map(|rest| self.boxed(rest)).transpose()?,
            },
            KnownNode::Union { options } => SchemaDef::Union {
                options: self.nodes(options)?,
            },
            KnownNode::Intersection { left, right } => SchemaDef::Intersection {
                left: self.boxed(left)?,
                right: self.boxed(right)?,
            },
            KnownNode::Record { key, value } => SchemaDef::Record {
                key: self.boxed(key)?,
                value: self.boxed(value)?,
            },
            KnownNode::Map { key, value } => SchemaDef::Map {
                key: self.boxed(key)?,
                value: self.boxed(value)?,
            },
            KnownNode::Set { value } => SchemaDef::Set {
                value: self.boxed(value)?,
            },
            KnownNode::Enum { entries } => SchemaDef::Enum {
                entries: entries
                    .into_iter()
                    .map(|(label, value)| literal_value(value).map(|value| (label, value)))
                    .collect::<Result<_>>()?,
            },
            KnownNode::Literal { values } => SchemaDef::Literal {
                values: values.into_iter().map(literal_value).collect::<Result<_>>()?,
            },
            KnownNode::Function { input, output } => SchemaDef::Function {
                input: self.boxed(input)?,
                output: self.boxed(output)?,
            },
            KnownNode::TemplateLiteral { parts } => SchemaDef::TemplateLiteral {
                parts: parts
                    .into_iter()
                    .map(|part| self.template_part(part))
                    .collect::<Result<_>>()?,
            },
            KnownNode::Optional { inner } => SchemaDef::Optional {
                inner: self.boxed(inner)?,
            },
            KnownNode::Nullable { inner } => SchemaDef::Nullable {
                inner: self.boxed(inner)?,
            },
            KnownNode::NonOptional { inner } => SchemaDef::NonOptional {
                inner: self.boxed(inner)?,
            },
            KnownNode::Readonly { inner } => SchemaDef::Readonly {
                inner: self.boxed(inner)?,
            },
            KnownNode::Promise { inner } => SchemaDef::Promise {
                inner: self.boxed(inner)?,
            },
            KnownNode::Default { inner, value } => SchemaDef::Default {
                inner: self.boxed(inner)?,
                value,
            },
            KnownNode::Prefault { inner, value } => SchemaDef::Prefault {
                inner: self.boxed(inner)?,
                value,
            },
            KnownNode::Catch { inner } => SchemaDef::Catch {
                inner: self.boxed(inner)?,
            },
            KnownNode::Success { inner } => SchemaDef::Success {
                inner: self.boxed(inner)?,
            },
            KnownNode::Branded { inner, brand } => SchemaDef::Branded {
                inner: self.boxed(inner)?,
                brand,
            },
            KnownNode::Pipe { input, output } => SchemaDef::Pipe {
                input: self.boxed(input)?,
                output: self.boxed(output)?,
            },
            KnownNode::Transform => SchemaDef::Transform,
            KnownNode::Custom { name } => SchemaDef::Custom { name },
        })
    }

    /// Objects with `kind` or `$ref` are embedded schemas, anything else is a literal
    fn template_part(&mut self, part: serde_json::Value) -> Result<TemplatePart> {
        let is_node = part
            .as_object()
            .is_some_and(|map| map.contains_key("kind") || map.contains_key("$ref"));
        if is_node {
            let doc: NodeDoc = serde_json::from_value(part)?;
            return Ok(TemplatePart::Schema(self.node(doc)?));
        }
        Ok(TemplatePart::Literal(literal_value(part)?))
    }
}

/// A kind that failed to parse as a known node
///
/// Known kinds end up here only when their fields are missing or malformed.
fn unknown_kind(kind: String) -> Result<Schema> {
    let known = serde_json::from_value::<SchemaKind>(serde_json::Value::String(kind.clone()));
    match known {
        Ok(SchemaKind::Lazy) => Err(CompareError::InvalidDocument(
            "lazy nodes are written as {\"$ref\": \"Name\"}".to_string(),
        )),
        Ok(SchemaKind::Unrecognized) | Err(_) => {
            tracing::debug!(kind = %kind, "loading unrecognized schema kind");
            Ok(Schema::unrecognized(kind))
        }
        Ok(_) => Err(CompareError::InvalidDocument(format!(
            "malformed `{}` node",
            kind
        ))),
    }
}

/// JSON scalar to literal; `{"bigint": "12"}` and `{"undefined": true}` cover the rest
fn literal_value(value: serde_json::Value) -> Result<LiteralValue> {
    use serde_json::Value;

    match value {
        Value::String(s) => Ok(LiteralValue::String(s)),
        Value::Bool(b) => Ok(LiteralValue::Boolean(b)),
        Value::Null => Ok(LiteralValue::Null),
        Value::Number(n) => n
            .as_f64()
            .map(LiteralValue::Number)
            .ok_or_else(|| CompareError::InvalidDocument(format!("unsupported number {}", n))),
        Value::Object(map) => {
            if let Some(big) = map.get("bigint") {
                let parsed = match big {
                    Value::String(s) => s.parse::<i128>().ok(),
                    Value::Number(n) => n.as_i64().map(i128::from),
                    _ => None,
                };
                return parsed.map(LiteralValue::BigInt).ok_or_else(|| {
                    CompareError::InvalidDocument(format!("invalid bigint literal {}", big))
                });
            }
            if map.contains_key("undefined") {
                return Ok(LiteralValue::Undefined);
            }
            Err(CompareError::InvalidDocument(format!(
                "unsupported literal {}",
                Value::Object(map)
            )))
        }
        Value::Array(_) => Err(CompareError::InvalidDocument(format!(
            "unsupported literal {}",
            value
        ))),
    }
}
