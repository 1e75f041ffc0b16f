use indexmap::IndexMap;
use std::sync::Arc;

use crate::compiler::{compile, FieldDescription};
use crate::value::Decoded;
use crate::Result;

/// Compiled schema: the immutable decoder tree shared by every decode call
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root: SchemaNode,
}

/// Child fields of an object or table, in declaration order
pub type Fields = IndexMap<Arc<str>, Field>;

/// Represents a node in the schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A single bool, int, double or string
    Scalar(ScalarKind),
    /// A JSON array of one scalar kind
    Vector(ScalarKind),
    /// A JSON object decoded into a record
    Object(Fields),
    /// A JSON array of objects decoded into columns
    Table(Fields),
    /// A JSON array of tables
    ListOfTable(Fields),
}

/// Scalar kinds supported by the codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Double,
    String,
}

/// A named child of an object or table together with its pre-converted default
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    node: SchemaNode,
    default: Decoded,
}

impl Field {
    pub(crate) fn new(node: SchemaNode, default: Decoded) -> Self {
        Self { node, default }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    /// Value used when the field's key is absent from the input
    pub fn default(&self) -> &Decoded {
        &self.default
    }
}

impl SchemaNode {
    /// Type tag of this node as written in schema descriptions
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::Scalar(ScalarKind::Bool) => "bool",
            SchemaNode::Scalar(ScalarKind::Int) => "int",
            SchemaNode::Scalar(ScalarKind::Double) => "dbl",
            SchemaNode::Scalar(ScalarKind::String) => "str",
            SchemaNode::Vector(ScalarKind::Bool) => "bool_vec",
            SchemaNode::Vector(ScalarKind::Int) => "int_vec",
            SchemaNode::Vector(ScalarKind::Double) => "dbl_vec",
            SchemaNode::Vector(ScalarKind::String) => "str_vec",
            SchemaNode::Object(_) => "object",
            SchemaNode::Table(_) => "table",
            SchemaNode::ListOfTable(_) => "list_of_table",
        }
    }

    /// Child fields of aggregate nodes
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            SchemaNode::Object(fields)
            | SchemaNode::Table(fields)
            | SchemaNode::ListOfTable(fields) => Some(fields),
            SchemaNode::Scalar(_) | SchemaNode::Vector(_) => None,
        }
    }

    /// The null sentinel produced for an explicit JSON `null` at this node
    pub fn null_value(&self) -> Decoded {
        match self {
            SchemaNode::Scalar(ScalarKind::Bool) => Decoded::Bool(None),
            SchemaNode::Scalar(ScalarKind::Int) => Decoded::Int(None),
            SchemaNode::Scalar(ScalarKind::Double) => Decoded::Double(None),
            SchemaNode::Scalar(ScalarKind::String) => Decoded::String(None),
            SchemaNode::Vector(_) => Decoded::Vector(None),
            SchemaNode::Object(_) => Decoded::Record(None),
            SchemaNode::Table(_) => Decoded::Table(None),
            SchemaNode::ListOfTable(_) => Decoded::TableList(None),
        }
    }
}

impl ScalarKind {
    /// Name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
        }
    }
}

impl Schema {
    /// Compile a schema description
    pub fn from_description(description: &FieldDescription) -> Result<Self> {
        Ok(Self {
            root: compile(description)?,
        })
    }

    /// Parse and compile a schema description given as JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let description: FieldDescription = serde_json::from_str(text)?;
        Self::from_description(&description)
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }
}

/// Builder for creating schemas
pub struct SchemaBuilder {
    root: Option<FieldDescription>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(mut self, root: FieldDescription) -> Self {
        self.root = Some(root);
        self
    }

    pub fn build(self) -> Result<Schema> {
        match self.root {
            Some(root) => Schema::from_description(&root),
            None => Err(crate::JsonFrameError::schema("Schema must have a root node")),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
