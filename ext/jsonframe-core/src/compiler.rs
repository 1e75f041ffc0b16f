//! Schema description and its compilation into a [`SchemaNode`] tree
//!
//! A description is a tree of `{name, type, default, fields}` records, usually deserialized from
//! JSON. Compilation resolves each type tag, checks field names and pre-converts every default
//! into the decoded form of its field, so that decoding never has to look at the description
//! again. All description problems surface here as [`JsonFrameError::Schema`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::decoder::{decode_node, DecodeOptions, IntegerOverflow};
use crate::path::JsonPath;
use crate::schema::{Field, Fields, ScalarKind, SchemaNode};
use crate::table::decode_table;
use crate::value::Decoded;
use crate::{JsonFrameError, Result};

/// One record of a schema description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescription {
    /// Field name; may be omitted on the root
    #[serde(default, alias = "path", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Type tag, see [`TypeTag`]
    #[serde(rename = "type")]
    pub type_tag: String,

    /// Value used when the field is absent. Missing or `null` means the null sentinel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Children of `object`, `table` and `list_of_table` fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescription>>,
}

/// Type tags accepted in a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Int,
    Dbl,
    Str,
    BoolVec,
    IntVec,
    DblVec,
    StrVec,
    Object,
    Table,
    ListOfTable,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Dbl => "dbl",
            TypeTag::Str => "str",
            TypeTag::BoolVec => "bool_vec",
            TypeTag::IntVec => "int_vec",
            TypeTag::DblVec => "dbl_vec",
            TypeTag::StrVec => "str_vec",
            TypeTag::Object => "object",
            TypeTag::Table => "table",
            TypeTag::ListOfTable => "list_of_table",
        }
    }

    fn is_aggregate(&self) -> bool {
        matches!(self, TypeTag::Object | TypeTag::Table | TypeTag::ListOfTable)
    }
}

impl FromStr for TypeTag {
    type Err = JsonFrameError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "bool" | "lgl" => TypeTag::Bool,
            "int" => TypeTag::Int,
            "dbl" => TypeTag::Dbl,
            "str" => TypeTag::Str,
            "bool_vec" | "lgl_vec" => TypeTag::BoolVec,
            "int_vec" => TypeTag::IntVec,
            "dbl_vec" => TypeTag::DblVec,
            "str_vec" => TypeTag::StrVec,
            "object" | "list" => TypeTag::Object,
            "table" | "df" => TypeTag::Table,
            "list_of_table" => TypeTag::ListOfTable,
            _ => {
                return Err(JsonFrameError::schema(format!(
                    "Unknown type tag '{}'",
                    s
                )))
            }
        })
    }
}

impl FieldDescription {
    pub fn new<S: Into<String>>(name: S, type_tag: TypeTag) -> Self {
        Self {
            name: Some(name.into()),
            type_tag: type_tag.as_str().to_string(),
            default: None,
            fields: None,
        }
    }

    /// Unnamed description used as a schema root
    pub fn root(type_tag: TypeTag) -> Self {
        Self {
            name: None,
            type_tag: type_tag.as_str().to_string(),
            default: None,
            fields: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescription>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Where a node sits, which decides how aggregate kinds are materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Root,
    /// Child of an object: values are decoded one at a time
    Object,
    /// Child of a table: values become columns
    Column,
}

/// Compile a description into the decoder tree
pub fn compile(root: &FieldDescription) -> Result<SchemaNode> {
    if root.default.as_ref().is_some_and(|d| !d.is_null()) {
        return Err(JsonFrameError::schema(
            "The schema root cannot declare a default",
        ));
    }

    let node = compile_node(root, "<root>", Placement::Root)?;
    debug!(
        root = node.type_name(),
        fields = node.fields().map_or(0, |f| f.len()),
        "compiled schema"
    );
    Ok(node)
}

fn compile_node(
    description: &FieldDescription,
    location: &str,
    placement: Placement,
) -> Result<SchemaNode> {
    let tag: TypeTag = in_field(description.type_tag.parse(), || {
        format!("Field '{}'", location)
    })?;

    if !tag.is_aggregate() && description.fields.is_some() {
        return Err(JsonFrameError::schema(format!(
            "Field '{}' of type '{}' cannot have nested fields",
            location,
            tag.as_str()
        )));
    }

    Ok(match tag {
        TypeTag::Bool => SchemaNode::Scalar(ScalarKind::Bool),
        TypeTag::Int => SchemaNode::Scalar(ScalarKind::Int),
        TypeTag::Dbl => SchemaNode::Scalar(ScalarKind::Double),
        TypeTag::Str => SchemaNode::Scalar(ScalarKind::String),
        TypeTag::BoolVec => SchemaNode::Vector(ScalarKind::Bool),
        TypeTag::IntVec => SchemaNode::Vector(ScalarKind::Int),
        TypeTag::DblVec => SchemaNode::Vector(ScalarKind::Double),
        TypeTag::StrVec => SchemaNode::Vector(ScalarKind::String),
        TypeTag::Object => {
            // inside a table an object becomes a struct column
            let child_placement = match placement {
                Placement::Column => Placement::Column,
                Placement::Root | Placement::Object => Placement::Object,
            };
            SchemaNode::Object(compile_fields(description, location, tag, child_placement)?)
        }
        TypeTag::Table => {
            SchemaNode::Table(compile_fields(description, location, tag, Placement::Column)?)
        }
        TypeTag::ListOfTable => SchemaNode::ListOfTable(compile_fields(
            description,
            location,
            tag,
            Placement::Column,
        )?),
    })
}

fn compile_fields(
    description: &FieldDescription,
    location: &str,
    tag: TypeTag,
    placement: Placement,
) -> Result<Fields> {
    let children = description.fields.as_ref().ok_or_else(|| {
        JsonFrameError::schema(format!(
            "Field '{}' of type '{}' must define its fields",
            location,
            tag.as_str()
        ))
    })?;

    if children.is_empty() && tag != TypeTag::Object {
        return Err(JsonFrameError::schema(format!(
            "Cannot create a {} with zero fields. Field: '{}'",
            tag.as_str(),
            location
        )));
    }

    let mut fields = Fields::with_capacity(children.len());
    for child in children {
        let name = match child.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(JsonFrameError::schema(format!(
                    "Every field of '{}' needs a name",
                    location
                )))
            }
        };
        let child_location = if location == "<root>" {
            name.to_string()
        } else {
            format!("{}.{}", location, name)
        };

        if fields.contains_key(name) {
            return Err(JsonFrameError::schema(format!(
                "Duplicate field '{}'",
                child_location
            )));
        }

        let node = compile_node(child, &child_location, placement)?;
        let default = in_field(compile_default(&node, child.default.as_ref(), placement), || {
            format!("Malformed default for field '{}'", child_location)
        })?;
        fields.insert(Arc::from(name), Field::new(node, default));
    }

    Ok(fields)
}

/// Report any failure while compiling one field as a schema error
fn in_field<T>(result: Result<T>, location: impl FnOnce() -> String) -> Result<T> {
    result.map_err(|err| JsonFrameError::schema(format!("{}: {}", location(), err)))
}

/// Pre-convert a declared default by decoding it against the field's own node
fn compile_default(
    node: &SchemaNode,
    default: Option<&serde_json::Value>,
    placement: Placement,
) -> Result<Decoded> {
    let options = DecodeOptions {
        integer_overflow: IntegerOverflow::Error,
    };
    let mut path = JsonPath::new();
    let default = default.filter(|d| !d.is_null());

    match (placement, node) {
        // struct columns take their defaults from their sub-fields
        (Placement::Column, SchemaNode::Object(_) | SchemaNode::Table(_)) => match default {
            None => Ok(Decoded::Record(None)),
            Some(_) => Err(JsonFrameError::schema(
                "a struct column cannot declare its own default; set defaults on its fields",
            )),
        },
        // each row of a list-of-tables column holds one table
        (Placement::Column, SchemaNode::ListOfTable(fields)) => match default {
            None => Ok(Decoded::Table(None)),
            Some(value) => Ok(Decoded::Table(decode_table(
                fields, value, &mut path, &options,
            )?)),
        },
        (_, node) => match default {
            None => Ok(node.null_value()),
            Some(value) => decode_node(node, value, &mut path, &options),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Vector;
    use serde_json::json;

    fn description(value: serde_json::Value) -> FieldDescription {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_type_tags() {
        assert_eq!("dbl".parse::<TypeTag>().unwrap(), TypeTag::Dbl);
        assert_eq!("lgl_vec".parse::<TypeTag>().unwrap(), TypeTag::BoolVec);
        assert_eq!("df".parse::<TypeTag>().unwrap(), TypeTag::Table);
        assert!("float".parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_compile_defaults() {
        let node = compile(&description(json!({
            "type": "object",
            "fields": [
                {"name": "flag", "type": "bool", "default": false},
                {"path": "count", "type": "int", "default": -1},
                {"name": "tags", "type": "str_vec", "default": ["x", null]},
                {"name": "ratio", "type": "dbl"}
            ]
        })))
        .unwrap();

        let fields = node.fields().unwrap();
        assert_eq!(fields["flag"].default(), &Decoded::from(false));
        assert_eq!(fields["count"].default(), &Decoded::from(-1));
        assert_eq!(
            fields["tags"].default(),
            &Decoded::from(Vector::String(vec![Some(Arc::from("x")), None]))
        );
        assert_eq!(fields["ratio"].default(), &Decoded::Double(None));
    }

    #[test]
    fn test_unknown_type_tag() {
        let err = compile(&description(json!({
            "type": "object",
            "fields": [{"name": "a", "type": "float"}]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Unknown type tag 'float'"));
        assert!(err.to_string().contains("Field 'a'"));
    }

    #[test]
    fn test_duplicate_field() {
        let err = compile(&description(json!({
            "type": "table",
            "fields": [
                {"name": "a", "type": "int"},
                {"name": "a", "type": "str"}
            ]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate field 'a'"));
    }

    #[test]
    fn test_malformed_default() {
        let err = compile(&description(json!({
            "type": "object",
            "fields": [{"name": "n", "type": "int", "default": "one"}]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Malformed default for field 'n'"));
        assert_eq!(err.kind(), crate::ErrorKind::Schema);
        assert_eq!(err.path(), None);

        let err = compile(&description(json!({
            "type": "object",
            "fields": [{"name": "n", "type": "int", "default": 3000000000u64}]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Malformed default"));
    }

    #[test]
    fn test_struct_column_default_rejected() {
        let err = compile(&description(json!({
            "type": "table",
            "fields": [{
                "name": "inner",
                "type": "object",
                "default": {"x": 1},
                "fields": [{"name": "x", "type": "int"}]
            }]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("struct column"));
    }

    #[test]
    fn test_aggregate_needs_fields() {
        let err = compile(&description(json!({"type": "table"}))).unwrap_err();
        assert!(err.to_string().contains("must define its fields"));

        let err = compile(&description(json!({"type": "table", "fields": []}))).unwrap_err();
        assert!(err.to_string().contains("zero fields"));

        let err = compile(&description(json!({
            "type": "object",
            "fields": [{"name": "a", "type": "int", "fields": []}]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("cannot have nested fields"));
    }

    #[test]
    fn test_nested_location_in_errors() {
        let err = compile(&description(json!({
            "type": "object",
            "fields": [{
                "name": "outer",
                "type": "object",
                "fields": [{"name": "inner", "type": "nope"}]
            }]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("outer.inner"));
    }

    #[test]
    fn test_list_of_table_column_default() {
        let node = compile(&description(json!({
            "type": "table",
            "fields": [{
                "name": "items",
                "type": "list_of_table",
                "default": [{"id": 1}],
                "fields": [{"name": "id", "type": "int"}]
            }]
        })))
        .unwrap();

        let default = node.fields().unwrap()["items"].default();
        let table = default.as_table().unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.column("id").unwrap().get(0), Some(Decoded::from(1)));
    }
}
