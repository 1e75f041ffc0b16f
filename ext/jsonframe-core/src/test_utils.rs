//! Test utilities for jsonframe-core

#[cfg(test)]
pub mod test {
    use crate::compiler::{FieldDescription, TypeTag};
    use crate::{Fields, Schema, SchemaBuilder};
    use serde_json::{json, Value};

    /// Object with an `int` field without default and a `lgl` field defaulting to `false`
    pub fn scalar_object_schema() -> Schema {
        SchemaBuilder::new()
            .with_root(FieldDescription::root(TypeTag::Object).with_fields(vec![
                FieldDescription::new("int", TypeTag::Int),
                FieldDescription::new("lgl", TypeTag::Bool).with_default(json!(false)),
            ]))
            .build()
            .unwrap()
    }

    /// Table of the four scalar kinds, each with a non-null default
    pub fn scalar_table_schema() -> Schema {
        Schema::from_description(&description(json!({
            "type": "table",
            "fields": [
                {"name": "lgl", "type": "bool", "default": false},
                {"name": "int", "type": "int", "default": -1},
                {"name": "dbl", "type": "dbl", "default": -1.5},
                {"name": "str", "type": "str", "default": "xyz"}
            ]
        })))
        .unwrap()
    }

    /// Table of the four vector kinds, each with a non-null default
    pub fn vector_table_schema() -> Schema {
        Schema::from_description(&description(json!({
            "type": "table",
            "fields": [
                {"name": "lgl_vec", "type": "bool_vec", "default": [false, false]},
                {"name": "int_vec", "type": "int_vec", "default": [-1, -2]},
                {"name": "dbl_vec", "type": "dbl_vec", "default": [-1.5, -2.5]},
                {"name": "str_vec", "type": "str_vec", "default": ["x", "y", "z"]}
            ]
        })))
        .unwrap()
    }

    /// Fields compiled as children of an object
    pub fn compile_fields(fields: Value) -> Fields {
        compile_with_root("object", fields)
    }

    /// Fields compiled as columns of a table
    pub fn compile_table_fields(fields: Value) -> Fields {
        compile_with_root("table", fields)
    }

    fn compile_with_root(root: &str, fields: Value) -> Fields {
        let schema =
            Schema::from_description(&description(json!({"type": root, "fields": fields})))
                .unwrap();
        schema.root().fields().cloned().unwrap()
    }

    fn description(value: Value) -> FieldDescription {
        serde_json::from_value(value).unwrap()
    }
}
