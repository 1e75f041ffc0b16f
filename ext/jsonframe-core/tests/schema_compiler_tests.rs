use jsonframe_core::*;
use serde_json::json;

use test_helpers::*;

fn compile_error(description: serde_json::Value) -> JsonFrameError {
    let description: FieldDescription = serde_json::from_value(description).unwrap();
    let err = Schema::from_description(&description).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema, "unexpected error: {}", err);
    err
}

#[test]
fn test_from_json_text() {
    let schema = Schema::from_json(
        r#"{
            "type": "table",
            "fields": [
                {"name": "id", "type": "int", "default": 0},
                {"name": "tags", "type": "str_vec"},
                {"name": "nested", "type": "list_of_table", "fields": [
                    {"name": "x", "type": "dbl"}
                ]}
            ]
        }"#,
    )
    .unwrap();

    let root = schema.root();
    assert_eq!(root.type_name(), "table");
    let fields = root.fields().unwrap();
    assert_eq!(
        fields.keys().map(|k| k.as_ref()).collect::<Vec<_>>(),
        vec!["id", "tags", "nested"]
    );
    assert_eq!(fields["id"].node(), &SchemaNode::Scalar(ScalarKind::Int));
    assert_eq!(fields["tags"].node().type_name(), "str_vec");
    assert_eq!(fields["nested"].default(), &Decoded::Table(None));
}

#[test]
fn test_type_tag_aliases() {
    let schema = schema_from(json!({
        "type": "df",
        "fields": [
            {"name": "a", "type": "lgl"},
            {"name": "b", "type": "lgl_vec"},
            {"name": "c", "type": "list", "fields": [{"name": "d", "type": "int"}]}
        ]
    }));

    let fields = schema.root().fields().unwrap();
    assert_eq!(schema.root().type_name(), "table");
    assert_eq!(fields["a"].node().type_name(), "bool");
    assert_eq!(fields["b"].node().type_name(), "bool_vec");
    assert_eq!(fields["c"].node().type_name(), "object");
}

#[test]
fn test_builder_matches_serde_description() {
    let built = SchemaBuilder::new()
        .with_root(FieldDescription::root(TypeTag::Table).with_fields(vec![
            FieldDescription::new("id", TypeTag::Int).with_default(json!(-1)),
            FieldDescription::new("point", TypeTag::Object).with_fields(vec![
                FieldDescription::new("x", TypeTag::Dbl),
            ]),
        ]))
        .build()
        .unwrap();

    let parsed = schema_from(json!({
        "type": "table",
        "fields": [
            {"name": "id", "type": "int", "default": -1},
            {"name": "point", "type": "object", "fields": [{"name": "x", "type": "dbl"}]}
        ]
    }));

    assert_eq!(built, parsed);
}

#[test]
fn test_description_serializes() {
    let description = FieldDescription::root(TypeTag::Object)
        .with_fields(vec![FieldDescription::new("n", TypeTag::Int).with_default(json!(1))]);
    let value = serde_json::to_value(&description).unwrap();
    assert_eq!(
        value,
        json!({"type": "object", "fields": [{"name": "n", "type": "int", "default": 1}]})
    );
}

#[test]
fn test_unknown_type_tag() {
    let err = compile_error(json!({
        "type": "object",
        "fields": [{"name": "a", "type": "int64"}]
    }));
    assert!(err.to_string().contains("Unknown type tag 'int64'"));
}

#[test]
fn test_malformed_defaults() {
    for (tag, default) in [
        ("bool", json!(1)),
        ("int", json!(1.5)),
        ("int", json!("1")),
        ("dbl", json!("1.5")),
        ("str", json!(1)),
        ("int_vec", json!(1)),
        ("int_vec", json!([1, "2"])),
        ("str_vec", json!({"a": "b"})),
    ] {
        let err = compile_error(json!({
            "type": "object",
            "fields": [{"name": "f", "type": tag, "default": default}]
        }));
        assert!(
            err.to_string().contains("Malformed default for field 'f'"),
            "{} with {}: {}",
            tag,
            default,
            err
        );
    }
}

#[test]
fn test_out_of_range_default_rejected() {
    let err = compile_error(json!({
        "type": "table",
        "fields": [{"name": "n", "type": "int", "default": 2147483648i64}]
    }));
    assert!(err.to_string().contains("2147483648"));
}

#[test]
fn test_duplicate_fields() {
    let err = compile_error(json!({
        "type": "object",
        "fields": [
            {"name": "dup", "type": "int"},
            {"name": "other", "type": "int"},
            {"name": "dup", "type": "dbl"}
        ]
    }));
    assert!(err.to_string().contains("Duplicate field 'dup'"));

    // the same name on different levels is fine
    schema_from(json!({
        "type": "object",
        "fields": [
            {"name": "a", "type": "int"},
            {"name": "nested", "type": "object", "fields": [{"name": "a", "type": "int"}]}
        ]
    }));
}

#[test]
fn test_fields_on_wrong_kinds() {
    let err = compile_error(json!({"type": "list_of_table"}));
    assert!(err.to_string().contains("must define its fields"));

    let err = compile_error(json!({"type": "list_of_table", "fields": []}));
    assert!(err.to_string().contains("zero fields"));

    let err = compile_error(json!({
        "type": "object",
        "fields": [{"name": "v", "type": "dbl_vec", "fields": [{"name": "x", "type": "int"}]}]
    }));
    assert!(err.to_string().contains("cannot have nested fields"));
}

#[test]
fn test_missing_names() {
    let err = compile_error(json!({
        "type": "object",
        "fields": [{"type": "int"}]
    }));
    assert!(err.to_string().contains("needs a name"));
}

#[test]
fn test_root_default_rejected() {
    let err = compile_error(json!({"type": "int", "default": 3}));
    assert!(err.to_string().contains("root"));
}

#[test]
fn test_struct_column_default_rejected() {
    let err = compile_error(json!({
        "type": "table",
        "fields": [{
            "name": "meta",
            "type": "table",
            "default": [],
            "fields": [{"name": "k", "type": "str"}]
        }]
    }));
    assert!(err.to_string().contains("struct column"));
}

#[test]
fn test_aggregate_defaults_outside_tables() {
    let schema = schema_from(json!({
        "type": "object",
        "fields": [
            {
                "name": "point",
                "type": "object",
                "default": {"x": 1},
                "fields": [{"name": "x", "type": "int"}, {"name": "y", "type": "int", "default": 2}]
            },
            {
                "name": "rows",
                "type": "table",
                "default": [{"x": 1}, {}],
                "fields": [{"name": "x", "type": "int"}]
            }
        ]
    }));

    let record = decode_record("{}", &schema);
    let point = record["point"].as_record().unwrap();
    assert_eq!(point["x"], Decoded::from(1));
    assert_eq!(point["y"], Decoded::from(2));

    let rows = record["rows"].as_table().unwrap();
    assert_eq!(
        rows.column("x").unwrap(),
        &Column::Int(vec![Some(1), None])
    );
}

#[test]
fn test_invalid_description_json() {
    let err = Schema::from_json(r#"{"fields": []}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Json);
}
