//! Conversion of decoded tables into Arrow arrays
//!
//! The compiled schema drives the conversion, so the Arrow types are fixed by the schema rather
//! than inferred from the data. Null sentinels become Arrow nulls, including `null` rows of
//! struct columns, whose sub-columns also hold nulls there.

use arrow_array::{
    new_empty_array, Array, ArrayRef, BooleanArray, Float64Array, Int32Array, ListArray,
    RecordBatch, RecordBatchOptions, StringArray, StructArray,
};
use arrow_buffer::{BooleanBufferBuilder, NullBuffer, OffsetBuffer};
use arrow_schema::{
    DataType, Field as ArrowField, FieldRef, Fields as ArrowFields, Schema as ArrowSchema,
};
use std::sync::Arc;

use crate::schema::{Fields, ScalarKind, SchemaNode};
use crate::value::{Column, Table, Vector};
use crate::{JsonFrameError, Result};

/// Arrow type of a column decoded from `node`
pub fn arrow_data_type(node: &SchemaNode) -> DataType {
    match node {
        SchemaNode::Scalar(kind) => scalar_data_type(*kind),
        SchemaNode::Vector(kind) => DataType::List(list_item(scalar_data_type(*kind))),
        SchemaNode::Object(fields) | SchemaNode::Table(fields) => {
            DataType::Struct(arrow_fields(fields))
        }
        SchemaNode::ListOfTable(fields) => {
            DataType::List(list_item(DataType::Struct(arrow_fields(fields))))
        }
    }
}

fn scalar_data_type(kind: ScalarKind) -> DataType {
    match kind {
        ScalarKind::Bool => DataType::Boolean,
        ScalarKind::Int => DataType::Int32,
        ScalarKind::Double => DataType::Float64,
        ScalarKind::String => DataType::Utf8,
    }
}

fn list_item(data_type: DataType) -> FieldRef {
    Arc::new(ArrowField::new("item", data_type, true))
}

/// Arrow fields for a table's columns, in schema order. Every field is nullable.
pub fn arrow_fields(fields: &Fields) -> ArrowFields {
    fields
        .iter()
        .map(|(name, field)| ArrowField::new(name.as_ref(), arrow_data_type(field.node()), true))
        .collect()
}

pub fn arrow_schema_for(fields: &Fields) -> ArrowSchema {
    ArrowSchema::new(arrow_fields(fields))
}

/// Convert a decoded table into a record batch with the schema from [`arrow_schema_for`]
pub fn table_to_record_batch(table: &Table, fields: &Fields) -> Result<RecordBatch> {
    let schema = Arc::new(arrow_schema_for(fields));
    let arrays = table_arrays(table, fields)?;
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

/// Convert a decoded table into a struct array, one child per column
pub fn table_to_struct_array(table: &Table, fields: &Fields) -> Result<StructArray> {
    build_struct(table, fields, None)
}

fn build_struct(
    table: &Table,
    fields: &Fields,
    nulls: Option<NullBuffer>,
) -> Result<StructArray> {
    if fields.is_empty() {
        return Ok(StructArray::new_empty_fields(table.num_rows(), nulls));
    }
    let arrays = table_arrays(table, fields)?;
    Ok(StructArray::try_new(arrow_fields(fields), arrays, nulls)?)
}

fn struct_nulls(validity: &[bool]) -> Option<NullBuffer> {
    validity
        .iter()
        .any(|valid| !valid)
        .then(|| NullBuffer::from(validity.to_vec()))
}

fn table_arrays(table: &Table, fields: &Fields) -> Result<Vec<ArrayRef>> {
    fields
        .iter()
        .map(|(name, field)| {
            let column = table.column(name).ok_or_else(|| {
                JsonFrameError::conversion(format!("Table has no column '{}'", name))
            })?;
            column_to_arrow_array(column, field.node())
        })
        .collect()
}

/// Convert one finished column into an Arrow array of type [`arrow_data_type`]
pub fn column_to_arrow_array(column: &Column, node: &SchemaNode) -> Result<ArrayRef> {
    match (column, node) {
        (Column::Bool(values), SchemaNode::Scalar(ScalarKind::Bool)) => {
            Ok(Arc::new(BooleanArray::from_iter(values.iter())))
        }
        (Column::Int(values), SchemaNode::Scalar(ScalarKind::Int)) => {
            Ok(Arc::new(Int32Array::from_iter(values.iter())))
        }
        (Column::Double(values), SchemaNode::Scalar(ScalarKind::Double)) => Ok(Arc::new(
            Float64Array::from_iter(values.iter().map(|v| v.map(|f| f.into_inner()))),
        )),
        (Column::String(values), SchemaNode::Scalar(ScalarKind::String)) => Ok(Arc::new(
            StringArray::from_iter(values.iter().map(|v| v.as_deref())),
        )),
        (Column::Vector(values), SchemaNode::Vector(kind)) => build_vector_list(values, *kind),
        (
            Column::Struct { table, validity },
            SchemaNode::Object(fields) | SchemaNode::Table(fields),
        ) => Ok(Arc::new(build_struct(table, fields, struct_nulls(validity))?)),
        (Column::Tables(values), SchemaNode::ListOfTable(fields)) => {
            build_table_list(values, fields)
        }
        _ => Err(JsonFrameError::conversion(format!(
            "Expected a {} column, got {:?}",
            node.type_name(),
            column_kind(column)
        ))),
    }
}

fn column_kind(column: &Column) -> &'static str {
    match column {
        Column::Bool(_) => "Bool",
        Column::Int(_) => "Int",
        Column::Double(_) => "Double",
        Column::String(_) => "String",
        Column::Vector(_) => "Vector",
        Column::Struct { .. } => "Struct",
        Column::Tables(_) => "Tables",
    }
}

/// Convert one vector into a flat Arrow array
pub fn vector_to_arrow_array(vector: &Vector) -> ArrayRef {
    match vector {
        Vector::Bool(values) => Arc::new(BooleanArray::from_iter(values.iter())),
        Vector::Int(values) => Arc::new(Int32Array::from_iter(values.iter())),
        Vector::Double(values) => Arc::new(Float64Array::from_iter(
            values.iter().map(|v| v.map(|f| f.into_inner())),
        )),
        Vector::String(values) => {
            Arc::new(StringArray::from_iter(values.iter().map(|v| v.as_deref())))
        }
    }
}

fn offset(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        JsonFrameError::conversion(format!("List child of {} entries exceeds i32 offsets", len))
    })
}

/// Build list array
fn build_vector_list(values: &[Option<Vector>], kind: ScalarKind) -> Result<ArrayRef> {
    let mut items = Vector::with_capacity(kind, 0);
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut validity = BooleanBufferBuilder::new(values.len());
    offsets.push(0i32);

    for value in values {
        match value {
            Some(vector) => {
                extend_vector(&mut items, vector)?;
                validity.append(true);
            }
            None => validity.append(false),
        }
        offsets.push(offset(items.len())?);
    }

    let list = ListArray::try_new(
        list_item(scalar_data_type(kind)),
        OffsetBuffer::new(offsets.into()),
        vector_to_arrow_array(&items),
        Some(NullBuffer::new(validity.finish())),
    )?;
    Ok(Arc::new(list))
}

fn extend_vector(target: &mut Vector, source: &Vector) -> Result<()> {
    match (target, source) {
        (Vector::Bool(t), Vector::Bool(s)) => t.extend_from_slice(s),
        (Vector::Int(t), Vector::Int(s)) => t.extend_from_slice(s),
        (Vector::Double(t), Vector::Double(s)) => t.extend_from_slice(s),
        (Vector::String(t), Vector::String(s)) => t.extend_from_slice(s),
        (target, source) => {
            return Err(JsonFrameError::conversion(format!(
                "Expected a {:?} vector, got {:?}",
                target.kind(),
                source.kind()
            )))
        }
    }
    Ok(())
}

/// One list entry per row; the child is every row's table stacked as struct rows
fn build_table_list(values: &[Option<Table>], fields: &Fields) -> Result<ArrayRef> {
    let struct_type = DataType::Struct(arrow_fields(fields));
    let mut children: Vec<ArrayRef> = Vec::with_capacity(values.len());
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut validity = BooleanBufferBuilder::new(values.len());
    let mut total = 0usize;
    offsets.push(0i32);

    for value in values {
        match value {
            Some(table) => {
                total += table.num_rows();
                children.push(Arc::new(table_to_struct_array(table, fields)?));
                validity.append(true);
            }
            None => validity.append(false),
        }
        offsets.push(offset(total)?);
    }

    let child = if children.is_empty() {
        new_empty_array(&struct_type)
    } else {
        let refs: Vec<&dyn Array> = children.iter().map(|a| a.as_ref()).collect();
        arrow::compute::concat(&refs)?
    };

    let list = ListArray::try_new(
        list_item(struct_type),
        OffsetBuffer::new(offsets.into()),
        child,
        Some(NullBuffer::new(validity.finish())),
    )?;
    Ok(Arc::new(list))
}
