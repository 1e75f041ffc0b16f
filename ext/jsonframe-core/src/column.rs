//! Column accumulators used while decoding tables
//!
//! A [`ColumnSet`] owns one [`ColumnBuilder`] per schema field and appends exactly one entry to
//! each of them per row: the decoded value when the row mentions the field, its default
//! otherwise. Struct columns nest another `ColumnSet`, so the invariant holds at every depth, and
//! record which of their rows were `null` as opposed to present with null fields.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

use crate::codec::{
    decode_bool, decode_double, decode_int, decode_string, decode_vector, type_mismatch,
};
use crate::decoder::DecodeOptions;
use crate::json::JsonNode;
use crate::object::malformed_key;
use crate::path::{JsonPath, PathSegment};
use crate::schema::{Field, Fields, ScalarKind, SchemaNode};
use crate::table::decode_table;
use crate::value::{Column, Decoded, Table, Vector};
use crate::{JsonFrameError, Result};

/// Accumulator for one column; borrows its default from the compiled schema
pub(crate) enum ColumnBuilder<'s> {
    Bool {
        values: Vec<Option<bool>>,
        default: Option<bool>,
    },
    Int {
        values: Vec<Option<i32>>,
        default: Option<i32>,
    },
    Double {
        values: Vec<Option<OrderedFloat<f64>>>,
        default: Option<OrderedFloat<f64>>,
    },
    String {
        values: Vec<Option<Arc<str>>>,
        default: &'s Option<Arc<str>>,
    },
    Vector {
        kind: ScalarKind,
        values: Vec<Option<Vector>>,
        default: &'s Option<Vector>,
    },
    Struct(ColumnSet<'s>),
    Tables {
        fields: &'s Fields,
        values: Vec<Option<Table>>,
        default: &'s Option<Table>,
    },
}

impl<'s> ColumnBuilder<'s> {
    pub fn new(field: &'s Field, capacity: usize) -> Result<Self> {
        Ok(match (field.node(), field.default()) {
            (SchemaNode::Scalar(ScalarKind::Bool), Decoded::Bool(default)) => ColumnBuilder::Bool {
                values: Vec::with_capacity(capacity),
                default: *default,
            },
            (SchemaNode::Scalar(ScalarKind::Int), Decoded::Int(default)) => ColumnBuilder::Int {
                values: Vec::with_capacity(capacity),
                default: *default,
            },
            (SchemaNode::Scalar(ScalarKind::Double), Decoded::Double(default)) => {
                ColumnBuilder::Double {
                    values: Vec::with_capacity(capacity),
                    default: *default,
                }
            }
            (SchemaNode::Scalar(ScalarKind::String), Decoded::String(default)) => {
                ColumnBuilder::String {
                    values: Vec::with_capacity(capacity),
                    default,
                }
            }
            (SchemaNode::Vector(kind), Decoded::Vector(default)) => ColumnBuilder::Vector {
                kind: *kind,
                values: Vec::with_capacity(capacity),
                default,
            },
            (SchemaNode::Object(fields) | SchemaNode::Table(fields), _) => {
                ColumnBuilder::Struct(ColumnSet::new(fields, capacity)?)
            }
            (SchemaNode::ListOfTable(fields), Decoded::Table(default)) => ColumnBuilder::Tables {
                fields,
                values: Vec::with_capacity(capacity),
                default,
            },
            (node, default) => {
                return Err(JsonFrameError::internal(format!(
                    "A {} default cannot fill a {} column",
                    default.type_name(),
                    node.type_name()
                )))
            }
        })
    }

    /// Decode one cell
    pub fn append<N: JsonNode>(
        &mut self,
        value: &N,
        path: &mut JsonPath,
        options: &DecodeOptions,
    ) -> Result<()> {
        match self {
            ColumnBuilder::Bool { values, .. } => values.push(decode_bool(value, path)?),
            ColumnBuilder::Int { values, .. } => {
                values.push(decode_int(value, path, options.integer_overflow)?)
            }
            ColumnBuilder::Double { values, .. } => values.push(decode_double(value, path)?),
            ColumnBuilder::String { values, .. } => values.push(decode_string(value, path)?),
            ColumnBuilder::Vector { kind, values, .. } => {
                values.push(decode_vector(value, *kind, path, options)?)
            }
            ColumnBuilder::Struct(set) if value.is_null() => set.append_null_row(),
            ColumnBuilder::Struct(set) => set.append_row(value, path, options)?,
            ColumnBuilder::Tables { fields, values, .. } => {
                values.push(decode_table(fields, value, path, options)?)
            }
        }
        Ok(())
    }

    /// Fill a row that does not mention this column
    pub fn append_default(&mut self) {
        match self {
            ColumnBuilder::Bool { values, default } => values.push(*default),
            ColumnBuilder::Int { values, default } => values.push(*default),
            ColumnBuilder::Double { values, default } => values.push(*default),
            ColumnBuilder::String { values, default } => values.push((*default).clone()),
            ColumnBuilder::Vector {
                values, default, ..
            } => values.push((*default).clone()),
            ColumnBuilder::Struct(set) => set.append_default_row(),
            ColumnBuilder::Tables {
                values, default, ..
            } => values.push((*default).clone()),
        }
    }

    pub fn append_null(&mut self) {
        match self {
            ColumnBuilder::Bool { values, .. } => values.push(None),
            ColumnBuilder::Int { values, .. } => values.push(None),
            ColumnBuilder::Double { values, .. } => values.push(None),
            ColumnBuilder::String { values, .. } => values.push(None),
            ColumnBuilder::Vector { values, .. } => values.push(None),
            ColumnBuilder::Struct(set) => set.append_null_row(),
            ColumnBuilder::Tables { values, .. } => values.push(None),
        }
    }

    pub fn finish(self) -> Result<Column> {
        Ok(match self {
            ColumnBuilder::Bool { values, .. } => Column::Bool(values),
            ColumnBuilder::Int { values, .. } => Column::Int(values),
            ColumnBuilder::Double { values, .. } => Column::Double(values),
            ColumnBuilder::String { values, .. } => Column::String(values),
            ColumnBuilder::Vector { values, .. } => Column::Vector(values),
            ColumnBuilder::Struct(set) => set.finish_struct()?,
            ColumnBuilder::Tables { values, .. } => Column::Tables(values),
        })
    }
}

/// One builder per field, in schema order
pub(crate) struct ColumnSet<'s> {
    fields: &'s Fields,
    columns: Vec<ColumnBuilder<'s>>,
    touched: Vec<bool>,
    validity: Vec<bool>,
}

impl<'s> ColumnSet<'s> {
    pub fn new(fields: &'s Fields, capacity: usize) -> Result<Self> {
        let columns = fields
            .values()
            .map(|field| ColumnBuilder::new(field, capacity))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fields,
            columns,
            touched: vec![false; fields.len()],
            validity: Vec::with_capacity(capacity),
        })
    }

    /// Route the keys of one JSON object into their columns and default the rest
    pub fn append_row<N: JsonNode>(
        &mut self,
        value: &N,
        path: &mut JsonPath,
        options: &DecodeOptions,
    ) -> Result<()> {
        let Some(entries) = value.entries() else {
            return Err(type_mismatch(value, "object", path));
        };

        self.touched.fill(false);
        {
            let mut scope = path.enter(PathSegment::PLACEHOLDER);
            for (key, child) in entries {
                let key = key.ok_or_else(|| malformed_key(&scope))?;
                let Some((index, name, _)) = self.fields.get_full(key) else {
                    continue;
                };
                if self.touched[index] {
                    continue;
                }
                scope.replace_last(PathSegment::Key(name.clone()));
                self.columns[index].append(child, &mut scope, options)?;
                self.touched[index] = true;
            }
        }

        for (column, touched) in self.columns.iter_mut().zip(&self.touched) {
            if !touched {
                column.append_default();
            }
        }
        self.validity.push(true);
        Ok(())
    }

    pub fn append_default_row(&mut self) {
        self.columns
            .iter_mut()
            .for_each(ColumnBuilder::append_default);
        self.validity.push(true);
    }

    /// Fill a row that is itself `null`; sub-columns get null sentinels
    pub fn append_null_row(&mut self) {
        self.columns.iter_mut().for_each(ColumnBuilder::append_null);
        self.validity.push(false);
    }

    pub fn finish(self) -> Result<Table> {
        self.finish_parts().map(|(table, _)| table)
    }

    /// Finish as a struct column, keeping which rows were `null`
    pub fn finish_struct(self) -> Result<Column> {
        let (table, validity) = self.finish_parts()?;
        Ok(Column::Struct { table, validity })
    }

    fn finish_parts(self) -> Result<(Table, Vec<bool>)> {
        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (name, builder) in self.fields.keys().zip(self.columns) {
            columns.insert(name.clone(), builder.finish()?);
        }
        let table = Table::new(columns, self.validity.len())?;
        Ok((table, self.validity))
    }
}
