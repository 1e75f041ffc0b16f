use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

use crate::schema::ScalarKind;

/// A decoded record: field values in schema declaration order
pub type Record = IndexMap<Arc<str>, Decoded>;

/// Output of a decode call
///
/// Every variant wraps an `Option`; `None` is that type's null sentinel, produced when the
/// input holds an explicit JSON `null`. It is never used for absent fields, which receive
/// the schema default instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Bool(Option<bool>),
    Int(Option<i32>),
    Double(Option<OrderedFloat<f64>>),
    String(Option<Arc<str>>),
    Vector(Option<Vector>),
    Record(Option<Record>),
    Table(Option<Table>),
    TableList(Option<Vec<Option<Table>>>),
}

/// Homogeneous vector of one scalar kind; elements may be null
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Vector {
    Bool(Vec<Option<bool>>),
    Int(Vec<Option<i32>>),
    Double(Vec<Option<OrderedFloat<f64>>>),
    String(Vec<Option<Arc<str>>>),
}

/// One finished column of a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Bool(Vec<Option<bool>>),
    Int(Vec<Option<i32>>),
    Double(Vec<Option<OrderedFloat<f64>>>),
    String(Vec<Option<Arc<str>>>),
    /// One vector per row
    Vector(Vec<Option<Vector>>),
    /// Nested object-of-columns; each sub-column has one entry per row and `validity` is
    /// `false` where the row itself was `null`
    Struct { table: Table, validity: Vec<bool> },
    /// One nested table per row
    Tables(Vec<Option<Table>>),
}

/// Column-oriented result of decoding a JSON array of objects
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: IndexMap<Arc<str>, Column>,
    num_rows: usize,
}

impl std::hash::Hash for Decoded {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Decoded::Bool(v) => v.hash(state),
            Decoded::Int(v) => v.hash(state),
            Decoded::Double(v) => v.hash(state),
            Decoded::String(v) => v.hash(state),
            Decoded::Vector(v) => v.hash(state),
            Decoded::Record(record) => {
                record.is_some().hash(state);
                for (name, value) in record.iter().flatten() {
                    name.hash(state);
                    value.hash(state);
                }
            }
            Decoded::Table(v) => v.hash(state),
            Decoded::TableList(v) => v.hash(state),
        }
    }
}

impl Decoded {
    /// Check if the value is a null sentinel
    pub fn is_null(&self) -> bool {
        match self {
            Decoded::Bool(v) => v.is_none(),
            Decoded::Int(v) => v.is_none(),
            Decoded::Double(v) => v.is_none(),
            Decoded::String(v) => v.is_none(),
            Decoded::Vector(v) => v.is_none(),
            Decoded::Record(v) => v.is_none(),
            Decoded::Table(v) => v.is_none(),
            Decoded::TableList(v) => v.is_none(),
        }
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            Decoded::Bool(_) => "Bool",
            Decoded::Int(_) => "Int",
            Decoded::Double(_) => "Double",
            Decoded::String(_) => "String",
            Decoded::Vector(_) => "Vector",
            Decoded::Record(_) => "Record",
            Decoded::Table(_) => "Table",
            Decoded::TableList(_) => "TableList",
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Decoded::Record(Some(record)) => Some(record),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Decoded::Table(Some(table)) => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Decoded::Table(table) => table,
            _ => None,
        }
    }
}

impl From<bool> for Decoded {
    fn from(value: bool) -> Self {
        Decoded::Bool(Some(value))
    }
}

impl From<i32> for Decoded {
    fn from(value: i32) -> Self {
        Decoded::Int(Some(value))
    }
}

impl From<f64> for Decoded {
    fn from(value: f64) -> Self {
        Decoded::Double(Some(OrderedFloat(value)))
    }
}

impl From<&str> for Decoded {
    fn from(value: &str) -> Self {
        Decoded::String(Some(Arc::from(value)))
    }
}

impl From<Vector> for Decoded {
    fn from(value: Vector) -> Self {
        Decoded::Vector(Some(value))
    }
}

impl Vector {
    pub fn with_capacity(kind: ScalarKind, capacity: usize) -> Self {
        match kind {
            ScalarKind::Bool => Vector::Bool(Vec::with_capacity(capacity)),
            ScalarKind::Int => Vector::Int(Vec::with_capacity(capacity)),
            ScalarKind::Double => Vector::Double(Vec::with_capacity(capacity)),
            ScalarKind::String => Vector::String(Vec::with_capacity(capacity)),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            Vector::Bool(_) => ScalarKind::Bool,
            Vector::Int(_) => ScalarKind::Int,
            Vector::Double(_) => ScalarKind::Double,
            Vector::String(_) => ScalarKind::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Vector::Bool(v) => v.len(),
            Vector::Int(v) => v.len(),
            Vector::Double(v) => v.len(),
            Vector::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Column {
    /// Number of rows in the column
    pub fn len(&self) -> usize {
        match self {
            Column::Bool(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Double(v) => v.len(),
            Column::String(v) => v.len(),
            Column::Vector(v) => v.len(),
            Column::Struct { validity, .. } => validity.len(),
            Column::Tables(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of a single row, or `None` when `row` is out of bounds
    pub fn get(&self, row: usize) -> Option<Decoded> {
        if row >= self.len() {
            return None;
        }
        Some(match self {
            Column::Bool(v) => Decoded::Bool(v[row]),
            Column::Int(v) => Decoded::Int(v[row]),
            Column::Double(v) => Decoded::Double(v[row]),
            Column::String(v) => Decoded::String(v[row].clone()),
            Column::Vector(v) => Decoded::Vector(v[row].clone()),
            Column::Struct { validity, .. } if !validity[row] => Decoded::Record(None),
            Column::Struct { table, .. } => Decoded::Record(table.row(row)),
            Column::Tables(v) => Decoded::Table(v[row].clone()),
        })
    }
}

impl std::hash::Hash for Table {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.num_rows.hash(state);
        // IndexMap preserves insertion order, so hash is deterministic
        for (name, column) in &self.columns {
            name.hash(state);
            column.hash(state);
        }
    }
}

impl Table {
    /// Assemble a table from finished columns
    ///
    /// Every column must hold exactly `num_rows` entries.
    pub fn new(columns: IndexMap<Arc<str>, Column>, num_rows: usize) -> crate::Result<Self> {
        if let Some((name, column)) = columns.iter().find(|(_, c)| c.len() != num_rows) {
            return Err(crate::JsonFrameError::internal(format!(
                "Column '{}' has {} entries but the table has {} rows",
                name,
                column.len(),
                num_rows
            )));
        }
        Ok(Self { columns, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> &IndexMap<Arc<str>, Column> {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|name| name.as_ref())
    }

    /// Record view of one row, in column order
    pub fn row(&self, row: usize) -> Option<Record> {
        if row >= self.num_rows {
            return None;
        }
        self.columns
            .iter()
            .map(|(name, column)| column.get(row).map(|value| (name.clone(), value)))
            .collect()
    }
}
