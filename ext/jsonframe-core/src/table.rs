//! Table decoding: a JSON array of objects becomes one column per schema field
//!
//! Each array element is one row, including empty objects. A `list_of_table` value is an array
//! of such tables, each decoded on its own.

use tracing::trace;

use crate::codec::type_mismatch;
use crate::column::ColumnSet;
use crate::decoder::DecodeOptions;
use crate::json::JsonNode;
use crate::path::{JsonPath, PathSegment};
use crate::schema::Fields;
use crate::value::Table;
use crate::Result;

/// Decode a JSON array of objects into a column-oriented [`Table`]
///
/// The table has one row per array element, including elements that are empty objects.
/// JSON `null` in place of the array yields `None`.
pub fn decode_table<N: JsonNode>(
    fields: &Fields,
    value: &N,
    path: &mut JsonPath,
    options: &DecodeOptions,
) -> Result<Option<Table>> {
    if value.is_null() {
        return Ok(None);
    }
    let Some(rows) = value.elements() else {
        return Err(type_mismatch(value, "array", path));
    };

    let mut columns = ColumnSet::new(fields, value.array_len().unwrap_or(0))?;
    {
        let mut scope = path.enter(PathSegment::PLACEHOLDER);
        for (index, row) in rows.enumerate() {
            scope.replace_last(PathSegment::Index(index));
            columns.append_row(row, &mut scope, options)?;
        }
    }

    let table = columns.finish()?;
    trace!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "finalized table"
    );
    Ok(Some(table))
}

/// Decode a JSON array whose elements are each decoded with [`decode_table`]
pub fn decode_table_list<N: JsonNode>(
    fields: &Fields,
    value: &N,
    path: &mut JsonPath,
    options: &DecodeOptions,
) -> Result<Option<Vec<Option<Table>>>> {
    if value.is_null() {
        return Ok(None);
    }
    let Some(elements) = value.elements() else {
        return Err(type_mismatch(value, "array", path));
    };

    let mut tables = Vec::with_capacity(value.array_len().unwrap_or(0));
    let mut scope = path.enter(PathSegment::PLACEHOLDER);
    for (index, element) in elements.enumerate() {
        scope.replace_last(PathSegment::Index(index));
        tables.push(decode_table(fields, element, &mut scope, options)?);
    }
    Ok(Some(tables))
}
