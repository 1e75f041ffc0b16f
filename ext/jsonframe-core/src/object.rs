//! Object decoding into [`Record`]s
//!
//! Keys are visited in document order and looked up positionally in the schema's field map.
//! Unknown keys are skipped, and fields the document does not mention receive their default.
//! The resulting record always lists fields in schema order.

use crate::codec::type_mismatch;
use crate::decoder::{decode_node, DecodeOptions};
use crate::json::JsonNode;
use crate::path::{JsonPath, PathSegment};
use crate::schema::Fields;
use crate::value::{Decoded, Record};
use crate::{JsonFrameError, Result};

pub(crate) fn malformed_key(path: &JsonPath) -> JsonFrameError {
    JsonFrameError::MalformedKey {
        path: path.render_parent(),
    }
}

pub fn decode_object<N: JsonNode>(
    fields: &Fields,
    value: &N,
    path: &mut JsonPath,
    options: &DecodeOptions,
) -> Result<Option<Record>> {
    if value.is_null() {
        return Ok(None);
    }
    let Some(entries) = value.entries() else {
        return Err(type_mismatch(value, "object", path));
    };

    // doubles as the found-set
    let mut slots: Vec<Option<Decoded>> = vec![None; fields.len()];
    {
        let mut scope = path.enter(PathSegment::PLACEHOLDER);
        for (key, child) in entries {
            let key = key.ok_or_else(|| malformed_key(&scope))?;
            let Some((index, name, field)) = fields.get_full(key) else {
                continue;
            };
            // first occurrence wins for front-ends that yield repeated keys
            if slots[index].is_some() {
                continue;
            }
            scope.replace_last(PathSegment::Key(name.clone()));
            slots[index] = Some(decode_node(field.node(), child, &mut scope, options)?);
        }
    }

    let record = fields
        .iter()
        .zip(slots)
        .map(|((name, field), slot)| {
            let value = slot.unwrap_or_else(|| field.default().clone());
            (name.clone(), value)
        })
        .collect();
    Ok(Some(record))
}
