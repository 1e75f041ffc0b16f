//! Scalar and homogeneous-vector codecs
//!
//! Each scalar decoder maps JSON `null` to `None`, the matching JSON type to `Some(value)` and
//! everything else to [`JsonFrameError::TypeMismatch`]. There is no coercion between kinds.

use ordered_float::OrderedFloat;
use std::sync::Arc;

use crate::decoder::{DecodeOptions, IntegerOverflow};
use crate::json::{JsonNode, JsonNumber, JsonType};
use crate::path::{JsonPath, PathSegment};
use crate::schema::ScalarKind;
use crate::value::{Decoded, Vector};
use crate::{JsonFrameError, Result};

pub(crate) fn type_mismatch<N: JsonNode>(
    value: &N,
    expected: &'static str,
    path: &JsonPath,
) -> JsonFrameError {
    JsonFrameError::TypeMismatch {
        expected,
        found: value.json_type().name(),
        path: path.render(),
    }
}

pub fn decode_bool<N: JsonNode>(value: &N, path: &JsonPath) -> Result<Option<bool>> {
    match value.json_type() {
        JsonType::Null => Ok(None),
        JsonType::Boolean => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| type_mismatch(value, "bool", path)),
        _ => Err(type_mismatch(value, "bool", path)),
    }
}

/// Decode a 32-bit integer. Out-of-range values wrap unless `overflow` is
/// [`IntegerOverflow::Error`]; numbers with a fractional part are rejected.
pub fn decode_int<N: JsonNode>(
    value: &N,
    path: &JsonPath,
    overflow: IntegerOverflow,
) -> Result<Option<i32>> {
    let number = match value.json_type() {
        JsonType::Null => return Ok(None),
        JsonType::Number => value.as_number(),
        _ => None,
    };

    let narrowed = match number {
        Some(JsonNumber::Int(i)) => i32::try_from(i).map_err(|_| (i as i32, i.to_string())),
        Some(JsonNumber::UInt(u)) => i32::try_from(u).map_err(|_| (u as i32, u.to_string())),
        Some(JsonNumber::Float(_)) | None => return Err(type_mismatch(value, "int", path)),
    };

    match (narrowed, overflow) {
        (Ok(i), _) => Ok(Some(i)),
        (Err((wrapped, _)), IntegerOverflow::Wrap) => Ok(Some(wrapped)),
        (Err((_, original)), IntegerOverflow::Error) => Err(JsonFrameError::IntegerOverflow {
            value: original,
            path: path.render(),
        }),
    }
}

pub fn decode_double<N: JsonNode>(
    value: &N,
    path: &JsonPath,
) -> Result<Option<OrderedFloat<f64>>> {
    match value.json_type() {
        JsonType::Null => Ok(None),
        JsonType::Number => value
            .as_number()
            .map(|n| Some(OrderedFloat(n.as_f64())))
            .ok_or_else(|| type_mismatch(value, "double", path)),
        _ => Err(type_mismatch(value, "double", path)),
    }
}

pub fn decode_string<N: JsonNode>(value: &N, path: &JsonPath) -> Result<Option<Arc<str>>> {
    match value.json_type() {
        JsonType::Null => Ok(None),
        JsonType::String => value
            .as_str()
            .map(|s| Some(Arc::from(s)))
            .ok_or_else(|| type_mismatch(value, "string", path)),
        _ => Err(type_mismatch(value, "string", path)),
    }
}

pub fn decode_scalar<N: JsonNode>(
    value: &N,
    kind: ScalarKind,
    path: &JsonPath,
    options: &DecodeOptions,
) -> Result<Decoded> {
    Ok(match kind {
        ScalarKind::Bool => Decoded::Bool(decode_bool(value, path)?),
        ScalarKind::Int => Decoded::Int(decode_int(value, path, options.integer_overflow)?),
        ScalarKind::Double => Decoded::Double(decode_double(value, path)?),
        ScalarKind::String => Decoded::String(decode_string(value, path)?),
    })
}

/// Decode a JSON array of one scalar kind. A JSON `null` in place of the array yields `None`.
pub fn decode_vector<N: JsonNode>(
    value: &N,
    kind: ScalarKind,
    path: &mut JsonPath,
    options: &DecodeOptions,
) -> Result<Option<Vector>> {
    if value.is_null() {
        return Ok(None);
    }

    let vector = match kind {
        ScalarKind::Bool => Vector::Bool(decode_elements(value, path, decode_bool)?),
        ScalarKind::Int => Vector::Int(decode_elements(value, path, |v, p| {
            decode_int(v, p, options.integer_overflow)
        })?),
        ScalarKind::Double => Vector::Double(decode_elements(value, path, decode_double)?),
        ScalarKind::String => Vector::String(decode_elements(value, path, decode_string)?),
    };
    Ok(Some(vector))
}

fn decode_elements<N, T, F>(value: &N, path: &mut JsonPath, mut decode: F) -> Result<Vec<T>>
where
    N: JsonNode,
    F: FnMut(&N, &JsonPath) -> Result<T>,
{
    let Some(elements) = value.elements() else {
        return Err(type_mismatch(value, "array", path));
    };

    let mut out = Vec::with_capacity(value.array_len().unwrap_or(0));
    let mut scope = path.enter(PathSegment::PLACEHOLDER);
    for (index, element) in elements.enumerate() {
        scope.replace_last(PathSegment::Index(index));
        out.push(decode(element, &scope)?);
    }
    Ok(out)
}
