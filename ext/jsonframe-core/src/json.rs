//! Read-only view over a parsed JSON document
//!
//! The decoders never touch a concrete JSON library. They go through [`JsonNode`], which only
//! needs type inspection, scalar accessors and in-order iteration of arrays and objects.
//! `serde_json::Value` implements it out of the box.

use serde_json::Value;

/// Runtime type of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

/// A JSON number as read from the input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonNumber {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl JsonNumber {
    pub fn as_f64(&self) -> f64 {
        match *self {
            JsonNumber::Int(i) => i as f64,
            JsonNumber::UInt(u) => u as f64,
            JsonNumber::Float(f) => f,
        }
    }
}

/// Capability the decoders need from a JSON front-end
pub trait JsonNode: Sized {
    type Elements<'a>: Iterator<Item = &'a Self>
    where
        Self: 'a;

    /// Yields `(key, value)` pairs in document order. A key that cannot be read as text is
    /// reported as `None`.
    type Entries<'a>: Iterator<Item = (Option<&'a str>, &'a Self)>
    where
        Self: 'a;

    fn json_type(&self) -> JsonType;

    fn as_bool(&self) -> Option<bool>;

    fn as_number(&self) -> Option<JsonNumber>;

    fn as_str(&self) -> Option<&str>;

    /// Elements of an array, or `None` if this is not an array
    fn elements(&self) -> Option<Self::Elements<'_>>;

    /// Number of elements of an array, used to pre-size outputs
    fn array_len(&self) -> Option<usize>;

    /// Entries of an object, or `None` if this is not an object
    fn entries(&self) -> Option<Self::Entries<'_>>;

    fn is_null(&self) -> bool {
        self.json_type() == JsonType::Null
    }
}

type EntryFn<'a> = fn((&'a String, &'a Value)) -> (Option<&'a str>, &'a Value);

fn entry<'a>((key, value): (&'a String, &'a Value)) -> (Option<&'a str>, &'a Value) {
    (Some(key.as_str()), value)
}

impl JsonNode for Value {
    type Elements<'a> = std::slice::Iter<'a, Value>;
    type Entries<'a> = std::iter::Map<serde_json::map::Iter<'a>, EntryFn<'a>>;

    fn json_type(&self) -> JsonType {
        match self {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn as_number(&self) -> Option<JsonNumber> {
        let Value::Number(n) = self else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            Some(JsonNumber::Int(i))
        } else if let Some(u) = n.as_u64() {
            Some(JsonNumber::UInt(u))
        } else {
            n.as_f64().map(JsonNumber::Float)
        }
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn elements(&self) -> Option<Self::Elements<'_>> {
        self.as_array().map(|array| array.iter())
    }

    fn array_len(&self) -> Option<usize> {
        self.as_array().map(Vec::len)
    }

    fn entries(&self) -> Option<Self::Entries<'_>> {
        self.as_object()
            .map(|object| object.iter().map(entry as EntryFn<'_>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_types() {
        assert_eq!(json!(null).json_type(), JsonType::Null);
        assert_eq!(json!(true).json_type().name(), "boolean");
        assert_eq!(json!(1.5).json_type().name(), "number");
        assert_eq!(json!("x").json_type().name(), "string");
        assert_eq!(json!([1]).json_type().name(), "array");
        assert_eq!(json!({"a": 1}).json_type().name(), "object");
    }

    #[test]
    fn test_numbers() {
        // Value has an inherent `as_number` with a different return type
        let number = |value: Value| JsonNode::as_number(&value);
        assert_eq!(number(json!(-3)), Some(JsonNumber::Int(-3)));
        assert_eq!(number(json!(u64::MAX)), Some(JsonNumber::UInt(u64::MAX)));
        assert_eq!(number(json!(2.5)), Some(JsonNumber::Float(2.5)));
        assert_eq!(number(json!("2")), None);
    }

    #[test]
    fn test_entries_keep_document_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<_> = value
            .entries()
            .unwrap()
            .map(|(key, _)| key.unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_array_access() {
        let value = json!([1, 2, 3]);
        assert_eq!(value.array_len(), Some(3));
        assert_eq!(value.elements().unwrap().count(), 3);
        assert!(json!({}).elements().is_none());
        assert!(json!([]).entries().is_none());
    }
}
