use arrow_array::RecordBatch;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::arrow_conversion::table_to_record_batch;
use crate::codec::{decode_scalar, decode_vector};
use crate::json::JsonNode;
use crate::object::decode_object;
use crate::path::JsonPath;
use crate::schema::{Schema, SchemaNode};
use crate::table::{decode_table, decode_table_list};
use crate::value::Decoded;
use crate::{JsonFrameError, Result};

/// Environment variable consulted by [`DecodeOptions::from_env`]
pub const INTEGER_OVERFLOW_ENV: &str = "JSONFRAME_INTEGER_OVERFLOW";

/// What to do with JSON integers outside the 32-bit range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerOverflow {
    /// Keep the low 32 bits, like a C cast
    #[default]
    Wrap,
    /// Fail with [`JsonFrameError::IntegerOverflow`]
    Error,
}

impl FromStr for IntegerOverflow {
    type Err = JsonFrameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wrap" => Ok(IntegerOverflow::Wrap),
            "error" => Ok(IntegerOverflow::Error),
            other => Err(JsonFrameError::conversion(format!(
                "Invalid integer overflow policy: {}",
                other
            ))),
        }
    }
}

/// Per-decoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub integer_overflow: IntegerOverflow,
}

impl DecodeOptions {
    /// Defaults, overridden by `JSONFRAME_INTEGER_OVERFLOW` when it holds a valid policy
    pub fn from_env() -> Self {
        let integer_overflow = std::env::var(INTEGER_OVERFLOW_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        Self { integer_overflow }
    }
}

/// Builder for [`Decoder`]
#[derive(Debug, Clone, Default)]
pub struct DecoderBuilder {
    options: DecodeOptions,
}

impl DecoderBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_integer_overflow(mut self, policy: IntegerOverflow) -> Self {
        self.options.integer_overflow = policy;
        self
    }

    pub fn build(self, schema: impl Into<Arc<Schema>>) -> Decoder {
        Decoder {
            schema: schema.into(),
            options: self.options,
        }
    }
}

/// Decodes JSON documents against one compiled schema
///
/// A `Decoder` holds no per-call state and can be shared across threads; each call owns its
/// own path tracker and column builders.
#[derive(Debug, Clone)]
pub struct Decoder {
    schema: Arc<Schema>,
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        DecoderBuilder::new().build(schema)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Parse `json` and decode it
    pub fn decode_str(&self, json: &str) -> Result<Decoded> {
        decode_text(&self.schema, json, &self.options)
    }

    /// Decode an already parsed document
    pub fn decode_value<N: JsonNode>(&self, value: &N) -> Result<Decoded> {
        decode_document(&self.schema, value, &self.options)
    }

    /// Decode a table document straight into an Arrow record batch
    pub fn decode_record_batch(&self, json: &str) -> Result<RecordBatch> {
        let SchemaNode::Table(fields) = self.schema.root() else {
            return Err(JsonFrameError::conversion(format!(
                "Record batches need a table schema, found {}",
                self.schema.root().type_name()
            )));
        };

        match self.decode_str(json)? {
            Decoded::Table(Some(table)) => table_to_record_batch(&table, fields),
            Decoded::Table(None) => Err(JsonFrameError::conversion(
                "Cannot build a record batch from a null document",
            )),
            other => Err(JsonFrameError::internal(format!(
                "Table schema produced a {} value",
                other.type_name()
            ))),
        }
    }
}

/// Decode `json` against `schema` with default options
pub fn decode(json: &str, schema: &Schema) -> Result<Decoded> {
    decode_text(schema, json, &DecodeOptions::default())
}

fn decode_text(schema: &Schema, json: &str, options: &DecodeOptions) -> Result<Decoded> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    debug!(bytes = json.len(), "parsed JSON document");
    decode_document(schema, &value, options)
}

fn decode_document<N: JsonNode>(
    schema: &Schema,
    value: &N,
    options: &DecodeOptions,
) -> Result<Decoded> {
    let root = schema.root();
    debug!(root = root.type_name(), "decoding document");

    let mut path = JsonPath::new();
    let decoded = decode_node(root, value, &mut path, options)?;
    debug_assert!(path.is_empty(), "unbalanced path after decode");

    if let Decoded::Table(Some(table)) = &decoded {
        debug!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "decoded table"
        );
    }
    Ok(decoded)
}

/// Decode one value against one schema node
pub(crate) fn decode_node<N: JsonNode>(
    node: &SchemaNode,
    value: &N,
    path: &mut JsonPath,
    options: &DecodeOptions,
) -> Result<Decoded> {
    match node {
        SchemaNode::Scalar(kind) => decode_scalar(value, *kind, path, options),
        SchemaNode::Vector(kind) => Ok(Decoded::Vector(decode_vector(
            value, *kind, path, options,
        )?)),
        SchemaNode::Object(fields) => Ok(Decoded::Record(decode_object(
            fields, value, path, options,
        )?)),
        SchemaNode::Table(fields) => Ok(Decoded::Table(decode_table(
            fields, value, path, options,
        )?)),
        SchemaNode::ListOfTable(fields) => Ok(Decoded::TableList(decode_table_list(
            fields, value, path, options,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test::{scalar_object_schema, scalar_table_schema};

    #[test]
    fn test_integer_overflow_parse() {
        assert_eq!("wrap".parse::<IntegerOverflow>().unwrap(), IntegerOverflow::Wrap);
        assert_eq!(
            " ERROR ".parse::<IntegerOverflow>().unwrap(),
            IntegerOverflow::Error
        );
        let err = "saturate".parse::<IntegerOverflow>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Conversion);
        assert!(err.to_string().contains("saturate"));
    }

    #[test]
    fn test_builder() {
        let decoder = DecoderBuilder::new()
            .with_integer_overflow(IntegerOverflow::Error)
            .build(scalar_object_schema());
        assert_eq!(decoder.options().integer_overflow, IntegerOverflow::Error);

        let decoder = DecoderBuilder::new()
            .with_options(DecodeOptions::default())
            .build(scalar_object_schema());
        assert_eq!(decoder.options().integer_overflow, IntegerOverflow::Wrap);
    }

    #[test]
    fn test_decode_object_document() {
        let decoder = Decoder::new(scalar_object_schema());
        let decoded = decoder
            .decode_str(r#"{"int": 7, "unknown": [1, 2]}"#)
            .unwrap();
        let record = decoded.as_record().unwrap();
        assert_eq!(record["int"], Decoded::from(7));
        assert_eq!(record["lgl"], Decoded::from(false));
    }

    #[test]
    fn test_decode_matches_default_decoder() {
        let schema = scalar_table_schema();
        let decoder = Decoder::new(schema.clone());

        let rows = r#"[{"int": 4294967298, "str": "a"}, {}]"#;
        assert_eq!(decode(rows, &schema).unwrap(), decoder.decode_str(rows).unwrap());

        let bad = r#"[{}, {"dbl": "x"}]"#;
        assert_eq!(
            decode(bad, &schema).unwrap_err().to_string(),
            decoder.decode_str(bad).unwrap_err().to_string()
        );
    }

    #[test]
    fn test_invalid_json_text() {
        let err = decode("[{", &scalar_table_schema()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Json);
    }

    #[test]
    fn test_record_batch_requires_table() {
        let decoder = Decoder::new(scalar_object_schema());
        let err = decoder.decode_record_batch("{}").unwrap_err();
        assert!(err.to_string().contains("table schema"));

        let decoder = Decoder::new(scalar_table_schema());
        let err = decoder.decode_record_batch("null").unwrap_err();
        assert!(err.to_string().contains("null document"));
    }
}
