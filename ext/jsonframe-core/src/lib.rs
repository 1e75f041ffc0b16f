//! Schema-driven decoding of JSON documents into typed records and columnar tables
//!
//! `jsonframe-core` compiles a schema description once and then decodes any number of JSON
//! documents against it. Arrays of objects are pivoted into column-oriented tables, absent
//! fields receive their declared defaults and explicit `null`s become typed null sentinels.
//!
//! # Key Components
//!
//! - **Schema**: Compiled, immutable decoder tree
//!   - Built from a serde-deserializable [`FieldDescription`] or with [`SchemaBuilder`]
//!   - Defaults are converted once at compile time
//!   - Shareable across threads behind an `Arc`
//!
//! - **Decoder**: Entry point for decoding
//!   - [`decode`] for one-off calls, [`Decoder`] for repeated use with [`DecodeOptions`]
//!   - Works on any JSON front-end implementing [`JsonNode`]
//!   - Errors report the precise location of the failing value, e.g. `[1]/a/b`
//!
//! - **Values**: Decoded output
//!   - [`Decoded`] records, vectors and scalars with per-type null sentinels
//!   - [`Table`] columns with exactly one entry per input row
//!
//! - **Arrow Conversion**: Decoded tables as Arrow record batches
//!   - Arrow types fixed by the compiled schema
//!
//! # Example Usage
//!
//! ```
//! use jsonframe_core::{decode, Decoded, Schema};
//!
//! let schema = Schema::from_json(
//!     r#"{"type": "table", "fields": [
//!         {"name": "id", "type": "int"},
//!         {"name": "name", "type": "str", "default": "anonymous"}
//!     ]}"#,
//! )?;
//!
//! let table = decode(r#"[{"id": 1, "name": "a"}, {"id": 2}]"#, &schema)?
//!     .into_table()
//!     .expect("table schema decodes into a table");
//!
//! assert_eq!(table.num_rows(), 2);
//! assert_eq!(table.column("name").unwrap().get(1), Some(Decoded::from("anonymous")));
//! # Ok::<(), jsonframe_core::JsonFrameError>(())
//! ```

pub mod arrow_conversion;
pub mod codec;
mod column;
pub mod compiler;
pub mod decoder;
pub mod error;
pub mod json;
pub mod object;
pub mod path;
pub mod schema;
pub mod table;
pub mod value;

#[cfg(test)]
pub mod test_utils;

pub use compiler::{FieldDescription, TypeTag};
pub use decoder::{
    decode, DecodeOptions, Decoder, DecoderBuilder, IntegerOverflow, INTEGER_OVERFLOW_ENV,
};
pub use error::{ErrorContext, ErrorKind, JsonFrameError, Result};
pub use json::{JsonNode, JsonNumber, JsonType};
pub use path::{JsonPath, PathSegment};
pub use schema::{Field, Fields, ScalarKind, Schema, SchemaBuilder, SchemaNode};
pub use value::{Column, Decoded, Record, Table, Vector};
