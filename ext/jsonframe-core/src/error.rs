use thiserror::Error;

/// Core error type for schema compilation and decoding
#[derive(Error, Debug)]
pub enum JsonFrameError {
    /// A JSON value's type does not match what the schema requires at `path`
    #[error("Cannot convert a JSON {found} to {expected} at path {path}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        path: String,
    },

    /// An object key could not be read as text
    #[error("Malformed object key at path {path}")]
    MalformedKey { path: String },

    /// An integer does not fit the 32-bit integer kind
    #[error("Integer {value} does not fit into a 32-bit integer at path {path}")]
    IntegerOverflow { value: String, path: String },

    /// Schema description errors, raised only while compiling a schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// The input text is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow errors while materializing a table
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Conversion errors between decoded values and Arrow arrays
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Internal errors that shouldn't happen
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Taxonomy tag of a [`JsonFrameError`], for hosts that map errors onto their own surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeMismatch,
    MalformedKey,
    IntegerOverflow,
    Schema,
    Json,
    Arrow,
    Conversion,
    Internal,
}

/// Result type alias for jsonframe operations
pub type Result<T> = std::result::Result<T, JsonFrameError>;

impl JsonFrameError {
    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        JsonFrameError::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        JsonFrameError::Conversion(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        JsonFrameError::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            JsonFrameError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            JsonFrameError::MalformedKey { .. } => ErrorKind::MalformedKey,
            JsonFrameError::IntegerOverflow { .. } => ErrorKind::IntegerOverflow,
            JsonFrameError::Schema(_) => ErrorKind::Schema,
            JsonFrameError::Json(_) => ErrorKind::Json,
            JsonFrameError::Arrow(_) => ErrorKind::Arrow,
            JsonFrameError::Conversion(_) => ErrorKind::Conversion,
            JsonFrameError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Rendered location of a decode error, if the error carries one
    pub fn path(&self) -> Option<&str> {
        match self {
            JsonFrameError::TypeMismatch { path, .. }
            | JsonFrameError::MalformedKey { path }
            | JsonFrameError::IntegerOverflow { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Extension trait to add context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, ctx: S) -> Result<T>;

    /// Add context with a closure that's only called on error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<JsonFrameError>,
{
    fn context<S: Into<String>>(self, ctx: S) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            JsonFrameError::Internal(format!("{}: {}", ctx.into(), base_error))
        })
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            JsonFrameError::Internal(format!("{}: {}", f().into(), base_error))
        })
    }
}
