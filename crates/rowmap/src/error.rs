//! Error types for rowmap

use thiserror::Error;

/// Result type alias for rowmap operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Boxed error produced by an [`Executor`](crate::Executor) implementation.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for registration, query building, binding and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// The record descriptor does not describe a struct with named fields
    #[error("you can only register structs, {0} is not one")]
    NotAStruct(String),

    /// The model (type or name) was registered before
    #[error("model {0} found more than once")]
    DuplicateModel(String),

    /// No field carries the primary marker
    #[error("model {0} must have at least one field marked primary")]
    NoPrimaryKey(String),

    /// A query referenced a record type that was never registered
    #[error("model {0} is not registered")]
    UnregisteredModel(String),

    /// Relationships were already inferred, the registry no longer accepts models
    #[error("cannot register model {0}: relationships were already inferred")]
    RegistryFrozen(String),

    /// A multi-row fetch was attempted without a positive limit
    #[error("a positive limit is required when fetching many rows")]
    LimitRequired,

    /// A single-row fetch matched nothing
    #[error("not found: {0}")]
    NotFound(String),

    /// A returned column has no matching field on the destination model
    #[error("column {column} has no matching field on model {model}")]
    UnknownColumn { model: String, column: String },

    /// A field can be paired with more than one back-reference on its target
    #[error("relationship {model}.{field} is ambiguous: {candidates} back-references on {target}")]
    AmbiguousRelationship {
        model: String,
        field: String,
        target: String,
        candidates: usize,
    },

    /// Row decode/mapping error
    #[error("decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Text could not be parsed into the requested scalar
    #[error("cannot parse {input:?} as {kind}: {message}")]
    Parse {
        kind: &'static str,
        input: String,
        message: String,
    },

    /// Builder misuse detected while rendering a statement
    #[error("validation error: {0}")]
    Validation(String),

    /// Error raised by the executor, passed through untouched
    #[error(transparent)]
    Driver(DriverError),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a parse error
    pub fn parse(kind: &'static str, input: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            kind,
            input: input.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an executor error
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Self::Driver(err.into())
    }

    /// Attach a column name to a decode error that has none yet.
    pub fn at_column(self, column: &str) -> Self {
        match self {
            Self::Decode { column: c, message } if c.is_empty() => Self::Decode {
                column: column.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if this error came from the executor
    pub fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }

    /// Borrow the executor error, if this is one.
    pub fn as_driver(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Driver(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for OrmError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Driver(Box::new(err))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Driver(Box::new(err))
    }
}
