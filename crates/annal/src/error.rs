//! Error types for the migration ledger

use thiserror::Error;

/// Ledger error types
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Error from the underlying database driver
    #[error("Database error: {0}")]
    Backend(String),

    /// The ledger table is absent and could not be created.
    ///
    /// Raised only by `ensure_schema`; wraps the backend error that made
    /// the creation fail.
    #[error("Unable to create the {table} table: {source}")]
    SchemaMissing {
        table: String,
        #[source]
        source: Box<LedgerError>,
    },

    /// Invalid argument
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    /// A record for this (app, name) already exists (strict mode only)
    #[error("Migration {name} for {app} is already recorded")]
    Duplicate { app: String, name: String },
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    /// Create a backend error from a driver message
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a schema-missing error wrapping the failure that caused it
    pub fn schema_missing(table: impl Into<String>, source: LedgerError) -> Self {
        Self::SchemaMissing {
            table: table.into(),
            source: Box::new(source),
        }
    }

    /// Create an invalid argument error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    /// Create a duplicate-record error
    pub fn duplicate(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            app: app.into(),
            name: name.into(),
        }
    }

    /// Whether this error means the ledger table could not be created.
    #[must_use]
    pub const fn is_schema_missing(&self) -> bool {
        matches!(self, Self::SchemaMissing { .. })
    }

    /// A stable short code for this error, for log fields.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "BACKEND_ERROR",
            Self::SchemaMissing { .. } => "SCHEMA_MISSING",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Duplicate { .. } => "DUPLICATE",
        }
    }
}
