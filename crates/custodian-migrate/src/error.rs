//! Error types for the migration library.

use thiserror::Error;

/// Coarse classification of a [`MigrateError`].
///
/// Callers use this to decide how to present a failure: validation errors are
/// user-correctable, everything else points at a malformed description, a
/// database rejection or an infrastructure problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested change is invalid for the current description.
    Validation,
    /// Physical properties could not be derived from a field.
    PropertyDerivation,
    /// The database rejected a DDL statement.
    DdlExecution,
    /// Invariant violation indicating a programming or consistency bug.
    Fatal,
    /// Configuration, IO, storage or connection failure.
    Infrastructure,
}

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A field with the same name already exists on the object.
    #[error("Object {object} already has field {field}")]
    DuplicateField { object: String, field: String },

    /// The referenced field does not exist on the object.
    #[error("Object {object} has no field named {field}")]
    UnknownField { object: String, field: String },

    /// Enum choices were removed or reordered.
    #[error(
        "Table {table}. Not all values are entered for the column `{column}`. Necessary minimum: {minimum:?}"
    )]
    EnumEvolution {
        table: String,
        column: String,
        minimum: Vec<String>,
    },

    /// Columns, constraints or sequences could not be derived for a field.
    #[error("Cannot derive physical properties of {object}.{field}: {message}")]
    PropertyDerivation {
        object: String,
        field: String,
        message: String,
    },

    /// The database rejected a statement.
    #[error("Error while executing statement '{statement}' on {table}: {message}")]
    DdlExecution {
        table: String,
        field: Option<String>,
        statement: String,
        message: String,
    },

    /// The migration itself is inconsistent (e.g. column arity changed on update).
    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    /// Metadata description store failure.
    #[error("Metadata store error: {0}")]
    MetaStore(String),

    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target database connection or query error
    #[error("Target database error: {0}")]
    Target(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a DdlExecution error for a failed statement.
    pub fn ddl_execution(
        table: impl Into<String>,
        field: Option<&str>,
        statement: impl Into<String>,
        source: &MigrateError,
    ) -> Self {
        // Unwrap the database message so callers see the backend's complaint,
        // not our own "Target database error" prefix.
        let message = match source {
            MigrateError::Target(e) => e
                .as_db_error()
                .map(|db| db.message().to_string())
                .unwrap_or_else(|| e.to_string()),
            other => other.to_string(),
        };
        MigrateError::DdlExecution {
            table: table.into(),
            field: field.map(str::to_string),
            statement: statement.into(),
            message,
        }
    }

    /// Create a PropertyDerivation error.
    pub fn derivation(
        object: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        MigrateError::PropertyDerivation {
            object: object.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrateError::DuplicateField { .. }
            | MigrateError::UnknownField { .. }
            | MigrateError::EnumEvolution { .. } => ErrorKind::Validation,
            MigrateError::PropertyDerivation { .. } => ErrorKind::PropertyDerivation,
            MigrateError::DdlExecution { .. } => ErrorKind::DdlExecution,
            MigrateError::InvalidMigration(_) => ErrorKind::Fatal,
            _ => ErrorKind::Infrastructure,
        }
    }

    /// HTTP-style status for API surfaces: 400 for user-correctable errors.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            _ => 500,
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => 1,
            MigrateError::DuplicateField { .. }
            | MigrateError::UnknownField { .. }
            | MigrateError::EnumEvolution { .. } => 2,
            MigrateError::PropertyDerivation { .. } => 3,
            MigrateError::DdlExecution { .. }
            | MigrateError::Target(_)
            | MigrateError::Pool { .. } => 4,
            MigrateError::InvalidMigration(_) => 5,
            MigrateError::MetaStore(_) | MigrateError::Json(_) => 6,
            MigrateError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
