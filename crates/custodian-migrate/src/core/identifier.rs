//! Naming conventions and quoting for physical schema objects.
//!
//! Every physical artifact the migration engine touches is named
//! deterministically from the object and field names:
//!
//! | Artifact           | Name                            |
//! |--------------------|---------------------------------|
//! | table              | `o_<object>`                    |
//! | enum type          | `<table>_<column>`              |
//! | default sequence   | `o_<object>_<field>_seq`        |
//! | unique constraint  | `<table>_<column>_key`          |
//! | inner foreign key  | `fk_<column>_<to_table>_<to_column>` |
//!
//! Identifiers cannot be bound as statement parameters, so they are always
//! rendered double-quoted with embedded quotes doubled.

use crate::error::{MigrateError, Result};

/// Prefix prepended to an object name to get its table name.
pub const TABLE_NAME_PREFIX: &str = "o_";

/// PostgreSQL truncates identifiers longer than `NAMEDATALEN - 1` bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

const GENERIC_TYPE_COLUMN_SUFFIX: &str = "__type";
const GENERIC_KEY_COLUMN_SUFFIX: &str = "__key";

/// Validate an identifier before it is used to name a physical artifact.
///
/// Rejects empty names, names containing null bytes and names PostgreSQL
/// would silently truncate.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a PostgreSQL identifier.
///
/// ```ignore
/// assert_eq!(quote_ident("users"), "\"users\"");
/// assert_eq!(quote_ident("table\"name"), "\"table\"\"name\"");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Table name backing an object.
pub fn table_name(object: &str) -> String {
    format!("{}{}", TABLE_NAME_PREFIX, object)
}

/// Name of the enum type backing `column` on `table`.
pub fn enum_type_name(table: &str, column: &str) -> String {
    format!("{}_{}", table, column)
}

/// Name of the sequence generating default values for `field` of `object`.
pub fn sequence_name(object: &str, field: &str) -> String {
    format!("{}_{}_seq", table_name(object), field)
}

/// Name PostgreSQL gives a column-level `UNIQUE` constraint.
pub fn unique_constraint_name(table: &str, column: &str) -> String {
    format!("{}_{}_key", table, column)
}

/// Name of an inner foreign key constraint.
pub fn foreign_key_name(from_column: &str, to_table: &str, to_column: &str) -> String {
    format!("fk_{}_{}_{}", from_column, to_table, to_column)
}

/// Column holding the target object name of a generic link.
pub fn generic_type_column(field: &str) -> String {
    format!("{}{}", field, GENERIC_TYPE_COLUMN_SUFFIX)
}

/// Column holding the target primary key of a generic link.
pub fn generic_key_column(field: &str) -> String {
    format!("{}{}", field, GENERIC_KEY_COLUMN_SUFFIX)
}
