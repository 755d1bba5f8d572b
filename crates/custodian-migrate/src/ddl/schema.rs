//! Physical schema fragments derived from fields.
//!
//! These are never persisted; they are computed per operation from a
//! [`Field`](crate::description::Field) and discarded after the statements
//! they feed are executed.

use crate::core::identifier::{enum_type_name, foreign_key_name, quote_ident};
use crate::description::{FieldType, OnDelete};

/// Physical projection of a field onto one table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: FieldType,
    pub optional: bool,
    pub unique: bool,
    /// Fully rendered SQL default expression; empty if none.
    pub defval: String,
    /// Enum choices; empty unless the column is enum-typed.
    pub choices: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: FieldType) -> Self {
        Self {
            name: name.into(),
            column_type,
            optional: false,
            unique: false,
            defval: String::new(),
            choices: Vec::new(),
        }
    }

    pub fn is_enum(&self) -> bool {
        self.column_type == FieldType::Enum
    }

    pub fn has_default(&self) -> bool {
        !self.defval.is_empty()
    }

    /// Column type as it appears in DDL: the quoted backing type for enums,
    /// the mapped scalar type otherwise.
    pub fn sql_type(&self, table: &str) -> String {
        if self.is_enum() {
            quote_ident(&enum_type_name(table, &self.name))
        } else {
            self.column_type.ddl_type().unwrap_or("text").to_string()
        }
    }
}

/// Inner foreign key backing an inner link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifk {
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub on_delete: OnDelete,
}

impl Ifk {
    pub fn constraint_name(&self) -> String {
        foreign_key_name(&self.from_column, &self.to_table, &self.to_column)
    }
}

/// Sequence generating a column's default values.
///
/// Only an owned sequence (the derived `o_<obj>_<field>_seq`) follows the
/// field's lifecycle. A sequence named explicitly in `nextval` may back
/// other columns and is never renamed or dropped on the field's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seq {
    pub name: String,
    pub owned: bool,
}

impl Seq {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owned: true,
        }
    }

    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owned: false,
        }
    }
}
