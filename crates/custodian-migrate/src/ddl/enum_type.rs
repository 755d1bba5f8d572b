//! Enum type statements.
//!
//! The type backing an enum column `c` of table `t` is always named `t_c`,
//! so renaming the column means renaming the type as well. Statements are
//! named `<kind>#<type>`.

use crate::core::identifier::{enum_type_name, quote_ident, quote_literal};

use super::schema::Column;
use super::statement::Statement;

/// Where a new enum value is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePosition {
    /// Immediately before an existing value.
    Before(String),
    /// After all existing values.
    End,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnumStatementFactory;

impl EnumStatementFactory {
    pub fn create(&self, table: &str, column: &Column) -> Statement {
        let type_name = enum_type_name(table, &column.name);
        let choices = column
            .choices
            .iter()
            .map(|c| quote_literal(c))
            .collect::<Vec<_>>()
            .join(", ");
        Statement::new(
            "create_type",
            &type_name,
            format!("CREATE TYPE {} AS ENUM ({});", quote_ident(&type_name), choices),
        )
    }

    pub fn drop(&self, table: &str, column_name: &str) -> Statement {
        let type_name = enum_type_name(table, column_name);
        Statement::new(
            "drop_type",
            &type_name,
            format!("DROP TYPE IF EXISTS {};", quote_ident(&type_name)),
        )
    }

    pub fn rename(&self, table: &str, current_column: &str, new_column: &str) -> Statement {
        let current = enum_type_name(table, current_column);
        Statement::new(
            "rename_type",
            &current,
            format!(
                "ALTER TYPE {} RENAME TO {};",
                quote_ident(&current),
                quote_ident(&enum_type_name(table, new_column))
            ),
        )
    }

    pub fn add_value(
        &self,
        table: &str,
        column_name: &str,
        value: &str,
        position: &ValuePosition,
    ) -> Statement {
        let type_name = enum_type_name(table, column_name);
        let mut sql = format!(
            "ALTER TYPE {} ADD VALUE IF NOT EXISTS {}",
            quote_ident(&type_name),
            quote_literal(value)
        );
        if let ValuePosition::Before(next) = position {
            sql.push_str(" BEFORE ");
            sql.push_str(&quote_literal(next));
        }
        sql.push(';');
        Statement::new("add_enum_value", &type_name, sql)
    }
}
