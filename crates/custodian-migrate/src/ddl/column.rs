//! Column-level statements.

use crate::core::identifier::{quote_ident, unique_constraint_name};

use super::schema::Column;
use super::statement::Statement;

/// Renders `ALTER TABLE` statements for single columns.
///
/// Every statement is named `<kind>#<table>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnStatementFactory;

impl ColumnStatementFactory {
    /// `ADD COLUMN` with type, nullability, uniqueness and default.
    ///
    /// Enum columns use their backing type, which must already exist.
    pub fn add(&self, table: &str, column: &Column) -> Statement {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(table),
            quote_ident(&column.name),
            column.sql_type(table)
        );
        if !column.optional {
            sql.push_str(" NOT NULL");
        }
        if column.unique {
            sql.push_str(" UNIQUE");
        }
        if column.has_default() {
            sql.push_str(" DEFAULT ");
            sql.push_str(&column.defval);
        }
        sql.push(';');

        let kind = if column.is_enum() {
            "add_enum_column"
        } else {
            "add_column"
        };
        Statement::new(kind, table, sql)
    }

    pub fn drop(&self, table: &str, column: &Column) -> Statement {
        Statement::new(
            "drop_column",
            table,
            format!(
                "ALTER TABLE {} DROP COLUMN {};",
                quote_ident(table),
                quote_ident(&column.name)
            ),
        )
    }

    pub fn rename(&self, table: &str, current_name: &str, new_name: &str) -> Statement {
        Statement::new(
            "rename_column",
            table,
            format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {};",
                quote_ident(table),
                quote_ident(current_name),
                quote_ident(new_name)
            ),
        )
    }

    /// `SET NOT NULL` or `DROP NOT NULL`, following `column.optional`.
    pub fn set_null(&self, table: &str, column: &Column) -> Statement {
        let action = if column.optional { "DROP" } else { "SET" };
        Statement::new(
            "alter_column_set_null",
            table,
            format!(
                "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL;",
                quote_ident(table),
                quote_ident(&column.name),
                action
            ),
        )
    }

    /// `SET DEFAULT` with the rendered default, or `DROP DEFAULT` when the
    /// column has none. Enum defaults are cast to the backing type.
    pub fn set_default(&self, table: &str, column: &Column) -> Statement {
        if !column.has_default() {
            return self.drop_default(table, column);
        }
        let mut default = column.defval.clone();
        if column.is_enum() {
            default.push_str("::");
            default.push_str(&column.sql_type(table));
        }
        Statement::new(
            "alter_column_set_default",
            table,
            format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                quote_ident(table),
                quote_ident(&column.name),
                default
            ),
        )
    }

    pub fn drop_default(&self, table: &str, column: &Column) -> Statement {
        Statement::new(
            "alter_column_drop_default",
            table,
            format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
                quote_ident(table),
                quote_ident(&column.name)
            ),
        )
    }

    /// `SET DATA TYPE` to the column's type. Existing values are converted
    /// through their text representation.
    pub fn set_type(&self, table: &str, column: &Column) -> Statement {
        let sql_type = column.sql_type(table);
        Statement::new(
            "alter_column_set_type",
            table,
            format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {} USING {}::text::{};",
                quote_ident(table),
                quote_ident(&column.name),
                sql_type,
                quote_ident(&column.name),
                sql_type
            ),
        )
    }

    /// Add or drop the column's unique constraint, following `column.unique`.
    pub fn set_unique(&self, table: &str, column: &Column) -> Statement {
        let constraint = quote_ident(&unique_constraint_name(table, &column.name));
        let sql = if column.unique {
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({});",
                quote_ident(table),
                constraint,
                quote_ident(&column.name)
            )
        } else {
            format!(
                "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {};",
                quote_ident(table),
                constraint
            )
        };
        Statement::new("set_unique", table, sql)
    }

    /// Rename the unique constraint of a renamed column.
    pub fn rename_unique(&self, table: &str, current_name: &str, new_name: &str) -> Statement {
        Statement::new(
            "rename_unique",
            table,
            format!(
                "ALTER TABLE {} RENAME CONSTRAINT {} TO {};",
                quote_ident(table),
                quote_ident(&unique_constraint_name(table, current_name)),
                quote_ident(&unique_constraint_name(table, new_name))
            ),
        )
    }
}
