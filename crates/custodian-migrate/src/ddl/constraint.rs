//! Foreign key statements.

use crate::core::identifier::quote_ident;

use super::schema::Ifk;
use super::statement::Statement;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintStatementFactory;

impl ConstraintStatementFactory {
    pub fn create_ifk(&self, table: &str, ifk: &Ifk) -> Statement {
        Statement::new(
            "create_ifk",
            table,
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {};",
                quote_ident(table),
                quote_ident(&ifk.constraint_name()),
                quote_ident(&ifk.from_column),
                quote_ident(&ifk.to_table),
                quote_ident(&ifk.to_column),
                ifk.on_delete.to_sql()
            ),
        )
    }

    pub fn drop_ifk(&self, table: &str, ifk: &Ifk) -> Statement {
        Statement::new(
            "drop_ifk",
            table,
            format!(
                "ALTER TABLE {} DROP CONSTRAINT {};",
                quote_ident(table),
                quote_ident(&ifk.constraint_name())
            ),
        )
    }
}
