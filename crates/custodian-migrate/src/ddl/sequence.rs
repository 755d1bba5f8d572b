//! Sequence statements. Named `<kind>#<sequence>`.

use crate::core::identifier::quote_ident;

use super::schema::Seq;
use super::statement::Statement;

#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceStatementFactory;

impl SequenceStatementFactory {
    pub fn create(&self, seq: &Seq) -> Statement {
        Statement::new(
            "create_seq",
            &seq.name,
            format!("CREATE SEQUENCE IF NOT EXISTS {};", quote_ident(&seq.name)),
        )
    }

    /// Drops dependent defaults along with the sequence.
    pub fn drop(&self, seq: &Seq) -> Statement {
        Statement::new(
            "drop_seq",
            &seq.name,
            format!("DROP SEQUENCE {} CASCADE;", quote_ident(&seq.name)),
        )
    }

    pub fn rename(&self, current: &Seq, new: &Seq) -> Statement {
        Statement::new(
            "rename_seq",
            &current.name,
            format!(
                "ALTER SEQUENCE {} RENAME TO {};",
                quote_ident(&current.name),
                quote_ident(&new.name)
            ),
        )
    }
}
