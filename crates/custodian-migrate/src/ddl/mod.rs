//! DDL layer: physical schema fragments, statement factories and the
//! property deriver that connects fields to them.

mod column;
mod constraint;
mod enum_type;
mod properties;
mod schema;
mod sequence;
mod statement;

pub use column::ColumnStatementFactory;
pub use constraint::ConstraintStatementFactory;
pub use enum_type::{EnumStatementFactory, ValuePosition};
pub use properties::{FieldProperties, OuterLink, PropertyDeriver};
pub use schema::{Column, Ifk, Seq};
pub use sequence::SequenceStatementFactory;
pub use statement::{Statement, StatementSet};
