//! DDL statements and ordered statement sets.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MigrateError, Result};
use crate::target::DbTransaction;

/// One atomic DDL action.
///
/// The name is a composite `<kind>#<subject>` key (e.g. `add_column#o_order`)
/// used in logs and error context; the code is the SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    name: String,
    code: String,
}

impl Statement {
    pub fn new(kind: &str, subject: &str, code: String) -> Self {
        Self {
            name: format!("{}#{}", kind, subject),
            code,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statement kind, the part of the name before `#`.
    pub fn kind(&self) -> &str {
        self.name.split('#').next().unwrap_or(&self.name)
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- {}\n{}", self.name, self.code)
    }
}

/// Ordered, append-only batch of statements.
///
/// Insertion order is execution order. Later statements routinely depend on
/// the effects of earlier ones (an enum type must exist before a column uses
/// it), so the order is never changed after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatementSet {
    statements: Vec<Statement>,
}

impl StatementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Statement names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.statements.iter().map(Statement::name).collect()
    }

    /// Execute every statement in order, stopping at the first failure.
    ///
    /// `table` and `field` only add context to the returned
    /// [`MigrateError::DdlExecution`]; already-executed statements are left to
    /// the transaction owner to roll back.
    pub async fn execute(
        &self,
        tx: &mut dyn DbTransaction,
        table: &str,
        field: Option<&str>,
    ) -> Result<()> {
        for statement in &self.statements {
            debug!("Executing {}: {}", statement.name(), statement.code());
            if let Err(e) = tx.execute(statement.code()).await {
                warn!("Statement {} failed: {}", statement.name(), e);
                return Err(MigrateError::ddl_execution(
                    table,
                    field,
                    statement.name(),
                    &e,
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a StatementSet {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl fmt::Display for StatementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
