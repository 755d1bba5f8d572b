//! Test doubles and fixtures shared by unit tests.

use async_trait::async_trait;

use crate::description::{DefaultValue, Field, FieldType, MetaDescription};
use crate::error::{MigrateError, Result};
use crate::target::DbTransaction;

/// Transaction that records executed SQL instead of running it.
#[derive(Debug, Default)]
pub struct RecordingTransaction {
    executed: Vec<String>,
    attempts: usize,
    fail_on: Option<String>,
    fail_commit: bool,
    fail_rollback: bool,
    committed: bool,
    rolled_back: bool,
}

impl RecordingTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any statement containing `pattern`.
    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    /// Makes `commit` fail.
    pub fn with_failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn with_failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    /// Successfully executed statements, in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Number of execute calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn committed(&self) -> bool {
        self.committed
    }

    pub fn rolled_back(&self) -> bool {
        self.rolled_back
    }
}

#[async_trait]
impl DbTransaction for RecordingTransaction {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.attempts += 1;
        if let Some(pattern) = &self.fail_on {
            if sql.contains(pattern.as_str()) {
                return Err(target_error());
            }
        }
        self.executed.push(sql.to_string());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.fail_commit {
            return Err(target_error());
        }
        self.committed = true;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.fail_rollback {
            return Err(target_error());
        }
        self.rolled_back = true;
        Ok(())
    }
}

/// A client-side `tokio_postgres` error that carries no server response.
pub fn target_error() -> MigrateError {
    match "no_such_option=1".parse::<tokio_postgres::Config>() {
        Err(e) => MigrateError::Target(e),
        Ok(_) => panic!("unknown connection option was accepted"),
    }
}

/// `client { id: number = nextval }`
pub fn client() -> MetaDescription {
    let mut id = Field::new("id", FieldType::Number);
    id.def = Some(DefaultValue::nextval());
    MetaDescription::new("client", "id", vec![id])
}

/// `order { id: number }`
pub fn order() -> MetaDescription {
    MetaDescription::new("order", "id", vec![Field::new("id", FieldType::Number)])
}
