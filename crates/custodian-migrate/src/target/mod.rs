//! Physical side of a migration: executing DDL inside a transaction.
//!
//! Field operations only see [`DbTransaction`]; [`PgTarget`] hands out
//! PostgreSQL-backed transactions.

mod postgres;
mod tls;

pub use postgres::{HealthCheckResult, PgTarget, PgTransaction};
pub use tls::SslMode;

use async_trait::async_trait;

use crate::error::Result;

/// An open transaction owned by the caller.
///
/// Field operations call [`execute`](DbTransaction::execute) once per
/// statement and never commit or roll back themselves.
#[async_trait]
pub trait DbTransaction: Send {
    /// Execute one SQL statement.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}
