//! # custodian-migrate
//!
//! Field-level schema migrations for a metadata-driven object model.
//!
//! Application objects are described declaratively as [`MetaDescription`]s,
//! each backed by a PostgreSQL table `o_<name>`. Adding, removing or updating
//! a field has to change two things consistently:
//!
//! - **logical**: the stored description, through a [`MetaDescriptionSyncer`]
//! - **physical**: the table, its columns, sequences, enum types and
//!   foreign keys, through DDL executed on a [`DbTransaction`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use custodian_migrate::{Config, FieldMigration, FileSyncer, PgTarget, DbTransaction};
//!
//! #[tokio::main]
//! async fn main() -> custodian_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let syncer = FileSyncer::new(&config.metadata.path);
//!     let target = PgTarget::new(&config.target).await?;
//!
//!     let migration = FieldMigration::load("add_title.yaml")?;
//!     let mut tx = target.begin().await?;
//!     match migration.apply(&syncer, &mut tx).await {
//!         Ok(_) => tx.commit().await,
//!         Err(e) => {
//!             tx.rollback().await?;
//!             Err(e)
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod core;
pub mod ddl;
pub mod description;
pub mod error;
pub mod operations;
pub mod syncer;
pub mod target;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use config::{Config, MetadataConfig, TargetConfig};
pub use ddl::{Statement, StatementSet};
pub use description::{DefaultValue, Field, FieldType, LinkType, MetaDescription, OnDelete};
pub use error::{ErrorKind, MigrateError, Result};
pub use operations::{
    AddFieldOperation, FieldChange, FieldMigration, MigrationOperation, RemoveFieldOperation,
    UpdateFieldOperation,
};
pub use syncer::{FileSyncer, InMemorySyncer, MetaDescriptionSyncer};
pub use target::{DbTransaction, HealthCheckResult, PgTarget, PgTransaction};
