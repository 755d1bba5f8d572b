//! Field-level migration operations.
//!
//! Every operation has two independent steps:
//!
//! - **logical sync** ([`MigrationOperation::sync_meta_description`]) mutates a
//!   clone of the description and persists it through the syncer;
//! - **physical sync** ([`MigrationOperation::sync_db_description`]) renders
//!   the matching DDL and executes it on a caller-owned transaction.
//!
//! Neither step commits or rolls back; the caller owns the transaction and
//! decides the order in which the steps run.

pub mod field;
mod migration;

pub use field::{
    AddField, AddFieldOperation, RemoveField, RemoveFieldOperation, UpdateField,
    UpdateFieldOperation,
};
pub use migration::{FieldChange, FieldMigration};

use async_trait::async_trait;
use tracing::info;

use crate::core::table_name;
use crate::ddl::StatementSet;
use crate::description::MetaDescription;
use crate::error::Result;
use crate::syncer::MetaDescriptionSyncer;
use crate::target::DbTransaction;

/// A field-level change applied to both the description store and the
/// database.
#[async_trait]
pub trait MigrationOperation: Send + Sync {
    /// Apply the change to a clone of `description`, persist it, and return
    /// the persisted description. `description` itself is never modified.
    async fn sync_meta_description(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<MetaDescription>;

    /// Validate the logical change without persisting anything.
    fn check(&self, description: &MetaDescription) -> Result<()>;

    /// Statements that realize the change, in execution order.
    async fn build_statements(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<StatementSet>;

    /// Name of the field the operation targets, used as error context.
    fn field_name(&self) -> &str;

    /// Short human-readable description for logs and plans.
    fn describe(&self) -> String;

    /// Build and execute the statements, stopping at the first failure.
    async fn sync_db_description(
        &self,
        description: &MetaDescription,
        tx: &mut dyn DbTransaction,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<()> {
        let statements = self.build_statements(description, syncer).await?;
        let table = table_name(&description.name);
        statements
            .execute(tx, &table, Some(self.field_name()))
            .await?;
        info!(
            "{}: executed {} statement(s) on {}",
            self.describe(),
            statements.len(),
            table
        );
        Ok(())
    }
}
