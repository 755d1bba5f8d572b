//! Migration documents.
//!
//! A document names one object and one field change:
//!
//! ```yaml
//! object: order
//! operation:
//!   type: updateField
//!   name: state
//!   field:
//!     name: state
//!     type: enum
//!     enum: [new, paid, shipped]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{AddFieldOperation, MigrationOperation, RemoveFieldOperation, UpdateFieldOperation};
use crate::core::table_name;
use crate::ddl::StatementSet;
use crate::description::{Field, MetaDescription};
use crate::error::{MigrateError, Result};
use crate::syncer::MetaDescriptionSyncer;
use crate::target::DbTransaction;

/// The change requested for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldChange {
    AddField { field: Field },
    RemoveField { name: String },
    UpdateField { name: String, field: Field },
}

/// A field change against one named object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMigration {
    pub object: String,
    pub operation: FieldChange,
}

impl FieldMigration {
    /// Load a migration from a YAML or JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a migration document. JSON is accepted as a subset of YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build the operation, resolving current field definitions by name.
    pub fn resolve(&self, description: &MetaDescription) -> Result<Box<dyn MigrationOperation>> {
        if description.name != self.object {
            return Err(MigrateError::InvalidMigration(format!(
                "migration targets {} but description is {}",
                self.object, description.name
            )));
        }

        let current = |name: &str| {
            description
                .find_field(name)
                .cloned()
                .ok_or_else(|| MigrateError::UnknownField {
                    object: description.name.clone(),
                    field: name.to_string(),
                })
        };

        Ok(match &self.operation {
            FieldChange::AddField { field } => Box::new(AddFieldOperation::new(field.clone())),
            FieldChange::RemoveField { name } => {
                Box::new(RemoveFieldOperation::new(current(name)?))
            }
            FieldChange::UpdateField { name, field } => {
                Box::new(UpdateFieldOperation::new(current(name)?, field.clone()))
            }
        })
    }

    async fn description(&self, syncer: &dyn MetaDescriptionSyncer) -> Result<MetaDescription> {
        syncer
            .get(&self.object)
            .await?
            .ok_or_else(|| MigrateError::MetaStore(format!("Object {} does not exist", self.object)))
    }

    /// Statements the migration would execute, without touching anything.
    pub async fn plan(&self, syncer: &dyn MetaDescriptionSyncer) -> Result<StatementSet> {
        let description = self.description(syncer).await?;
        let operation = self.resolve(&description)?;
        operation.check(&description)?;
        operation.build_statements(&description, syncer).await
    }

    fn field_name(&self) -> &str {
        match &self.operation {
            FieldChange::AddField { field } => &field.name,
            FieldChange::RemoveField { name } | FieldChange::UpdateField { name, .. } => name,
        }
    }

    /// Execute the statements on `tx`, then roll it back. The description
    /// store is never touched.
    pub async fn dry_run(
        &self,
        syncer: &dyn MetaDescriptionSyncer,
        tx: &mut dyn DbTransaction,
    ) -> Result<StatementSet> {
        match self.execute_plan(syncer, tx).await {
            Ok(statements) => {
                tx.rollback().await?;
                Ok(statements)
            }
            Err(e) => {
                rollback_logged(tx, &self.object).await;
                Err(e)
            }
        }
    }

    async fn execute_plan(
        &self,
        syncer: &dyn MetaDescriptionSyncer,
        tx: &mut dyn DbTransaction,
    ) -> Result<StatementSet> {
        let statements = self.plan(syncer).await?;
        statements
            .execute(tx, &table_name(&self.object), Some(self.field_name()))
            .await?;
        Ok(statements)
    }

    /// Run the migration as one unit: physical sync on `tx`, logical sync
    /// through `syncer`, then commit.
    ///
    /// Any failure before the commit rolls `tx` back and leaves the stored
    /// description as it was. If the commit itself fails, the previous
    /// description is written back.
    pub async fn apply(
        &self,
        syncer: &dyn MetaDescriptionSyncer,
        tx: &mut dyn DbTransaction,
    ) -> Result<MetaDescription> {
        let (previous, updated) = match self.sync(syncer, tx).await {
            Ok(synced) => synced,
            Err(e) => {
                rollback_logged(tx, &self.object).await;
                return Err(e);
            }
        };

        if let Err(e) = tx.commit().await {
            warn!(
                "Commit of {} failed, restoring its description: {}",
                self.object, e
            );
            if let Err(restore) = syncer.update(&updated.name, &previous).await {
                warn!(
                    "Could not restore description of {} in {} store: {}",
                    self.object,
                    syncer.backend_type(),
                    restore
                );
            }
            return Err(e);
        }
        Ok(updated)
    }

    async fn sync(
        &self,
        syncer: &dyn MetaDescriptionSyncer,
        tx: &mut dyn DbTransaction,
    ) -> Result<(MetaDescription, MetaDescription)> {
        let description = self.description(syncer).await?;
        let operation = self.resolve(&description)?;
        operation.check(&description)?;

        operation.sync_db_description(&description, tx, syncer).await?;
        let updated = operation.sync_meta_description(&description, syncer).await?;

        info!(
            "Applied {} to {} ({} store)",
            operation.describe(),
            self.object,
            syncer.backend_type()
        );
        Ok((description, updated))
    }
}

/// Roll back after a failure without masking it.
async fn rollback_logged(tx: &mut dyn DbTransaction, object: &str) {
    if let Err(e) = tx.rollback().await {
        warn!("Rollback for {} failed: {}", object, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::FieldType;
    use crate::syncer::InMemorySyncer;
    use crate::testing::{order, RecordingTransaction};

    #[test]
    fn test_parse_yaml_document() {
        let migration = FieldMigration::from_yaml(
            r#"
object: order
operation:
  type: updateField
  name: state
  field:
    name: state
    type: enum
    enum: [new, paid, shipped]
"#,
        )
        .unwrap();
        assert_eq!(migration.object, "order");
        match migration.operation {
            FieldChange::UpdateField { name, field } => {
                assert_eq!(name, "state");
                assert_eq!(field.choices.len(), 3);
            }
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_document() {
        let migration = FieldMigration::from_yaml(
            r#"{"object": "order", "operation": {"type": "removeField", "name": "title"}}"#,
        )
        .unwrap();
        assert_eq!(
            migration.operation,
            FieldChange::RemoveField {
                name: "title".into()
            }
        );
    }

    #[test]
    fn test_resolve_unknown_field() {
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::RemoveField {
                name: "missing".into(),
            },
        };
        assert!(matches!(
            migration.resolve(&order()),
            Err(MigrateError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_resolve_wrong_object() {
        let migration = FieldMigration {
            object: "client".into(),
            operation: FieldChange::RemoveField { name: "id".into() },
        };
        assert!(matches!(
            migration.resolve(&order()),
            Err(MigrateError::InvalidMigration(_))
        ));
    }

    #[tokio::test]
    async fn test_plan_does_not_persist() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("title", FieldType::String),
            },
        };
        let set = migration.plan(&syncer).await.unwrap();
        assert_eq!(set.names(), vec!["add_column#o_order"]);
        assert_eq!(syncer.get("order").await.unwrap(), Some(order()));
    }

    #[tokio::test]
    async fn test_plan_rejects_duplicate_add() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("id", FieldType::String),
            },
        };
        assert!(matches!(
            migration.plan(&syncer).await,
            Err(MigrateError::DuplicateField { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_syncs_both_sides() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut tx = RecordingTransaction::new();
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("title", FieldType::String),
            },
        };

        let updated = migration.apply(&syncer, &mut tx).await.unwrap();
        assert_eq!(updated.fields.len(), 2);
        assert_eq!(tx.executed().len(), 1);
        assert!(tx.committed());
        assert_eq!(syncer.get("order").await.unwrap(), Some(updated));
    }

    fn add_title() -> FieldMigration {
        FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("title", FieldType::String),
            },
        }
    }

    #[tokio::test]
    async fn test_failed_commit_restores_description() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut tx = RecordingTransaction::new().with_failing_commit();

        let err = add_title().apply(&syncer, &mut tx).await.unwrap_err();
        assert!(matches!(err, MigrateError::Target(_)));
        assert!(!tx.committed());
        assert_eq!(syncer.get("order").await.unwrap(), Some(order()));
    }

    #[tokio::test]
    async fn test_failed_rollback_keeps_original_error() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut tx = RecordingTransaction::failing_on("ADD COLUMN").with_failing_rollback();

        let err = add_title().apply(&syncer, &mut tx).await.unwrap_err();
        assert!(matches!(err, MigrateError::DdlExecution { .. }));

        let mut tx = RecordingTransaction::failing_on("ADD COLUMN").with_failing_rollback();
        let err = add_title().dry_run(&syncer, &mut tx).await.unwrap_err();
        assert!(matches!(err, MigrateError::DdlExecution { .. }));
    }

    #[tokio::test]
    async fn test_apply_checks_before_executing() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut tx = RecordingTransaction::new();
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("id", FieldType::String),
            },
        };

        let err = migration.apply(&syncer, &mut tx).await.unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateField { .. }));
        assert_eq!(tx.attempts(), 0);
        assert!(tx.rolled_back());
    }

    #[tokio::test]
    async fn test_failed_ddl_leaves_description_untouched() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut tx = RecordingTransaction::failing_on("ADD COLUMN");
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("title", FieldType::String),
            },
        };

        let err = migration.apply(&syncer, &mut tx).await.unwrap_err();
        assert!(matches!(err, MigrateError::DdlExecution { .. }));
        assert!(tx.rolled_back());
        assert!(!tx.committed());
        assert_eq!(syncer.get("order").await.unwrap(), Some(order()));
    }

    #[tokio::test]
    async fn test_dry_run_executes_without_persisting() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut tx = RecordingTransaction::new();
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::AddField {
                field: Field::new("title", FieldType::String),
            },
        };

        let set = migration.dry_run(&syncer, &mut tx).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(tx.executed().len(), 1);
        assert!(tx.rolled_back());
        assert!(!tx.committed());
        assert_eq!(syncer.get("order").await.unwrap(), Some(order()));
    }

    #[tokio::test]
    async fn test_missing_object() {
        let syncer = InMemorySyncer::new();
        let migration = FieldMigration {
            object: "order".into(),
            operation: FieldChange::RemoveField { name: "id".into() },
        };
        assert!(matches!(
            migration.plan(&syncer).await,
            Err(MigrateError::MetaStore(_))
        ));
    }
}
