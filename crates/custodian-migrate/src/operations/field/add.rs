use async_trait::async_trait;
use tracing::{info, warn};

use crate::core::table_name;
use crate::ddl::{
    ColumnStatementFactory, ConstraintStatementFactory, EnumStatementFactory, PropertyDeriver,
    SequenceStatementFactory, StatementSet,
};
use crate::description::{Field, MetaDescription};
use crate::error::{MigrateError, Result};
use crate::operations::MigrationOperation;
use crate::syncer::MetaDescriptionSyncer;

/// Appends a field to a description.
#[derive(Debug, Clone)]
pub struct AddField {
    pub field: Field,
}

impl AddField {
    pub fn new(field: Field) -> Self {
        Self { field }
    }

    /// The updated description, or `None` when the field is a benign
    /// duplicate and nothing needs to change.
    pub fn apply(&self, description: &MetaDescription) -> Result<Option<MetaDescription>> {
        if let Some(existing) = description.find_field(&self.field.name) {
            if is_benign_duplicate(existing, &self.field) {
                warn!(
                    "Object {} already has outer link {}; skipping",
                    description.name, self.field.name
                );
                return Ok(None);
            }
            return Err(MigrateError::DuplicateField {
                object: description.name.clone(),
                field: self.field.name.clone(),
            });
        }

        let mut updated = description.clone();
        updated.fields.push(self.field.clone());
        Ok(Some(updated))
    }

    pub async fn sync_meta_description(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<MetaDescription> {
        match self.apply(description)? {
            Some(updated) => syncer.update(&description.name, &updated).await,
            None => Ok(description.clone()),
        }
    }
}

/// Two inner links from different fields on the same object synthesize
/// reverse links with the same name on their target. The second one is
/// skipped instead of rejected.
fn is_benign_duplicate(existing: &Field, added: &Field) -> bool {
    existing.is_outer_link()
        && added.is_outer_link()
        && existing.outer_link_field != added.outer_link_field
}

/// [`AddField`] plus the DDL creating the field's columns.
#[derive(Debug, Clone)]
pub struct AddFieldOperation {
    logical: AddField,
}

impl AddFieldOperation {
    pub fn new(field: Field) -> Self {
        Self {
            logical: AddField::new(field),
        }
    }

    pub fn field(&self) -> &Field {
        &self.logical.field
    }
}

#[async_trait]
impl MigrationOperation for AddFieldOperation {
    async fn sync_meta_description(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<MetaDescription> {
        let updated = self.logical.sync_meta_description(description, syncer).await?;
        info!("Added field {} to {}", self.logical.field.name, description.name);
        Ok(updated)
    }

    /// Sequence, then columns (enum types before their column), then the
    /// foreign key.
    async fn build_statements(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<StatementSet> {
        let props = PropertyDeriver::new(syncer)
            .derive(&self.logical.field, description)
            .await?;
        let table = table_name(&description.name);
        let mut set = StatementSet::new();

        if let Some(seq) = &props.seq {
            set.add(SequenceStatementFactory.create(seq));
        }
        for column in &props.columns {
            if column.is_enum() {
                set.add(EnumStatementFactory.create(&table, column));
            }
            set.add(ColumnStatementFactory.add(&table, column));
        }
        if let Some(ifk) = &props.ifk {
            set.add(ConstraintStatementFactory.create_ifk(&table, ifk));
        }
        Ok(set)
    }

    fn check(&self, description: &MetaDescription) -> Result<()> {
        self.logical.apply(description).map(|_| ())
    }

    fn field_name(&self) -> &str {
        &self.logical.field.name
    }

    fn describe(&self) -> String {
        format!("add field {}", self.logical.field.name)
    }
}
