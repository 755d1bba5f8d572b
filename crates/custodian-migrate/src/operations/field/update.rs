use async_trait::async_trait;
use tracing::info;

use crate::core::identifier::quote_literal;
use crate::core::table_name;
use crate::ddl::{
    Column, ColumnStatementFactory, ConstraintStatementFactory, EnumStatementFactory, Ifk,
    PropertyDeriver, Seq, SequenceStatementFactory, StatementSet, ValuePosition,
};
use crate::description::{Field, MetaDescription};
use crate::error::{MigrateError, Result};
use crate::operations::MigrationOperation;
use crate::syncer::MetaDescriptionSyncer;

/// Replaces a field definition in place.
#[derive(Debug, Clone)]
pub struct UpdateField {
    pub current: Field,
    pub new: Field,
}

impl UpdateField {
    pub fn new(current: Field, new: Field) -> Self {
        Self { current, new }
    }

    pub fn apply(&self, description: &MetaDescription) -> Result<MetaDescription> {
        let position = description
            .field_position(&self.current.name)
            .ok_or_else(|| MigrateError::UnknownField {
                object: description.name.clone(),
                field: self.current.name.clone(),
            })?;

        if self.new.name != self.current.name && description.find_field(&self.new.name).is_some()
        {
            return Err(MigrateError::DuplicateField {
                object: description.name.clone(),
                field: self.new.name.clone(),
            });
        }

        let mut updated = description.clone();
        updated.fields[position] = self.new.clone();
        Ok(updated)
    }

    pub async fn sync_meta_description(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<MetaDescription> {
        let updated = self.apply(description)?;
        syncer.update(&description.name, &updated).await
    }
}

/// [`UpdateField`] plus the DDL diff between the two definitions.
#[derive(Debug, Clone)]
pub struct UpdateFieldOperation {
    logical: UpdateField,
}

impl UpdateFieldOperation {
    pub fn new(current: Field, new: Field) -> Self {
        Self {
            logical: UpdateField::new(current, new),
        }
    }

    /// Owned sequences follow the field; external ones are only ensured to
    /// exist.
    fn sequence_statements(set: &mut StatementSet, current: Option<&Seq>, new: Option<&Seq>) {
        let factory = SequenceStatementFactory;
        match (current, new) {
            (None, Some(new)) => set.add(factory.create(new)),
            (Some(current), None) if current.owned => set.add(factory.drop(current)),
            (Some(current), Some(new)) if current.name != new.name => {
                if current.owned && new.owned {
                    set.add(factory.rename(current, new));
                } else {
                    if current.owned {
                        set.add(factory.drop(current));
                    }
                    set.add(factory.create(new));
                }
            }
            _ => {}
        }
    }

    fn column_statements(
        &self,
        set: &mut StatementSet,
        table: &str,
        current: &[Column],
        new: &[Column],
    ) -> Result<()> {
        if current.len() != new.len() {
            return Err(MigrateError::InvalidMigration(format!(
                "field {} of {} cannot change from {} to {} columns",
                self.logical.current.name,
                table,
                current.len(),
                new.len()
            )));
        }
        for (current, new) in current.iter().zip(new) {
            Self::column_pair_statements(set, table, current, new)?;
        }
        Ok(())
    }

    /// Statements after a rename always address the new column name.
    fn column_pair_statements(
        set: &mut StatementSet,
        table: &str,
        current: &Column,
        new: &Column,
    ) -> Result<()> {
        let columns = ColumnStatementFactory;
        let enums = EnumStatementFactory;

        if current.name != new.name {
            set.add(columns.rename(table, &current.name, &new.name));
            if current.is_enum() {
                set.add(enums.rename(table, &current.name, &new.name));
            }
            if current.unique {
                set.add(columns.rename_unique(table, &current.name, &new.name));
            }
        }

        if current.optional != new.optional {
            set.add(columns.set_null(table, new));
        }

        let type_changed = current.column_type != new.column_type;
        if type_changed {
            // The old default may not cast to the new type, and an enum type
            // cannot be dropped while a default still references it.
            if current.has_default() || current.is_enum() {
                set.add(columns.drop_default(table, new));
            }
            if new.is_enum() {
                set.add(enums.create(table, new));
            }
            set.add(columns.set_type(table, new));
            if current.is_enum() {
                set.add(enums.drop(table, &new.name));
            }
            if new.has_default() {
                set.add(columns.set_default(table, new));
            }
        } else {
            if current.is_enum() && current.choices != new.choices {
                Self::enum_value_statements(set, table, current, new)?;
            }
            if current.defval != new.defval {
                set.add(columns.set_default(table, new));
            }
        }

        if current.unique != new.unique {
            set.add(columns.set_unique(table, new));
        }
        Ok(())
    }

    /// Enum values can only be added. Every current choice must survive in
    /// the same relative order; each new choice is inserted before the next
    /// surviving choice, or appended.
    ///
    /// PostgreSQL refuses to use a value in the transaction that adds it, so
    /// an added value cannot also become the default.
    fn enum_value_statements(
        set: &mut StatementSet,
        table: &str,
        current: &Column,
        new: &Column,
    ) -> Result<()> {
        let mut remaining = new.choices.iter();
        let additive = current
            .choices
            .iter()
            .all(|choice| remaining.any(|c| c == choice));
        if !additive {
            return Err(MigrateError::EnumEvolution {
                table: table.to_string(),
                column: new.name.clone(),
                minimum: current.choices.clone(),
            });
        }

        if let Some(choice) = new
            .choices
            .iter()
            .filter(|c| !current.choices.contains(c))
            .find(|c| quote_literal(c) == new.defval)
        {
            return Err(MigrateError::InvalidMigration(format!(
                "table {}: enum value '{}' of column `{}` cannot become the default in the \
                 migration that adds it; add the value first, then change the default",
                table, choice, new.name
            )));
        }

        for (i, choice) in new.choices.iter().enumerate() {
            if current.choices.contains(choice) {
                continue;
            }
            let position = new.choices[i + 1..]
                .iter()
                .find(|c| current.choices.contains(c))
                .map(|c| ValuePosition::Before(c.clone()))
                .unwrap_or(ValuePosition::End);
            set.add(
                EnumStatementFactory.add_value(table, &new.name, choice, &position),
            );
        }
        Ok(())
    }

    fn constraint_statements(
        set: &mut StatementSet,
        table: &str,
        current: Option<&Ifk>,
        new: Option<&Ifk>,
    ) {
        let factory = ConstraintStatementFactory;
        if let Some(ifk) = current {
            set.add(factory.drop_ifk(table, ifk));
        }
        if let Some(ifk) = new {
            set.add(factory.create_ifk(table, ifk));
        }
    }
}

#[async_trait]
impl MigrationOperation for UpdateFieldOperation {
    async fn sync_meta_description(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<MetaDescription> {
        let updated = self.logical.sync_meta_description(description, syncer).await?;
        info!(
            "Updated field {} of {}",
            self.logical.current.name, description.name
        );
        Ok(updated)
    }

    /// Sequence diff, then per-column diff, then foreign key replacement.
    async fn build_statements(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<StatementSet> {
        let deriver = PropertyDeriver::new(syncer);
        let current = deriver.derive(&self.logical.current, description).await?;
        let new = deriver.derive(&self.logical.new, description).await?;
        let table = table_name(&description.name);
        let mut set = StatementSet::new();

        Self::sequence_statements(&mut set, current.seq.as_ref(), new.seq.as_ref());
        self.column_statements(&mut set, &table, &current.columns, &new.columns)?;
        Self::constraint_statements(&mut set, &table, current.ifk.as_ref(), new.ifk.as_ref());
        Ok(set)
    }

    fn check(&self, description: &MetaDescription) -> Result<()> {
        self.logical.apply(description).map(|_| ())
    }

    fn field_name(&self) -> &str {
        &self.logical.current.name
    }

    fn describe(&self) -> String {
        if self.logical.current.name == self.logical.new.name {
            format!("update field {}", self.logical.current.name)
        } else {
            format!(
                "update field {} (renamed to {})",
                self.logical.current.name, self.logical.new.name
            )
        }
    }
}
