use async_trait::async_trait;
use tracing::info;

use crate::core::table_name;
use crate::ddl::{
    ColumnStatementFactory, ConstraintStatementFactory, EnumStatementFactory, PropertyDeriver,
    SequenceStatementFactory, StatementSet,
};
use crate::description::{Field, MetaDescription};
use crate::error::{MigrateError, Result};
use crate::operations::MigrationOperation;
use crate::syncer::MetaDescriptionSyncer;

/// Removes a field from a description, keeping the order of the others.
#[derive(Debug, Clone)]
pub struct RemoveField {
    pub field: Field,
}

impl RemoveField {
    pub fn new(field: Field) -> Self {
        Self { field }
    }

    pub fn apply(&self, description: &MetaDescription) -> Result<MetaDescription> {
        let position = description
            .field_position(&self.field.name)
            .ok_or_else(|| MigrateError::UnknownField {
                object: description.name.clone(),
                field: self.field.name.clone(),
            })?;

        let mut updated = description.clone();
        updated.fields.remove(position);
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

/// [`RemoveField`] plus the DDL dropping the field's columns.
#[derive(Debug, Clone)]
pub struct RemoveFieldOperation {
    logical: RemoveField,
}

impl RemoveFieldOperation {
    pub fn new(field: Field) -> Self {
        Self {
            logical: RemoveField::new(field),
        }
    }

    pub fn field(&self) -> &Field {
        &self.logical.field
    }
}

#[async_trait]
impl MigrationOperation for RemoveFieldOperation {
    async fn sync_meta_description(
        &self,
        description: &MetaDescription,
        syncer: &dyn MetaDescriptionSyncer,
    ) -> Result<MetaDescription> {
        let updated = self.logical.sync_meta_description(description, syncer).await?;
        info!(
            "Removed field {} from {}",
            self.logical.field.name, description.name
        );
        Ok(updated)
    }

    /// Owned sequence, then foreign key, then columns, then enum types.
    ///
    /// A constraint must go before the column it covers and an enum type
    /// can only be dropped once no column uses it.
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

        // An explicitly named sequence may back other columns.
        if let Some(seq) = props.seq.as_ref().filter(|seq| seq.owned) {
            set.add(SequenceStatementFactory.drop(seq));
        }
        if let Some(ifk) = &props.ifk {
            set.add(ConstraintStatementFactory.drop_ifk(&table, ifk));
        }
        for column in &props.columns {
            set.add(ColumnStatementFactory.drop(&table, column));
        }
        for column in props.columns.iter().filter(|c| c.is_enum()) {
            set.add(EnumStatementFactory.drop(&table, &column.name));
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
        format!("remove field {}", self.logical.field.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{DefaultValue, FieldType, Generator, Literal};
    use crate::operations::AddFieldOperation;
    use crate::syncer::InMemorySyncer;
    use crate::testing::{client, order, RecordingTransaction};

    fn with_fields(names: &[&str]) -> MetaDescription {
        let mut desc = order();
        for name in names {
            desc.fields.push(Field::new(*name, FieldType::String));
        }
        desc
    }

    #[tokio::test]
    async fn test_remove_keeps_relative_order() {
        let desc = with_fields(&["a", "b", "c"]);
        let syncer = InMemorySyncer::with_descriptions([desc.clone()]);
        let op = RemoveFieldOperation::new(Field::new("b", FieldType::String));

        let updated = op.sync_meta_description(&desc, &syncer).await.unwrap();
        let names: Vec<_> = updated.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "a", "c"]);
        assert_eq!(syncer.get("order").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let op = RemoveFieldOperation::new(Field::new("missing", FieldType::String));
        let err = op.sync_meta_description(&order(), &syncer).await.unwrap_err();
        assert!(matches!(err, MigrateError::UnknownField { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_add_then_remove_is_identity() {
        let desc = with_fields(&["a"]);
        let syncer = InMemorySyncer::with_descriptions([desc.clone()]);
        let field = Field::new("title", FieldType::String);

        let added = AddFieldOperation::new(field.clone())
            .sync_meta_description(&desc, &syncer)
            .await
            .unwrap();
        let removed = RemoveFieldOperation::new(field)
            .sync_meta_description(&added, &syncer)
            .await
            .unwrap();
        assert_eq!(removed, desc);
    }

    #[tokio::test]
    async fn test_remove_then_add_restores_columns() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut field = Field::new("title", FieldType::String);
        field.optional = true;
        let mut tx = RecordingTransaction::new();

        RemoveFieldOperation::new(field.clone())
            .sync_db_description(&order(), &mut tx, &syncer)
            .await
            .unwrap();
        AddFieldOperation::new(field)
            .sync_db_description(&order(), &mut tx, &syncer)
            .await
            .unwrap();
        assert_eq!(
            tx.executed(),
            [
                "ALTER TABLE \"o_order\" DROP COLUMN \"title\";",
                "ALTER TABLE \"o_order\" ADD COLUMN \"title\" text;",
            ]
        );
    }

    #[tokio::test]
    async fn test_sequence_dropped_before_column() {
        let syncer = InMemorySyncer::with_descriptions([order()]);
        let mut n = Field::new("n", FieldType::Number);
        n.def = Some(DefaultValue::nextval());

        let set = RemoveFieldOperation::new(n)
            .build_statements(&order(), &syncer)
            .await
            .unwrap();
        assert_eq!(set.names(), vec!["drop_seq#o_order_n_seq", "drop_column#o_order"]);
    }

    #[tokio::test]
    async fn test_shared_sequence_survives_removal() {
        let shared = || {
            Some(DefaultValue::Generator(Generator {
                func: "nextval".into(),
                args: vec![Literal::String("shared_seq".into())],
            }))
        };
        let mut a = Field::new("a", FieldType::Number);
        a.def = shared();
        let mut b = Field::new("b", FieldType::Number);
        b.def = shared();
        let mut desc = order();
        desc.fields.extend([a.clone(), b]);
        let syncer = InMemorySyncer::with_descriptions([desc.clone()]);

        let mut tx = RecordingTransaction::new();
        RemoveFieldOperation::new(a)
            .sync_db_description(&desc, &mut tx, &syncer)
            .await
            .unwrap();
        assert_eq!(tx.executed(), ["ALTER TABLE \"o_order\" DROP COLUMN \"a\";"]);
    }

    #[tokio::test]
    async fn test_constraint_before_column_before_type() {
        let syncer = InMemorySyncer::with_descriptions([client(), order()]);

        let set = RemoveFieldOperation::new(Field::inner_link("client", "client"))
            .build_statements(&order(), &syncer)
            .await
            .unwrap();
        assert_eq!(set.names(), vec!["drop_ifk#o_order", "drop_column#o_order"]);

        let mut state = Field::new("state", FieldType::Enum);
        state.choices = vec!["new".into()];
        let set = RemoveFieldOperation::new(state)
            .build_statements(&order(), &syncer)
            .await
            .unwrap();
        assert_eq!(
            set.names(),
            vec!["drop_column#o_order", "drop_type#o_order_state"]
        );
    }
}
