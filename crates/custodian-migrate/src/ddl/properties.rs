//! Derivation of physical properties from field definitions.
//!
//! A field maps to zero or more [`Column`]s plus, depending on its kind, an
//! inner foreign key, a reverse-link descriptor and a default-value
//! sequence:
//!
//! | Field kind          | Columns                       | Extras               |
//! |---------------------|-------------------------------|----------------------|
//! | scalar / enum       | one, typed from the field     | seq for `nextval`    |
//! | inner object link   | one, typed as the target key  | [`Ifk`], seq         |
//! | inner generic link  | `<f>__type`, `<f>__key` (text)| seq                  |
//! | outer link          | none                          | [`OuterLink`]        |

use tracing::debug;

use super::schema::{Column, Ifk, Seq};
use crate::core::identifier::{
    generic_key_column, generic_type_column, quote_literal, sequence_name, table_name,
    validate_identifier,
};
use crate::description::{DefaultValue, Field, FieldType, Generator, Literal, MetaDescription};
use crate::error::{MigrateError, Result};
use crate::syncer::MetaDescriptionSyncer;

/// Reverse relation described by an outer link: `from_table.from_column`
/// references `to_table.to_column`. Purely informational; no DDL is emitted
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuterLink {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Everything that physically realizes one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldProperties {
    pub columns: Vec<Column>,
    pub ifk: Option<Ifk>,
    pub outer: Option<OuterLink>,
    pub seq: Option<Seq>,
}

/// Computes [`FieldProperties`], resolving link targets through the syncer.
pub struct PropertyDeriver<'a> {
    syncer: &'a dyn MetaDescriptionSyncer,
}

impl<'a> PropertyDeriver<'a> {
    pub fn new(syncer: &'a dyn MetaDescriptionSyncer) -> Self {
        Self { syncer }
    }

    /// Derive the physical properties of `field` as a member of `owner`.
    pub async fn derive(&self, field: &Field, owner: &MetaDescription) -> Result<FieldProperties> {
        validate_identifier(&field.name)
            .map_err(|e| MigrateError::derivation(&owner.name, &field.name, e.to_string()))?;

        let properties = if field.field_type.is_simple() {
            self.simple(field, owner)?
        } else if field.is_outer_link() {
            self.outer_link(field, owner)?
        } else if field.is_inner_link() {
            match field.field_type {
                FieldType::Object => self.inner_object_link(field, owner).await?,
                _ => self.inner_generic_link(field, owner)?,
            }
        } else {
            return Err(MigrateError::derivation(
                &owner.name,
                &field.name,
                format!(
                    "unsupported link type for field of type {}",
                    field.field_type.as_str()
                ),
            ));
        };

        debug!(
            "Derived {} column(s) for {}.{} (ifk: {}, seq: {})",
            properties.columns.len(),
            owner.name,
            field.name,
            properties.ifk.is_some(),
            properties.seq.is_some()
        );
        Ok(properties)
    }

    fn simple(&self, field: &Field, owner: &MetaDescription) -> Result<FieldProperties> {
        let (column, seq) = blank_column(field, owner)?;
        Ok(FieldProperties {
            columns: vec![column],
            seq,
            ..Default::default()
        })
    }

    fn outer_link(&self, field: &Field, owner: &MetaDescription) -> Result<FieldProperties> {
        let (Some(link_meta), Some(outer_link_field)) = (&field.link_meta, &field.outer_link_field)
        else {
            if field.field_type == FieldType::Generic {
                // Generic reverse links name no single source table.
                return Ok(FieldProperties::default());
            }
            return Err(MigrateError::derivation(
                &owner.name,
                &field.name,
                "outer link requires linkMeta and outerLinkField",
            ));
        };
        Ok(FieldProperties {
            outer: Some(OuterLink {
                from_table: table_name(link_meta),
                from_column: outer_link_field.clone(),
                to_table: table_name(&owner.name),
                to_column: owner.key.clone(),
            }),
            ..Default::default()
        })
    }

    async fn inner_object_link(
        &self,
        field: &Field,
        owner: &MetaDescription,
    ) -> Result<FieldProperties> {
        let link_meta = field.link_meta.as_deref().ok_or_else(|| {
            MigrateError::derivation(&owner.name, &field.name, "inner link requires linkMeta")
        })?;

        // A self-link resolves against the description being migrated, which
        // may not be persisted yet.
        let target = if link_meta == owner.name {
            owner.clone()
        } else {
            self.syncer.get(link_meta).await?.ok_or_else(|| {
                MigrateError::derivation(
                    &owner.name,
                    &field.name,
                    format!("linked object {} does not exist", link_meta),
                )
            })?
        };

        let key_field = target.key_field().ok_or_else(|| {
            MigrateError::derivation(
                &owner.name,
                &field.name,
                format!("linked object {} has no key field {}", target.name, target.key),
            )
        })?;
        if !key_field.field_type.is_simple() || key_field.field_type == FieldType::Enum {
            return Err(MigrateError::derivation(
                &owner.name,
                &field.name,
                format!(
                    "key {}.{} of type {} cannot be referenced",
                    target.name,
                    key_field.name,
                    key_field.field_type.as_str()
                ),
            ));
        }

        let (mut column, seq) = blank_column(field, owner)?;
        column.column_type = key_field.field_type;

        let ifk = Ifk {
            from_column: field.name.clone(),
            to_table: table_name(&target.name),
            to_column: target.key.clone(),
            on_delete: field.on_delete_strategy(),
        };

        Ok(FieldProperties {
            columns: vec![column],
            ifk: Some(ifk),
            outer: None,
            seq,
        })
    }

    fn inner_generic_link(&self, field: &Field, owner: &MetaDescription) -> Result<FieldProperties> {
        let column = |name: String| Column {
            name,
            column_type: FieldType::String,
            optional: field.optional,
            unique: false,
            defval: String::new(),
            choices: Vec::new(),
        };
        Ok(FieldProperties {
            columns: vec![
                column(generic_type_column(&field.name)),
                column(generic_key_column(&field.name)),
            ],
            seq: field_sequence(field, owner)?,
            ..Default::default()
        })
    }
}

/// Column carrying the field's own name, flags, default and choices.
fn blank_column(field: &Field, owner: &MetaDescription) -> Result<(Column, Option<Seq>)> {
    let seq = field_sequence(field, owner)?;
    let defval = match &field.def {
        Some(def) => render_default(def, seq.as_ref())
            .map_err(|msg| MigrateError::derivation(&owner.name, &field.name, msg))?,
        None => String::new(),
    };
    let choices = if field.field_type == FieldType::Enum {
        field.choices.clone()
    } else {
        Vec::new()
    };
    let column = Column {
        name: field.name.clone(),
        column_type: field.field_type,
        optional: field.optional,
        unique: field.unique,
        defval,
        choices,
    };
    Ok((column, seq))
}

/// Sequence backing a `nextval` default. The first argument, if given,
/// names an explicit sequence.
fn field_sequence(field: &Field, owner: &MetaDescription) -> Result<Option<Seq>> {
    let Some(DefaultValue::Generator(generator)) = &field.def else {
        return Ok(None);
    };
    if !generator.func.eq_ignore_ascii_case("nextval") {
        return Ok(None);
    }
    let seq = match generator.args.first() {
        Some(Literal::String(name)) if !name.is_empty() => Seq::external(name.clone()),
        Some(other) => {
            return Err(MigrateError::derivation(
                &owner.name,
                &field.name,
                format!("nextval expects a sequence name, got {}", other),
            ))
        }
        None => Seq::new(sequence_name(&owner.name, &field.name)),
    };
    validate_identifier(&seq.name)
        .map_err(|e| MigrateError::derivation(&owner.name, &field.name, e.to_string()))?;
    Ok(Some(seq))
}

/// Render a default as a SQL expression; empty strings render as no default.
fn render_default(def: &DefaultValue, seq: Option<&Seq>) -> std::result::Result<String, String> {
    match def {
        DefaultValue::Literal(literal) => Ok(render_literal(literal)),
        DefaultValue::Generator(generator) => render_generator(generator, seq),
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::String(s) if s.is_empty() => String::new(),
        Literal::String(s) => quote_literal(s),
        Literal::Number(n) => n.to_string(),
        Literal::Bool(b) => b.to_string(),
    }
}

fn render_generator(generator: &Generator, seq: Option<&Seq>) -> std::result::Result<String, String> {
    match generator.func.to_lowercase().as_str() {
        "nextval" => seq
            .map(|s| format!("nextval({})", quote_literal(&s.name)))
            .ok_or_else(|| "nextval without a sequence".to_string()),
        "current_date" => Ok("CURRENT_DATE".to_string()),
        "current_timestamp" => Ok("CURRENT_TIMESTAMP".to_string()),
        "now" => Ok("NOW()".to_string()),
        "owner" => Ok("0".to_string()),
        func => {
            let valid = func
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && func.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(format!("invalid default function {:?}", generator.func));
            }
            let args = generator
                .args
                .iter()
                .map(render_literal)
                .collect::<Vec<_>>()
                .join(",");
            Ok(format!("{}({})", func, args))
        }
    }
}
