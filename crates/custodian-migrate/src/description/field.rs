//! Field definitions.

use serde::{Deserialize, Serialize};

use super::default::DefaultValue;

/// Logical field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Bool,
    DateTime,
    Date,
    Time,
    Enum,
    /// Link to a single object of `link_meta`.
    Object,
    /// Reverse (outer) collection of linking objects.
    Array,
    /// Link to an object of any type.
    Generic,
}

impl FieldType {
    /// PostgreSQL column type for scalar types.
    ///
    /// Enum columns are typed by their own named type, and link types carry
    /// no type of their own, so both return `None`.
    pub fn ddl_type(&self) -> Option<&'static str> {
        match self {
            FieldType::String => Some("text"),
            FieldType::Number => Some("numeric"),
            FieldType::Bool => Some("bool"),
            FieldType::DateTime => Some("timestamp with time zone"),
            FieldType::Date => Some("date"),
            FieldType::Time => Some("time with time zone"),
            FieldType::Enum | FieldType::Object | FieldType::Array | FieldType::Generic => None,
        }
    }

    /// Whether values of this type live in a single column of the owning table.
    pub fn is_simple(&self) -> bool {
        !matches!(
            self,
            FieldType::Object | FieldType::Array | FieldType::Generic
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::DateTime => "datetime",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Enum => "enum",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Generic => "generic",
        }
    }
}

/// Which side of a relation holds the foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// This object holds the foreign key column.
    Inner,
    /// Synthesized reverse relation; no physical column.
    Outer,
}

/// Referential action applied when the linked row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnDelete {
    #[default]
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

impl OnDelete {
    /// SQL spelling of the referential action.
    pub fn to_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::SetDefault => "SET DEFAULT",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

/// One logical attribute of an object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub unique: bool,

    /// Literal default or generator directive.
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub def: Option<DefaultValue>,

    /// Allowed values, in declaration order. Only meaningful for enums.
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,

    /// Name of the linked object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_meta: Option<String>,

    /// For outer links: the inner field on `link_meta` this relation mirrors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_link_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<OnDelete>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            ..Default::default()
        }
    }

    /// An inner link to `link_meta`.
    pub fn inner_link(name: impl Into<String>, link_meta: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Object,
            link_type: Some(LinkType::Inner),
            link_meta: Some(link_meta.into()),
            ..Default::default()
        }
    }

    /// An outer (reverse) link mirroring `outer_link_field` on `link_meta`.
    pub fn outer_link(
        name: impl Into<String>,
        link_meta: impl Into<String>,
        outer_link_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Array,
            link_type: Some(LinkType::Outer),
            link_meta: Some(link_meta.into()),
            outer_link_field: Some(outer_link_field.into()),
            ..Default::default()
        }
    }

    pub fn is_outer_link(&self) -> bool {
        self.link_type == Some(LinkType::Outer)
    }

    /// Object and generic fields are inner links unless marked outer.
    /// Arrays only exist as outer links.
    pub fn is_inner_link(&self) -> bool {
        matches!(self.field_type, FieldType::Object | FieldType::Generic)
            && self.link_type != Some(LinkType::Outer)
    }

    /// Referential action, defaulting to cascade.
    pub fn on_delete_strategy(&self) -> OnDelete {
        self.on_delete.unwrap_or_default()
    }
}
