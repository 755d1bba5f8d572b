//! Declarative object descriptions.
//!
//! A [`MetaDescription`] is the logical schema of one application object: its
//! name, primary key field and an ordered list of [`Field`]s. Field order is
//! significant and mirrors physical column order.
//!
//! Descriptions are serialized as JSON documents in the same shape the
//! metadata store persists them:
//!
//! ```json
//! {
//!   "name": "order",
//!   "key": "id",
//!   "cas": false,
//!   "fields": [
//!     {"name": "id", "type": "number", "default": {"func": "nextval"}},
//!     {"name": "state", "type": "enum", "enum": ["new", "paid"]}
//!   ]
//! }
//! ```

mod default;
mod field;

pub use default::{DefaultValue, Generator, Literal};
pub use field::{Field, FieldType, LinkType, OnDelete};

use serde::{Deserialize, Serialize};

/// Logical schema of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDescription {
    /// Unique object name; also seeds the table name.
    pub name: String,

    /// Name of the primary key field.
    pub key: String,

    /// Ordered field list.
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Optimistic concurrency flag.
    #[serde(default)]
    pub cas: bool,
}

impl MetaDescription {
    pub fn new(name: impl Into<String>, key: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            fields,
            cas: false,
        }
    }

    /// Find a field by name.
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in the field list.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The primary key field, if the description is well-formed.
    pub fn key_field(&self) -> Option<&Field> {
        self.find_field(&self.key)
    }

    /// Name of the first field that appears more than once.
    pub fn duplicate_field(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(i, f)| {
            self.fields[..i]
                .iter()
                .any(|prev| prev.name == f.name)
                .then_some(f.name.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> MetaDescription {
        MetaDescription::new(
            "order",
            "id",
            vec![
                Field::new("id", FieldType::Number),
                Field::new("title", FieldType::String),
            ],
        )
    }

    #[test]
    fn test_find_field() {
        let desc = order();
        assert_eq!(desc.find_field("title").map(|f| f.field_type), Some(FieldType::String));
        assert!(desc.find_field("missing").is_none());
        assert_eq!(desc.field_position("title"), Some(1));
        assert_eq!(desc.key_field().map(|f| f.name.as_str()), Some("id"));
    }

    #[test]
    fn test_duplicate_field() {
        let mut desc = order();
        assert!(desc.duplicate_field().is_none());
        desc.fields.push(Field::new("title", FieldType::Number));
        assert_eq!(desc.duplicate_field(), Some("title"));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "name": "order",
            "key": "id",
            "fields": [
                {"name": "id", "type": "number", "default": {"func": "nextval"}},
                {"name": "state", "type": "enum", "enum": ["new", "paid"], "optional": true},
                {"name": "client", "type": "object", "linkType": "inner", "linkMeta": "client", "onDelete": "setNull"}
            ]
        }"#;
        let desc: MetaDescription = serde_json::from_str(json).unwrap();
        assert!(!desc.cas);
        assert_eq!(desc.fields.len(), 3);
        assert_eq!(desc.fields[0].def, Some(DefaultValue::nextval()));
        assert_eq!(desc.fields[1].choices, vec!["new", "paid"]);
        assert_eq!(desc.fields[2].link_type, Some(LinkType::Inner));
        assert_eq!(desc.fields[2].on_delete, Some(OnDelete::SetNull));
    }
}
