//! Field default values.
//!
//! A default is either a literal (`"default": "draft"`, `"default": 0`) or a
//! generator directive evaluated by the database
//! (`"default": {"func": "nextval"}`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A constant default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Number(v) => write!(f, "{}", v),
            Literal::String(v) => f.write_str(v),
        }
    }
}

/// A database-evaluated default, e.g. `nextval` or `now`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    pub func: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Literal>,
}

/// Default value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Generator(Generator),
    Literal(Literal),
}

impl DefaultValue {
    /// `{"func": <func>}` with no arguments.
    pub fn generator(func: impl Into<String>) -> Self {
        DefaultValue::Generator(Generator {
            func: func.into(),
            args: Vec::new(),
        })
    }

    /// The `nextval` generator backed by the field's own sequence.
    pub fn nextval() -> Self {
        Self::generator("nextval")
    }

    pub fn string(value: impl Into<String>) -> Self {
        DefaultValue::Literal(Literal::String(value.into()))
    }
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        DefaultValue::Literal(Literal::Bool(v))
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        DefaultValue::Literal(Literal::Number(v.into()))
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::string(v)
    }
}
