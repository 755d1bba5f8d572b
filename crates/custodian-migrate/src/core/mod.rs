//! Shared building blocks used by the DDL and operation layers.
//!
//! - [`identifier`]: physical naming conventions and identifier quoting

pub mod identifier;

pub use identifier::{quote_ident, quote_literal, table_name};
