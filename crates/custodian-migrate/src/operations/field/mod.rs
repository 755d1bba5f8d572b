//! Add, remove and update of a single field.
//!
//! Each operation is split into a logical part (`AddField`, ...) that only
//! knows about descriptions, and a physical `*Operation` that holds the
//! logical part, delegates logical sync to it and adds DDL generation.

mod add;
mod remove;
mod update;

pub use add::{AddField, AddFieldOperation};
pub use remove::{RemoveField, RemoveFieldOperation};
pub use update::{UpdateField, UpdateFieldOperation};
