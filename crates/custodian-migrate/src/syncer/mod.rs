//! Metadata description persistence.
//!
//! The [`MetaDescriptionSyncer`] trait is the logical side of a migration:
//! field operations read linked descriptions through it and persist their
//! mutated copy with [`MetaDescriptionSyncer::update`].
//!
//! - **Memory**: [`InMemorySyncer`], used for planning and tests
//! - **File**: [`FileSyncer`], one JSON document per description

mod file;
mod memory;

pub use file::FileSyncer;
pub use memory::InMemorySyncer;

use async_trait::async_trait;

use crate::description::MetaDescription;
use crate::error::Result;

/// Store of named meta descriptions.
///
/// Implementations must be `Send + Sync`; the operations only ever borrow
/// them as `&dyn MetaDescriptionSyncer`.
#[async_trait]
pub trait MetaDescriptionSyncer: Send + Sync {
    /// Persist a new description. Fails if the name is taken.
    async fn create(&self, description: &MetaDescription) -> Result<()>;

    /// Replace the description stored under `name` and return what was stored.
    async fn update(&self, name: &str, description: &MetaDescription) -> Result<MetaDescription>;

    /// Look up a description; `None` if it does not exist.
    async fn get(&self, name: &str) -> Result<Option<MetaDescription>>;

    /// Delete a description. Fails if it does not exist.
    async fn remove(&self, name: &str) -> Result<()>;

    /// Backend name for logging.
    fn backend_type(&self) -> &'static str;
}
