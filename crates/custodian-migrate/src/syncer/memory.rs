//! In-memory description store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::MetaDescriptionSyncer;
use crate::description::MetaDescription;
use crate::error::{MigrateError, Result};

/// Descriptions held in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemorySyncer {
    descriptions: RwLock<HashMap<String, MetaDescription>>,
}

impl InMemorySyncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `descriptions`, keyed by their names.
    pub fn with_descriptions(descriptions: impl IntoIterator<Item = MetaDescription>) -> Self {
        let map = descriptions
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            descriptions: RwLock::new(map),
        }
    }
}

#[async_trait]
impl MetaDescriptionSyncer for InMemorySyncer {
    async fn create(&self, description: &MetaDescription) -> Result<()> {
        let mut map = self.descriptions.write().await;
        if map.contains_key(&description.name) {
            return Err(MigrateError::MetaStore(format!(
                "Description {} already exists",
                description.name
            )));
        }
        map.insert(description.name.clone(), description.clone());
        Ok(())
    }

    async fn update(&self, name: &str, description: &MetaDescription) -> Result<MetaDescription> {
        let mut map = self.descriptions.write().await;
        if !map.contains_key(name) {
            return Err(MigrateError::MetaStore(format!(
                "Description {} does not exist",
                name
            )));
        }
        // A rename moves the entry to the new key.
        map.remove(name);
        map.insert(description.name.clone(), description.clone());
        Ok(description.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<MetaDescription>> {
        Ok(self.descriptions.read().await.get(name).cloned())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.descriptions
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| MigrateError::MetaStore(format!("Description {} does not exist", name)))
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
