//! File-backed description store.
//!
//! Each description lives in `<dir>/<name>.json`, pretty-printed. Writes go
//! to a temporary file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::MetaDescriptionSyncer;
use crate::core::identifier::validate_identifier;
use crate::description::MetaDescription;
use crate::error::{MigrateError, Result};

#[derive(Debug, Clone)]
pub struct FileSyncer {
    dir: PathBuf,
}

impl FileSyncer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_identifier(name)?;
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(MigrateError::MetaStore(format!(
                "Invalid description name: {:?}",
                name
            )));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    async fn write(&self, description: &MetaDescription) -> Result<()> {
        let path = self.path_for(&description.name)?;
        let content = serde_json::to_string_pretty(description)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Wrote description {} to {}", description.name, path.display());
        Ok(())
    }
}

#[async_trait]
impl MetaDescriptionSyncer for FileSyncer {
    async fn create(&self, description: &MetaDescription) -> Result<()> {
        if tokio::fs::try_exists(self.path_for(&description.name)?).await? {
            return Err(MigrateError::MetaStore(format!(
                "Description {} already exists",
                description.name
            )));
        }
        self.write(description).await
    }

    async fn update(&self, name: &str, description: &MetaDescription) -> Result<MetaDescription> {
        let path = self.path_for(name)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(MigrateError::MetaStore(format!(
                "Description {} does not exist",
                name
            )));
        }
        self.write(description).await?;
        if description.name != name {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(description.clone())
    }

    async fn get(&self, name: &str) -> Result<Option<MetaDescription>> {
        let path = self.path_for(name)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let description = serde_json::from_str(&content).map_err(|e| {
            MigrateError::MetaStore(format!("Malformed description {}: {}", path.display(), e))
        })?;
        Ok(Some(description))
    }

    async fn remove(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(name)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MigrateError::MetaStore(
                format!("Description {} does not exist", name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_type(&self) -> &'static str {
        "file"
    }
}
