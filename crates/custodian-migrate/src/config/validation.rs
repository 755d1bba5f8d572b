//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};
use crate::target::SslMode;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let target = &config.target;
    for (key, value) in [
        ("target.host", &target.host),
        ("target.database", &target.database),
        ("target.user", &target.user),
    ] {
        if value.trim().is_empty() {
            return Err(MigrateError::Config(format!("{} is required", key)));
        }
    }
    if target.r#type != "postgres" {
        return Err(MigrateError::Config(format!(
            "target.type must be 'postgres', got '{}'",
            target.r#type
        )));
    }
    target.ssl_mode.parse::<SslMode>()?;

    if config.metadata.path.as_os_str().is_empty() {
        return Err(MigrateError::Config("metadata.path is required".into()));
    }

    Ok(())
}
