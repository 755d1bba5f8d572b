//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database whose schema is migrated (PostgreSQL).
    pub target: TargetConfig,

    /// Where meta descriptions are stored.
    pub metadata: MetadataConfig,
}

/// Connection to the PostgreSQL database being migrated.
#[derive(Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Only "postgres" is accepted.
    #[serde(default = "default_postgres")]
    pub r#type: String,

    pub host: String,

    #[serde(default = "default_pg_port")]
    pub port: u16,

    pub database: String,

    pub user: String,

    #[serde(default)]
    pub password: String,

    /// One of disable, require, verify-ca, verify-full.
    #[serde(default = "default_require")]
    pub ssl_mode: String,
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Meta description store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Directory holding one `<name>.json` document per description.
    pub path: PathBuf,
}

fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_require() -> String {
    "require".to_string()
}
