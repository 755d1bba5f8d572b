//! PostgreSQL target.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use serde::Serialize;
use tokio_postgres::Config as PgConfig;
use tracing::{debug, info, warn};

use super::tls::SslMode;
use super::DbTransaction;
use crate::config::TargetConfig;
use crate::error::{MigrateError, Result};

/// Connection timeout for pool connections.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// A migration needs one connection; the second serves health checks.
const MAX_CONNECTIONS: usize = 2;

/// Result of a target connectivity check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub latency_ms: u64,
    pub server_version: Option<String>,
    pub error: Option<String>,
}

/// Connection pool to the PostgreSQL database being migrated.
pub struct PgTarget {
    pool: Pool,
}

impl PgTarget {
    /// Create a pool from configuration and verify it can connect.
    pub async fn new(config: &TargetConfig) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.port);
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);

        pg_config.keepalives(true);
        pg_config.keepalives_idle(Duration::from_secs(30));
        pg_config.connect_timeout(POOL_CONNECTION_TIMEOUT);

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let ssl_mode: SslMode = config.ssl_mode.parse()?;
        let pool = match ssl_mode.connector()? {
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                let mgr = Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config);
                Pool::builder(mgr)
                    .max_size(MAX_CONNECTIONS)
                    .build()
                    .map_err(|e| MigrateError::pool(e, "creating PostgreSQL target pool"))?
            }
            Some(tls_connector) => {
                let mgr = Manager::from_config(pg_config, tls_connector, mgr_config);
                Pool::builder(mgr)
                    .max_size(MAX_CONNECTIONS)
                    .build()
                    .map_err(|e| MigrateError::pool(e, "creating PostgreSQL target pool"))?
            }
        };

        let client = pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "testing PostgreSQL target connection"))?;
        client.simple_query("SELECT 1").await?;

        info!(
            "Connected to PostgreSQL target: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { pool })
    }

    /// Open a transaction on a dedicated connection.
    pub async fn begin(&self) -> Result<PgTransaction> {
        let client = self
            .pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, "acquiring connection for migration"))?;
        client.batch_execute("BEGIN").await?;
        debug!("Transaction started");
        Ok(PgTransaction {
            client: Some(client),
        })
    }

    /// Check connectivity and report latency and server version.
    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let outcome = async {
            let client = self
                .pool
                .get()
                .await
                .map_err(|e| MigrateError::pool(e, "health check"))?;
            let row = client.query_one("SHOW server_version", &[]).await?;
            Ok::<String, MigrateError>(row.get(0))
        }
        .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(version) => HealthCheckResult {
                healthy: true,
                latency_ms,
                server_version: Some(version),
                error: None,
            },
            Err(e) => HealthCheckResult {
                healthy: false,
                latency_ms,
                server_version: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// A transaction holding its pooled connection until commit or rollback.
///
/// Dropping an unfinished transaction detaches the connection from the pool
/// so it is closed instead of being reused mid-transaction; the server then
/// rolls the work back.
pub struct PgTransaction {
    client: Option<Object>,
}

impl PgTransaction {
    fn client(&self) -> Result<&Object> {
        self.client
            .as_ref()
            .ok_or_else(|| MigrateError::InvalidMigration("transaction already finished".into()))
    }

    async fn finish(&mut self, sql: &str) -> Result<()> {
        self.client()?.batch_execute(sql).await?;
        self.client = None;
        Ok(())
    }
}

#[async_trait]
impl DbTransaction for PgTransaction {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.client()?.batch_execute(sql).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.finish("COMMIT").await?;
        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.finish("ROLLBACK").await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            warn!("Transaction dropped without commit or rollback; discarding connection");
            drop(Object::take(client));
        }
    }
}
